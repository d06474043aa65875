// ABOUTME: Library root for anodos - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod exec;
pub mod orchestrator;
pub mod output;
pub mod pipeline;
pub mod tools;
pub mod types;
