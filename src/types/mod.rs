// ABOUTME: Validated domain types for the promotion pipeline.
// ABOUTME: Names, build identifiers, and image references are checked at the edge.

mod app_name;
mod build_id;
mod image;

pub use app_name::{AppName, AppNameError};
pub use build_id::{BuildId, BuildIdError};
pub use image::{ImageRef, Repository, RepositoryError};
