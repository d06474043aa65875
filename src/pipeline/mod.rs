// ABOUTME: Pipeline core: shared run context, stage runner, and poller.
// ABOUTME: The orchestrator composes these into the concrete promotion pipeline.

mod context;
mod error;
mod poll;
mod stage;

pub use context::{ImageTags, Outcome, PipelineContext};
pub use error::StageError;
pub use poll::{PollOutcome, PollResult, poll};
pub use stage::{Stage, StageFailure, run_stages};
