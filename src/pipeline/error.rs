// ABOUTME: Fatal stage error types.
// ABOUTME: Any of these aborts the remaining stage sequence.

use crate::tools::ToolError;
use std::time::Duration;
use thiserror::Error;

/// A fatal failure of one pipeline stage. Aborts the remaining stages;
/// cleanup and failure reporting still run.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("endpoint was not provisioned within {}s", waited.as_secs())]
    EndpointTimeout { waited: Duration },

    #[error("image tags are not recorded in the pipeline context")]
    MissingImages,

    #[error("run interrupted by shutdown signal")]
    Interrupted,
}
