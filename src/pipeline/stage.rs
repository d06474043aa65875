// ABOUTME: Stage trait and fail-fast sequential stage runner.
// ABOUTME: The first failing stage aborts the rest; cleanup is the orchestrator's job.

use async_trait::async_trait;

use super::context::{Outcome, PipelineContext};
use super::error::StageError;
use crate::output::Output;

/// One named, sequential unit of pipeline work.
///
/// Stages communicate only through the documented fields of
/// [`PipelineContext`]; nothing is returned out of `run` besides success or
/// a fatal failure.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, cx: &mut PipelineContext) -> Result<(), StageError>;
}

/// The stage that aborted a run, with its reason.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: &'static str,
    pub reason: StageError,
}

/// Execute stages strictly in order, stopping at the first failure.
///
/// Exactly one stage is current at any time. On the first failing stage the
/// context outcome transitions to Failed and no later stage runs; when every
/// stage completes the outcome transitions to Succeeded.
pub async fn run_stages(
    stages: &[Box<dyn Stage>],
    cx: &mut PipelineContext,
    output: &Output,
) -> Result<(), StageFailure> {
    for stage in stages {
        output.progress(&format!("  → {}...", stage.name()));
        tracing::info!(stage = stage.name(), "stage started");

        match stage.run(cx).await {
            Ok(()) => {
                tracing::info!(stage = stage.name(), "stage completed");
            }
            Err(reason) => {
                tracing::error!(stage = stage.name(), error = %reason, "stage failed");
                cx.finish(Outcome::Failed);
                return Err(StageFailure {
                    stage: stage.name(),
                    reason,
                });
            }
        }
    }

    cx.finish(Outcome::Succeeded);
    Ok(())
}
