// ABOUTME: Mutable record shared by all stages for the duration of one run.
// ABOUTME: Outcome is monotonic; endpoint and image tags are set-once fields.

use crate::diagnostics::Diagnostics;
use crate::types::{BuildId, ImageRef};

/// Final state of a pipeline run. Transitions only move forward: once a run
/// is Succeeded or Failed it stays there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Running,
    Succeeded,
    Failed,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Running)
    }
}

/// The two equivalent references produced by the build stage.
#[derive(Debug, Clone)]
pub struct ImageTags {
    pub versioned: ImageRef,
    pub latest: ImageRef,
}

/// Per-run state passed by reference through the stage sequence. Created at
/// run start, discarded at run end; never persisted or shared across runs.
#[derive(Debug)]
pub struct PipelineContext {
    build_id: BuildId,
    images: Option<ImageTags>,
    endpoint: Option<String>,
    outcome: Outcome,
    diagnostics: Diagnostics,
}

impl PipelineContext {
    pub fn new(build_id: BuildId) -> Self {
        Self {
            build_id,
            images: None,
            endpoint: None,
            outcome: Outcome::Running,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn build_id(&self) -> &BuildId {
        &self.build_id
    }

    pub fn images(&self) -> Option<&ImageTags> {
        self.images.as_ref()
    }

    /// Record the image tags produced by the build stage. Later writes are
    /// ignored; the references are fixed for the rest of the run.
    pub fn set_images(&mut self, images: ImageTags) {
        if self.images.is_none() {
            self.images = Some(images);
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Record the discovered endpoint. Never cleared once set.
    pub fn set_endpoint(&mut self, endpoint: &str) {
        if self.endpoint.is_none() {
            self.endpoint = Some(endpoint.to_string());
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Transition to a terminal outcome. A no-op when the run is already
    /// terminal, so a late transition cannot overwrite an earlier failure.
    pub fn finish(&mut self, outcome: Outcome) {
        if !self.outcome.is_terminal() && outcome.is_terminal() {
            self.outcome = outcome;
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }
}
