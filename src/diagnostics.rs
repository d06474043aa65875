// ABOUTME: Diagnostics accumulator for non-fatal warnings during a run.
// ABOUTME: Smoke-check and cleanup failures land here instead of failing the run.

/// Collects non-fatal warnings during a pipeline run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a pipeline run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a smoke-check warning.
    pub fn smoke_check(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SmokeCheck,
            message: message.into(),
        }
    }

    /// Create a cleanup warning.
    pub fn cleanup(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Cleanup,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A post-deployment reachability probe failed.
    SmokeCheck,
    /// A best-effort teardown step failed (e.g. image already absent).
    Cleanup,
}
