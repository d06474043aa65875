// ABOUTME: Build identifier assigned once per pipeline run.
// ABOUTME: Defaults to a UTC timestamp; doubles as the versioned image tag.

use chrono::Utc;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildIdError {
    #[error("build id cannot be empty")]
    Empty,

    #[error("build id exceeds maximum length of 128 characters")]
    TooLong,

    #[error("invalid character in build id: '{0}'")]
    InvalidChar(char),
}

/// Identifier for one pipeline run. Must be a valid image tag since it is
/// used verbatim as the versioned tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildId(String);

impl BuildId {
    pub fn new(value: &str) -> Result<Self, BuildIdError> {
        if value.is_empty() {
            return Err(BuildIdError::Empty);
        }

        if value.len() > 128 {
            return Err(BuildIdError::TooLong);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '.' && c != '-' && c != '_' {
                return Err(BuildIdError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// Generate a build id from the current UTC time.
    pub fn now() -> Self {
        Self(Utc::now().format("%Y%m%d%H%M%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
