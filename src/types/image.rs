// ABOUTME: Registry repository and tagged image reference types.
// ABOUTME: Handles formats like registry.example.com/team/app and repo:tag.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository cannot be empty")]
    Empty,

    #[error("invalid character in repository: '{0}'")]
    InvalidChar(char),

    #[error("repository component cannot be empty: {0}")]
    EmptyComponent(String),
}

/// A registry repository, e.g. `registry.example.com/team/app` or plain
/// `library/nginx`. Tags are attached via [`ImageRef`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository(String);

impl Repository {
    pub fn parse(input: &str) -> Result<Self, RepositoryError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RepositoryError::Empty);
        }

        for c in input.chars() {
            if !c.is_ascii_lowercase()
                && !c.is_ascii_digit()
                && c != '/'
                && c != '.'
                && c != '-'
                && c != '_'
                && c != ':'
            {
                return Err(RepositoryError::InvalidChar(c));
            }
        }

        if input.split('/').any(str::is_empty) {
            return Err(RepositoryError::EmptyComponent(input.to_string()));
        }

        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The registry host, if the first path component looks like one
    /// (contains a dot or a port). Docker Hub repositories return `None`.
    pub fn registry_host(&self) -> Option<&str> {
        let first = self.0.split('/').next()?;
        if first.contains('.') || first.contains(':') {
            Some(first)
        } else {
            None
        }
    }

    /// Attach a tag to this repository.
    ///
    /// The tag is expected to be already validated (a [`super::BuildId`] or
    /// the literal `latest`).
    pub fn image(&self, tag: &str) -> ImageRef {
        ImageRef {
            repository: self.clone(),
            tag: tag.to_string(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully tagged image reference, `<repository>:<tag>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    repository: Repository,
    tag: String,
}

impl ImageRef {
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}
