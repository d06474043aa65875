// ABOUTME: Command executor for external collaborator CLIs.
// ABOUTME: Captures output, exit status, and duration; supports tolerated failures.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("{command} exited with status {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("failed to rewrite {file}: {source}")]
    Substitution {
        file: PathBuf,
        source: std::io::Error,
    },
}

/// Token rewrite applied to a file before the command is spawned.
///
/// Used once per run, to pin the deployment manifest's image reference to the
/// versioned tag.
#[derive(Debug, Clone)]
pub struct Substitution {
    pub file: PathBuf,
    pub token: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Capture stdout into the result instead of logging it.
    pub capture_stdout: bool,
    /// Convert a non-zero exit into a logged warning instead of an error.
    pub tolerate_failure: bool,
    pub substitute: Option<Substitution>,
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub options: ExecOptions,
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            options: ExecOptions::default(),
        }
    }

    pub fn capture_stdout(mut self) -> Self {
        self.options.capture_stdout = true;
        self
    }

    pub fn tolerate_failure(mut self) -> Self {
        self.options.tolerate_failure = true;
        self
    }

    pub fn substitute(mut self, substitution: Substitution) -> Self {
        self.options.substitute = Some(substitution);
        self
    }

    /// Command line rendered for logs and error messages.
    fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[derive(Debug)]
pub struct ExecOutput {
    pub stdout: String,
    pub exit_code: i32,
    pub duration: Duration,
}

/// Runs external commands with piped stdio.
#[derive(Debug, Clone, Default)]
pub struct Executor;

impl Executor {
    pub async fn run(&self, spec: &CommandSpec) -> Result<ExecOutput, ExecError> {
        if let Some(sub) = &spec.options.substitute {
            apply_substitution(sub).await?;
        }

        let command_line = spec.display();
        tracing::debug!(command = %command_line, "executing");

        let started = Instant::now();
        let output = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                command: command_line.clone(),
                source,
            })?;
        let duration = started.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let exit_code = output.status.code().unwrap_or(-1);
        tracing::debug!(command = %command_line, exit_code, ?duration, "command finished");

        if !spec.options.capture_stdout && !stdout.is_empty() {
            tracing::debug!(command = %command_line, "stdout: {}", stdout.trim_end());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            if spec.options.tolerate_failure {
                tracing::warn!(
                    command = %command_line,
                    exit_code,
                    "tolerated command failure: {}",
                    stderr
                );
            } else {
                return Err(ExecError::CommandFailed {
                    command: command_line,
                    exit_code,
                    stderr,
                });
            }
        }

        Ok(ExecOutput {
            stdout: if spec.options.capture_stdout {
                stdout
            } else {
                String::new()
            },
            exit_code,
            duration,
        })
    }
}

/// Rewrite every occurrence of the token in place, like `sed -i`.
async fn apply_substitution(sub: &Substitution) -> Result<(), ExecError> {
    let contents = tokio::fs::read_to_string(&sub.file)
        .await
        .map_err(|source| ExecError::Substitution {
            file: sub.file.clone(),
            source,
        })?;

    let rewritten = contents.replace(&sub.token, &sub.replacement);
    tokio::fs::write(&sub.file, rewritten)
        .await
        .map_err(|source| ExecError::Substitution {
            file: sub.file.clone(),
            source,
        })
}
