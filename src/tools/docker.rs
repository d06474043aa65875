// ABOUTME: Image builder and registry client shelling out to the docker CLI.
// ABOUTME: Login relies on the host's configured credential helpers.

use async_trait::async_trait;
use std::path::Path;

use super::{ImageTools, ToolError};
use crate::exec::{CommandSpec, Executor};
use crate::types::ImageRef;

#[derive(Debug, Clone)]
pub struct DockerCli {
    executor: Executor,
}

impl DockerCli {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ImageTools for DockerCli {
    async fn build(&self, context: &Path, tag: &ImageRef) -> Result<(), ToolError> {
        let image = tag.to_string();
        let context = context.display().to_string();
        let spec = CommandSpec::new("docker", &["build", "-t", &image, &context]);
        self.executor.run(&spec).await?;
        Ok(())
    }

    async fn tag(&self, source: &ImageRef, alias: &ImageRef) -> Result<(), ToolError> {
        let source = source.to_string();
        let alias = alias.to_string();
        let spec = CommandSpec::new("docker", &["tag", &source, &alias]);
        self.executor.run(&spec).await?;
        Ok(())
    }

    async fn login(&self, registry: Option<&str>) -> Result<(), ToolError> {
        // Non-interactive: credentials come from the docker credential
        // helpers configured on the host.
        let spec = match registry {
            Some(host) => CommandSpec::new("docker", &["login", host]),
            None => CommandSpec::new("docker", &["login"]),
        };
        self.executor.run(&spec).await?;
        Ok(())
    }

    async fn push(&self, tag: &ImageRef) -> Result<(), ToolError> {
        let image = tag.to_string();
        let spec = CommandSpec::new("docker", &["push", &image]);
        self.executor.run(&spec).await?;
        Ok(())
    }

    async fn remove(&self, tag: &ImageRef) -> Result<(), ToolError> {
        let image = tag.to_string();
        // Already-removed or never-built images must not abort cleanup.
        let spec = CommandSpec::new("docker", &["rmi", &image]).tolerate_failure();
        self.executor.run(&spec).await?;
        Ok(())
    }
}
