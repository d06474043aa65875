// ABOUTME: Cluster credential configuration via the aws CLI.
// ABOUTME: Sets the region and writes kubeconfig credentials for the cluster.

use async_trait::async_trait;

use super::{ClusterAccess, ToolError};
use crate::exec::{CommandSpec, Executor};

#[derive(Debug, Clone)]
pub struct EksAccess {
    executor: Executor,
}

impl EksAccess {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ClusterAccess for EksAccess {
    async fn set_region(&self, region: &str) -> Result<(), ToolError> {
        let spec = CommandSpec::new("aws", &["configure", "set", "region", region]);
        self.executor.run(&spec).await?;
        Ok(())
    }

    async fn bind_cluster(&self, cluster: &str, region: &str) -> Result<(), ToolError> {
        let spec = CommandSpec::new(
            "aws",
            &[
                "eks",
                "update-kubeconfig",
                "--name",
                cluster,
                "--region",
                region,
            ],
        );
        self.executor.run(&spec).await?;
        Ok(())
    }
}
