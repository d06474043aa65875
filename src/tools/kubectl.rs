// ABOUTME: Workload and routing operations via the kubectl CLI.
// ABOUTME: Hostname reads use jsonpath; an empty result means not provisioned yet.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use super::{RoutingApi, ToolError, WorkloadApi};
use crate::exec::{CommandSpec, Executor, Substitution};
use crate::types::{AppName, ImageRef};

const LB_HOSTNAME_JSONPATH: &str = "jsonpath={.status.loadBalancer.ingress[0].hostname}";

#[derive(Debug, Clone)]
pub struct KubectlCli {
    executor: Executor,
    namespace: String,
}

impl KubectlCli {
    pub fn new(executor: Executor, namespace: &str) -> Self {
        Self {
            executor,
            namespace: namespace.to_string(),
        }
    }

    async fn apply_manifest(&self, manifest: &Path) -> Result<(), ToolError> {
        let file = manifest.display().to_string();
        let spec = CommandSpec::new(
            "kubectl",
            &["apply", "-f", &file, "-n", &self.namespace],
        );
        self.executor.run(&spec).await?;
        Ok(())
    }

    async fn hostname_field(
        &self,
        kind: &str,
        name: &str,
        namespace: &str,
    ) -> Result<Option<String>, ToolError> {
        let spec = CommandSpec::new(
            "kubectl",
            &["get", kind, name, "-n", namespace, "-o", LB_HOSTNAME_JSONPATH],
        )
        .capture_stdout();

        let output = self.executor.run(&spec).await?;
        let hostname = output.stdout.trim();
        if hostname.is_empty() {
            Ok(None)
        } else {
            Ok(Some(hostname.to_string()))
        }
    }
}

#[async_trait]
impl WorkloadApi for KubectlCli {
    async fn apply(&self, manifest: &Path) -> Result<(), ToolError> {
        self.apply_manifest(manifest).await
    }

    async fn apply_with_image(
        &self,
        manifest: &Path,
        token: &str,
        image: &ImageRef,
    ) -> Result<(), ToolError> {
        let file = manifest.display().to_string();
        let spec = CommandSpec::new(
            "kubectl",
            &["apply", "-f", &file, "-n", &self.namespace],
        )
        .substitute(Substitution {
            file: manifest.to_path_buf(),
            token: token.to_string(),
            replacement: image.to_string(),
        });
        self.executor.run(&spec).await?;
        Ok(())
    }

    async fn wait_rollout(&self, app: &AppName, ceiling: Duration) -> Result<(), ToolError> {
        let workload = format!("deployment/{app}");
        let timeout = format!("--timeout={}s", ceiling.as_secs());
        let spec = CommandSpec::new(
            "kubectl",
            &["rollout", "status", &workload, "-n", &self.namespace, &timeout],
        );
        self.executor.run(&spec).await?;
        Ok(())
    }

    async fn list_instances(&self, app: &AppName) -> Result<String, ToolError> {
        let selector = format!("app={app}");
        let spec = CommandSpec::new(
            "kubectl",
            &["get", "pods", "-n", &self.namespace, "-l", &selector, "-o", "wide"],
        )
        .capture_stdout()
        .tolerate_failure();

        let output = self.executor.run(&spec).await?;
        Ok(output.stdout)
    }
}

#[async_trait]
impl RoutingApi for KubectlCli {
    async fn apply(&self, manifest: &Path) -> Result<(), ToolError> {
        self.apply_manifest(manifest).await
    }

    async fn ingress_hostname(&self, app: &AppName) -> Result<Option<String>, ToolError> {
        self.hostname_field("ingress", app.as_str(), &self.namespace)
            .await
    }

    async fn controller_hostname(
        &self,
        namespace: &str,
        service: &str,
    ) -> Result<Option<String>, ToolError> {
        self.hostname_field("service", service, namespace).await
    }
}
