// ABOUTME: Collaborator traits for registry, cluster, workload, routing, and HTTP.
// ABOUTME: Production impls shell out through the executor; tests substitute fakes.

mod aws;
mod docker;
mod http;
mod kubectl;

pub use aws::EksAccess;
pub use docker::DockerCli;
pub use http::ReqwestProbe;
pub use kubectl::KubectlCli;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::exec::{ExecError, Executor};
use crate::types::{AppName, ImageRef};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("http request failed: {0}")]
    Http(String),
}

/// Image builder / registry client.
#[async_trait]
pub trait ImageTools: Send + Sync {
    async fn build(&self, context: &Path, tag: &ImageRef) -> Result<(), ToolError>;

    async fn tag(&self, source: &ImageRef, alias: &ImageRef) -> Result<(), ToolError>;

    /// Authenticate to the registry. `None` means the default registry.
    async fn login(&self, registry: Option<&str>) -> Result<(), ToolError>;

    async fn push(&self, tag: &ImageRef) -> Result<(), ToolError>;

    /// Remove a locally-produced tag. Absence of the image is tolerated by
    /// the production implementation; callers treat errors as warnings.
    async fn remove(&self, tag: &ImageRef) -> Result<(), ToolError>;
}

/// Cluster credential and context configurator.
#[async_trait]
pub trait ClusterAccess: Send + Sync {
    async fn set_region(&self, region: &str) -> Result<(), ToolError>;

    async fn bind_cluster(&self, cluster: &str, region: &str) -> Result<(), ToolError>;
}

/// Workload orchestration API.
#[async_trait]
pub trait WorkloadApi: Send + Sync {
    async fn apply(&self, manifest: &Path) -> Result<(), ToolError>;

    /// Apply a manifest after rewriting `token` to the versioned image
    /// reference, pinning the rollout to a reproducible tag.
    async fn apply_with_image(
        &self,
        manifest: &Path,
        token: &str,
        image: &ImageRef,
    ) -> Result<(), ToolError>;

    /// Block until the rollout reaches steady state or the ceiling elapses.
    /// Ceiling expiry surfaces as an error.
    async fn wait_rollout(&self, app: &AppName, ceiling: Duration) -> Result<(), ToolError>;

    /// Best-effort listing of running instances for diagnostics.
    async fn list_instances(&self, app: &AppName) -> Result<String, ToolError>;
}

/// Routing controller API.
#[async_trait]
pub trait RoutingApi: Send + Sync {
    async fn apply(&self, manifest: &Path) -> Result<(), ToolError>;

    /// The externally-provisioned hostname on the ingress resource, if the
    /// routing controller has assigned one yet.
    async fn ingress_hostname(&self, app: &AppName) -> Result<Option<String>, ToolError>;

    /// The load-balancer hostname on the ingress controller's own service.
    async fn controller_hostname(
        &self,
        namespace: &str,
        service: &str,
    ) -> Result<Option<String>, ToolError>;
}

/// HTTP reachability probe client.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// Issue a HEAD request and return the response status code.
    async fn head(&self, url: &str) -> Result<u16, ToolError>;
}

/// The full set of collaborators one pipeline run talks to.
#[derive(Clone)]
pub struct Toolset {
    pub images: Arc<dyn ImageTools>,
    pub cluster: Arc<dyn ClusterAccess>,
    pub workloads: Arc<dyn WorkloadApi>,
    pub routing: Arc<dyn RoutingApi>,
    pub probes: Arc<dyn HttpProbe>,
}

impl Toolset {
    /// Production toolset backed by the `docker`, `aws`, and `kubectl` CLIs
    /// plus an HTTP client.
    pub fn cli(executor: Executor, namespace: &str) -> Result<Self, ToolError> {
        let kubectl = Arc::new(KubectlCli::new(executor.clone(), namespace));
        Ok(Self {
            images: Arc::new(DockerCli::new(executor.clone())),
            cluster: Arc::new(EksAccess::new(executor)),
            workloads: kubectl.clone(),
            routing: kubectl,
            probes: Arc::new(ReqwestProbe::new()?),
        })
    }
}
