// ABOUTME: Fake collaborator implementations and config builders for tests.
// ABOUTME: Records calls in order so tests can assert sequencing and fail-fast.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anodos::config::{EndpointConfig, ManifestPaths, PipelineConfig};
use anodos::exec::ExecError;
use anodos::tools::{
    ClusterAccess, HttpProbe, ImageTools, RoutingApi, ToolError, Toolset, WorkloadApi,
};
use anodos::types::{AppName, ImageRef, Repository};

/// Ordered record of every collaborator call made during a run.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    pub fn any_with_prefix(&self, prefix: &str) -> bool {
        self.count_with_prefix(prefix) > 0
    }
}

fn command_failed(command: &str) -> ToolError {
    ToolError::Exec(ExecError::CommandFailed {
        command: command.to_string(),
        exit_code: 1,
        stderr: "denied".to_string(),
    })
}

/// Knobs for one fake toolset plus the shared call log.
pub struct Fakes {
    pub log: CallLog,
    pub fail_build: bool,
    pub fail_push: bool,
    pub fail_remove: bool,
    /// How long the fake rollout takes; exceeding the ceiling fails it.
    pub rollout_duration: Duration,
    /// Probe attempt (1-based) at which the hostname becomes available.
    pub hostname_ready_at: u32,
    pub hostname: String,
    pub probe_fail: bool,
    pub probe_status: u16,
    pub routing_attempts: Arc<AtomicU32>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            log: CallLog::default(),
            fail_build: false,
            fail_push: false,
            fail_remove: false,
            rollout_duration: Duration::from_millis(1),
            hostname_ready_at: 1,
            hostname: "lb.example.com".to_string(),
            probe_fail: false,
            probe_status: 200,
            routing_attempts: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl Fakes {
    pub fn toolset(&self) -> Toolset {
        let kubectl_like = Arc::new(FakeWorkloads {
            log: self.log.clone(),
            rollout_duration: self.rollout_duration,
        });
        Toolset {
            images: Arc::new(FakeImages {
                log: self.log.clone(),
                fail_build: self.fail_build,
                fail_push: self.fail_push,
                fail_remove: self.fail_remove,
            }),
            cluster: Arc::new(FakeCluster {
                log: self.log.clone(),
            }),
            workloads: kubectl_like,
            routing: Arc::new(FakeRouting {
                log: self.log.clone(),
                hostname: self.hostname.clone(),
                ready_at: self.hostname_ready_at,
                attempts: self.routing_attempts.clone(),
            }),
            probes: Arc::new(FakeProbe {
                log: self.log.clone(),
                fail: self.probe_fail,
                status: self.probe_status,
            }),
        }
    }
}

struct FakeImages {
    log: CallLog,
    fail_build: bool,
    fail_push: bool,
    fail_remove: bool,
}

#[async_trait]
impl ImageTools for FakeImages {
    async fn build(&self, _context: &Path, tag: &ImageRef) -> Result<(), ToolError> {
        self.log.record(format!("images.build {tag}"));
        if self.fail_build {
            return Err(command_failed("docker build"));
        }
        Ok(())
    }

    async fn tag(&self, source: &ImageRef, alias: &ImageRef) -> Result<(), ToolError> {
        self.log.record(format!("images.tag {source} {alias}"));
        Ok(())
    }

    async fn login(&self, registry: Option<&str>) -> Result<(), ToolError> {
        self.log
            .record(format!("images.login {}", registry.unwrap_or("default")));
        Ok(())
    }

    async fn push(&self, tag: &ImageRef) -> Result<(), ToolError> {
        self.log.record(format!("images.push {tag}"));
        if self.fail_push {
            return Err(command_failed("docker push"));
        }
        Ok(())
    }

    async fn remove(&self, tag: &ImageRef) -> Result<(), ToolError> {
        self.log.record(format!("images.remove {tag}"));
        if self.fail_remove {
            return Err(command_failed("docker rmi"));
        }
        Ok(())
    }
}

struct FakeCluster {
    log: CallLog,
}

#[async_trait]
impl ClusterAccess for FakeCluster {
    async fn set_region(&self, region: &str) -> Result<(), ToolError> {
        self.log.record(format!("cluster.set_region {region}"));
        Ok(())
    }

    async fn bind_cluster(&self, cluster: &str, region: &str) -> Result<(), ToolError> {
        self.log
            .record(format!("cluster.bind {cluster} {region}"));
        Ok(())
    }
}

struct FakeWorkloads {
    log: CallLog,
    rollout_duration: Duration,
}

#[async_trait]
impl WorkloadApi for FakeWorkloads {
    async fn apply(&self, manifest: &Path) -> Result<(), ToolError> {
        self.log
            .record(format!("workloads.apply {}", manifest.display()));
        Ok(())
    }

    async fn apply_with_image(
        &self,
        manifest: &Path,
        token: &str,
        image: &ImageRef,
    ) -> Result<(), ToolError> {
        self.log.record(format!(
            "workloads.apply_with_image {} {token} {image}",
            manifest.display()
        ));
        Ok(())
    }

    async fn wait_rollout(&self, app: &AppName, ceiling: Duration) -> Result<(), ToolError> {
        if self.rollout_duration <= ceiling {
            tokio::time::sleep(self.rollout_duration).await;
            self.log.record(format!("workloads.rollout {app} complete"));
            Ok(())
        } else {
            tokio::time::sleep(ceiling).await;
            self.log.record(format!("workloads.rollout {app} timeout"));
            Err(command_failed("kubectl rollout status"))
        }
    }

    async fn list_instances(&self, app: &AppName) -> Result<String, ToolError> {
        self.log.record(format!("workloads.list {app}"));
        Ok(format!("{app}-7f6d8 Running\n"))
    }
}

struct FakeRouting {
    log: CallLog,
    hostname: String,
    ready_at: u32,
    attempts: Arc<AtomicU32>,
}

#[async_trait]
impl RoutingApi for FakeRouting {
    async fn apply(&self, manifest: &Path) -> Result<(), ToolError> {
        self.log
            .record(format!("routing.apply {}", manifest.display()));
        Ok(())
    }

    async fn ingress_hostname(&self, _app: &AppName) -> Result<Option<String>, ToolError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt >= self.ready_at {
            Ok(Some(self.hostname.clone()))
        } else {
            Ok(None)
        }
    }

    async fn controller_hostname(
        &self,
        namespace: &str,
        service: &str,
    ) -> Result<Option<String>, ToolError> {
        self.log
            .record(format!("routing.controller {namespace}/{service}"));
        Ok(None)
    }
}

struct FakeProbe {
    log: CallLog,
    fail: bool,
    status: u16,
}

#[async_trait]
impl HttpProbe for FakeProbe {
    async fn head(&self, url: &str) -> Result<u16, ToolError> {
        self.log.record(format!("probe {url}"));
        if self.fail {
            return Err(ToolError::Http("connection refused".to_string()));
        }
        Ok(self.status)
    }
}

/// Pipeline config with millisecond-scale timings suitable for tests.
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        app: AppName::new("myapp").unwrap(),
        repository: Repository::parse("registry.example.com/team/myapp").unwrap(),
        cluster: "prod".to_string(),
        region: "eu-west-1".to_string(),
        namespace: "default".to_string(),
        manifests: ManifestPaths {
            deployment: PathBuf::from("k8s/deployment.yaml"),
            service: PathBuf::from("k8s/service.yaml"),
            ingress: PathBuf::from("k8s/ingress.yaml"),
        },
        image_token: "IMAGE_TAG".to_string(),
        rollout_timeout: Duration::from_millis(300),
        endpoint: EndpointConfig {
            deadline: Duration::from_millis(600),
            interval: Duration::from_millis(10),
            settle_delay: Duration::from_millis(2),
        },
        controller_service: None,
        smoke_paths: vec!["/".to_string(), "/health".to_string()],
        build_context: PathBuf::from("."),
    }
}
