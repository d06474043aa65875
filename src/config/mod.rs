// ABOUTME: Configuration types and parsing for anodos.yml.
// ABOUTME: Handles YAML parsing, duration fields, and validation at the edge.

mod init;

pub use init::init_config;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{AppName, Repository};

pub const CONFIG_FILENAME: &str = "anodos.yml";
pub const CONFIG_FILENAME_ALT: &str = "anodos.yaml";

/// Configuration for one pipeline run, loaded from `anodos.yml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(deserialize_with = "deserialize_app_name")]
    pub app: AppName,

    #[serde(deserialize_with = "deserialize_repository")]
    pub repository: Repository,

    pub cluster: String,

    pub region: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    pub manifests: ManifestPaths,

    /// Token in the deployment manifest replaced by the versioned image
    /// reference before apply.
    #[serde(default = "default_image_token")]
    pub image_token: String,

    #[serde(default = "default_rollout_timeout", with = "humantime_serde")]
    pub rollout_timeout: Duration,

    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// `namespace/name` of the ingress controller service, used as a
    /// fallback source for the load-balancer hostname.
    #[serde(default)]
    pub controller_service: Option<String>,

    #[serde(default)]
    pub smoke_paths: Vec<String>,

    #[serde(default = "default_build_context")]
    pub build_context: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestPaths {
    pub deployment: PathBuf,
    pub service: PathBuf,
    pub ingress: PathBuf,
}

/// Endpoint-discovery tunables.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_deadline", with = "humantime_serde")]
    pub deadline: Duration,

    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Pause between applying the ingress and the first routing read. A
    /// heuristic race mitigation, not a controller contract.
    #[serde(default = "default_settle_delay", with = "humantime_serde")]
    pub settle_delay: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            deadline: default_deadline(),
            interval: default_interval(),
            settle_delay: default_settle_delay(),
        }
    }
}

impl PipelineConfig {
    /// Look for anodos.yml (or anodos.yaml) in the given directory.
    pub fn discover(dir: &Path) -> Result<Self> {
        for name in [CONFIG_FILENAME, CONFIG_FILENAME_ALT] {
            let path = dir.join(name);
            if path.is_file() {
                return Self::from_file(&path);
            }
        }
        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.cluster.trim().is_empty() {
            return Err(Error::InvalidConfig("cluster cannot be empty".to_string()));
        }
        if self.region.trim().is_empty() {
            return Err(Error::InvalidConfig("region cannot be empty".to_string()));
        }
        if self.namespace.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "namespace cannot be empty".to_string(),
            ));
        }
        if self.image_token.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "image_token cannot be empty".to_string(),
            ));
        }
        if let Some(service) = &self.controller_service
            && !service.contains('/')
        {
            return Err(Error::InvalidConfig(format!(
                "controller_service must be namespace/name, got: {service}"
            )));
        }
        for path in &self.smoke_paths {
            if !path.starts_with('/') {
                return Err(Error::InvalidConfig(format!(
                    "smoke path must start with '/': {path}"
                )));
            }
        }
        Ok(())
    }

    /// The ingress controller service split into (namespace, name).
    ///
    /// `validate` guarantees the separator is present.
    pub fn controller_service_parts(&self) -> Option<(&str, &str)> {
        self.controller_service
            .as_deref()
            .and_then(|s| s.split_once('/'))
    }
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_image_token() -> String {
    "IMAGE_TAG".to_string()
}

fn default_rollout_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_deadline() -> Duration {
    Duration::from_secs(600)
}

fn default_interval() -> Duration {
    Duration::from_secs(15)
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_build_context() -> PathBuf {
    PathBuf::from(".")
}

fn deserialize_app_name<'de, D>(deserializer: D) -> std::result::Result<AppName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    AppName::new(&s).map_err(serde::de::Error::custom)
}

fn deserialize_repository<'de, D>(deserializer: D) -> std::result::Result<Repository, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Repository::parse(&s).map_err(serde::de::Error::custom)
}
