// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates an anodos.yml template file.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

pub fn init_config(dir: &Path, app: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let app = app.unwrap_or("myapp");
    if let Err(e) = crate::types::AppName::new(app) {
        return Err(Error::InvalidConfig(e.to_string()));
    }

    let yaml = generate_template_yaml(app);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(app: &str) -> String {
    format!(
        r#"app: {app}
repository: registry.example.com/team/{app}
cluster: my-cluster
region: eu-west-1
# namespace: default
manifests:
  deployment: k8s/deployment.yaml
  service: k8s/service.yaml
  ingress: k8s/ingress.yaml
# Token in the deployment manifest replaced with the versioned image tag
# image_token: IMAGE_TAG
# rollout_timeout: 5m
# endpoint:
#   deadline: 10m
#   interval: 15s
#   settle_delay: 10s
# Fallback hostname source when the ingress reports none
# controller_service: ingress-nginx/ingress-nginx-controller
smoke_paths:
  - /
  - /health
"#
    )
}
