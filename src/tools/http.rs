// ABOUTME: HTTP reachability probe backed by reqwest.
// ABOUTME: Used for best-effort smoke checks against the discovered endpoint.

use async_trait::async_trait;
use std::time::Duration;

use super::{HttpProbe, ToolError};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: reqwest::Client,
}

impl ReqwestProbe {
    pub fn new() -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| ToolError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn head(&self, url: &str) -> Result<u16, ToolError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}
