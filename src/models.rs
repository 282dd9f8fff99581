use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::errors::Result;
use crate::upstream::UpstreamClient;

/// Read-only state shared by every request.
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let upstream = UpstreamClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            upstream,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub success: bool,
    pub message: String,
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub message: String,
    pub action: &'static str,
    pub data: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub base_url: String,
    pub api_prefix: &'static str,
    pub api_version: &'static str,
    pub auth_mode: &'static str,
    pub proxy_version: &'static str,
}

impl SettingsSnapshot {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_prefix: config.api_style.prefix(),
            api_version: config.api_style.version_marker(),
            auth_mode: config.credential.mode(),
            proxy_version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
