//! Dashboard Configuration

use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for the dashboard engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the metrics backend
    pub base_url: String,
    /// Per-request deadline in seconds; expiry surfaces as a timeout error
    pub request_timeout_secs: u64,
    /// How many categories the country ranking keeps
    pub top_categories: usize,
    /// Default number of quotes the quote board requests
    pub default_quote_count: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
            top_categories: 15,
            default_quote_count: 3,
        }
    }
}

impl DashboardConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply environment overrides on top of the current values.
    /// Honors `PULSEBOARD_BASE_URL` and `PULSEBOARD_TIMEOUT_SECS`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("PULSEBOARD_BASE_URL") {
            if !url.is_empty() {
                self.base_url = url;
            }
        }
        if let Some(secs) = env::var("PULSEBOARD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.request_timeout_secs = secs;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
