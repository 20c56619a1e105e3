//! Metrics Backend Client
//!
//! Thin read-only HTTP client over the backend's JSON endpoints. It
//! classifies failures into the pipeline taxonomy (transport, timeout,
//! malformed body) and hands raw payloads to the validators; it never
//! interprets metric semantics itself.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DashboardConfig;
use crate::error::MetricsError;

/// One generated quote from the parametrized quote endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub quote: String,
    pub author: String,
}

#[derive(Clone)]
pub struct MetricsClient {
    client: Client,
    base_url: String,
}

impl MetricsClient {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to build MetricsClient")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[inline]
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the body as JSON, mapping every failure
    /// mode onto the error taxonomy.
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, MetricsError> {
        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| classify_request_error(path, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MetricsError::Transport(format!(
                "GET {path} returned {status}"
            )));
        }

        resp.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                MetricsError::Timeout(format!("GET {path}: {e}"))
            } else {
                MetricsError::Validation(format!("GET {path}: malformed JSON body: {e}"))
            }
        })
    }

    pub async fn daily_active_users(&self) -> Result<Value, MetricsError> {
        self.get_json("/metrics/daily-active-users", &[]).await
    }

    pub async fn api_requests(&self) -> Result<Value, MetricsError> {
        self.get_json("/metrics/api-requests", &[]).await
    }

    pub async fn new_signups(&self) -> Result<Value, MetricsError> {
        self.get_json("/metrics/new-signups", &[]).await
    }

    pub async fn endpoint_errors(&self) -> Result<Value, MetricsError> {
        self.get_json("/metrics/endpoint-error", &[]).await
    }

    pub async fn feature_usage(&self) -> Result<Value, MetricsError> {
        self.get_json("/metrics/feature-usage", &[]).await
    }

    pub async fn country_metrics(&self) -> Result<Value, MetricsError> {
        self.get_json("/metrics/country-metrics", &[]).await
    }

    pub async fn response_times(&self) -> Result<Value, MetricsError> {
        self.get_json("/metrics/response-times", &[]).await
    }

    /// Fetch `n` generated quotes (`n` is clamped to at least 1).
    pub async fn quotes(&self, n: u32) -> Result<Vec<Quote>, MetricsError> {
        let n = n.max(1);
        let payload = self.get_json("/quotes", &[("n", n.to_string())]).await?;
        serde_json::from_value(payload).map_err(|e| {
            MetricsError::Validation(format!("GET /quotes: unexpected shape: {e}"))
        })
    }
}

fn classify_request_error(path: &str, err: &reqwest::Error) -> MetricsError {
    if err.is_timeout() {
        MetricsError::Timeout(format!("GET {path}: {err}"))
    } else {
        MetricsError::Transport(format!("GET {path} failed: {err}"))
    }
}
