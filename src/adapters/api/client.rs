//! Ultrahuman HTTP Client - Daily Metrics Fetcher
//!
//! Wraps reqwest with the credential header, a request timeout, and
//! status classification for the daily metrics endpoint. Exactly one
//! request per call; the poll interval is the retry policy.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::auth::ApiCredential;
use crate::config::ApiConfig;
use crate::domain::{PollError, QueryWindow, RawReading};
use crate::ports::MetricsSource;

/// Query date format expected by the API.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest error body excerpt kept in error messages.
const BODY_EXCERPT_LEN: usize = 200;

/// Configuration for the Ultrahuman HTTP client.
#[derive(Debug, Clone)]
pub struct UltrahumanClientConfig {
    /// Daily metrics endpoint URL.
    pub url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for UltrahumanClientConfig {
    fn default() -> Self {
        Self {
            url: "https://ops.ultrahuman.com/api/web_dashboard/daily_trend".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ApiConfig> for UltrahumanClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            url: api.url.clone(),
            timeout: api.timeout(),
        }
    }
}

/// HTTP client for the Ultrahuman daily metrics API.
pub struct UltrahumanClient {
    /// Underlying HTTP client.
    http: Client,
    /// Precomputed Authorization header.
    authorization: HeaderValue,
    /// Client configuration.
    config: UltrahumanClientConfig,
}

impl UltrahumanClient {
    /// Create a new client.
    pub fn new(credential: &ApiCredential, config: UltrahumanClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            authorization: credential.header_value()?,
            config,
        })
    }

    /// Endpoint URL this client queries.
    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait]
impl MetricsSource for UltrahumanClient {
    #[instrument(skip(self, window), fields(window = %window))]
    async fn fetch(&self, window: &QueryWindow) -> Result<RawReading, PollError> {
        let start = window.start.format(DATE_FORMAT).to_string();
        let end = window.end.format(DATE_FORMAT).to_string();

        let response = self
            .http
            .get(&self.config.url)
            .header(AUTHORIZATION, self.authorization.clone())
            .query(&[("start_date", start.as_str()), ("end_date", end.as_str())])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, timeout = e.is_timeout(), "Metrics request failed");
                PollError::Transient(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PollError::Transient(format!("reading response body: {e}")))?;

        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| PollError::Parse(format!("invalid JSON ({} bytes): {e}", bytes.len())))?;
        if !body.is_object() {
            return Err(PollError::Parse(format!(
                "expected a JSON object, got {}",
                json_kind(&body)
            )));
        }

        debug!(status = %status, bytes = bytes.len(), "Metrics response received");
        Ok(RawReading::new(body, *window))
    }

    fn name(&self) -> &'static str {
        "ultrahuman"
    }
}

/// Map a non-success status to the error taxonomy.
fn classify_status(status: StatusCode, body: &str) -> PollError {
    let excerpt = excerpt(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PollError::Auth(format!("HTTP {status}: {excerpt}"))
        }
        _ => PollError::Transient(format!("HTTP {status}: {excerpt}")),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn excerpt(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth_statuses() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "bad token"),
            PollError::Auth(msg) if msg.contains("401") && msg.contains("bad token")
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, ""),
            PollError::Auth(_)
        ));
    }

    #[test]
    fn test_classify_other_statuses_as_transient() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::NOT_FOUND,
        ] {
            assert!(matches!(classify_status(status, ""), PollError::Transient(_)));
        }
    }

    #[test]
    fn test_json_kind_names() {
        assert_eq!(json_kind(&serde_json::json!([])), "an array");
        assert_eq!(json_kind(&Value::Null), "null");
        assert_eq!(json_kind(&serde_json::json!("maintenance")), "a string");
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(500);
        assert_eq!(excerpt(&long).chars().count(), BODY_EXCERPT_LEN);
        assert_eq!(excerpt("  short  "), "short");
    }
}
