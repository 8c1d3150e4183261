//! InfluxDB Writer — Batch Point Writes over the v2 HTTP API
//!
//! One `POST /api/v2/write` per cycle carrying every point as line
//! protocol. Single attempt: failures surface as `PollError::Store` and
//! the batch is dropped.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::line_protocol::Series;
use crate::config::InfluxConfig;
use crate::domain::{MetricPoint, PollError};
use crate::ports::PointSink;

/// Environment variable holding the InfluxDB API token.
pub const INFLUX_TOKEN_ENV: &str = "INFLUX_TOKEN";

/// InfluxDB 2.x point writer.
pub struct InfluxWriter {
    /// Underlying HTTP client.
    http: Client,
    /// Full `/api/v2/write` URL.
    write_url: String,
    /// Organization name.
    org: String,
    /// Destination bucket.
    bucket: String,
    /// `Token <...>` header, absent for unauthenticated instances.
    authorization: Option<HeaderValue>,
    /// Measurement and static tags.
    series: Series,
}

impl InfluxWriter {
    /// Create a writer for `config`, authenticating with `token` if given.
    pub fn new(config: &InfluxConfig, token: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build InfluxDB HTTP client")?;

        let authorization = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                let mut value = HeaderValue::from_str(&format!("Token {t}"))
                    .context("INFLUX_TOKEN contains characters not allowed in a header")?;
                value.set_sensitive(true);
                Ok::<_, anyhow::Error>(value)
            })
            .transpose()?;

        Ok(Self {
            http,
            write_url: format!("{}/api/v2/write", config.url.trim_end_matches('/')),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
            authorization,
            series: Series::new(config.measurement.clone(), config.tags.clone()),
        })
    }

    /// Read the optional token from `INFLUX_TOKEN`.
    pub fn token_from_env() -> Option<String> {
        std::env::var(INFLUX_TOKEN_ENV).ok()
    }

    /// Target bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl PointSink for InfluxWriter {
    #[instrument(skip(self, points), fields(points = points.len()))]
    async fn write_batch(&self, points: &[MetricPoint]) -> Result<usize, PollError> {
        if points.is_empty() {
            debug!("Empty batch, nothing to write");
            return Ok(0);
        }

        let body = self.series.encode(points);
        for line in body.lines() {
            debug!(line = %line, "Writing line");
        }

        let mut request = self
            .http
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "s"),
            ])
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body);
        if let Some(auth) = &self.authorization {
            request = request.header(AUTHORIZATION, auth.clone());
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "InfluxDB unreachable");
            PollError::Store(format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PollError::Store(format!("HTTP {status}: {}", text.trim())));
        }

        info!(points = points.len(), "Points written to InfluxDB");
        Ok(points.len())
    }

    fn name(&self) -> &'static str {
        "influxdb"
    }
}
