//! Configuration Module - TOML-based Poller Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides. Secrets (API and InfluxDB tokens)
//! never live here; they are read from the environment by the
//! adapters that use them.

pub mod loader;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::calendar::{InvalidTimezone, TimezonePolicy};

/// Top-level poller configuration.
///
/// Every section has defaults, so an empty (or missing) file plus
/// environment variables is a valid setup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Loop behaviour and logging.
  pub poller: PollerConfig,
  /// Health API endpoint.
  pub api: ApiConfig,
  /// InfluxDB target. `None` means points are only logged.
  pub influx: Option<InfluxConfig>,
}

/// Loop and process configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
  /// Human-readable instance name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
  /// Delay between cycle starts (seconds).
  pub interval_seconds: u64,
  /// Log points instead of writing them.
  pub dry_run: bool,
  /// "utc", "local" or a fixed offset such as "+05:30".
  pub timezone: String,
  /// Extra past days to request alongside today.
  pub lookback_days: u32,
}

/// Health API endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Daily metrics endpoint URL.
  pub url: String,
  /// Request timeout in seconds.
  pub timeout_seconds: u64,
}

/// InfluxDB 2.x write target.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
  /// Base URL, e.g. `http://localhost:8086`.
  pub url: String,
  /// Organization name.
  pub org: String,
  /// Destination bucket.
  pub bucket: String,
  /// Measurement every point is written under.
  pub measurement: String,
  /// Write timeout in seconds.
  pub timeout_seconds: u64,
  /// Static tags added to every point.
  pub tags: BTreeMap<String, String>,
}

impl PollerConfig {
  /// Interval between cycles.
  pub const fn interval(&self) -> Duration {
    Duration::from_secs(self.interval_seconds)
  }

  /// Parsed timezone policy.
  ///
  /// # Errors
  /// Returns an error if `timezone` is not a recognised policy.
  pub fn timezone_policy(&self) -> Result<TimezonePolicy, InvalidTimezone> {
    self.timezone.parse()
  }
}

impl ApiConfig {
  pub const fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_seconds)
  }
}

impl InfluxConfig {
  pub const fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_seconds)
  }
}

impl Default for PollerConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      interval_seconds: default_interval(),
      dry_run: false,
      timezone: default_timezone(),
      lookback_days: default_lookback(),
    }
  }
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: default_api_url(),
      timeout_seconds: default_api_timeout(),
    }
  }
}

impl Default for InfluxConfig {
  fn default() -> Self {
    Self {
      url: default_influx_url(),
      org: String::new(),
      bucket: String::new(),
      measurement: default_measurement(),
      timeout_seconds: default_influx_timeout(),
      tags: BTreeMap::new(),
    }
  }
}

// Default value functions

fn default_name() -> String {
  "ultrahuman-poller".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

const fn default_interval() -> u64 {
  3600
}

fn default_timezone() -> String {
  "local".to_string()
}

const fn default_lookback() -> u32 {
  1
}

fn default_api_url() -> String {
  "https://ops.ultrahuman.com/api/web_dashboard/daily_trend".to_string()
}

const fn default_api_timeout() -> u64 {
  30
}

fn default_influx_url() -> String {
  "http://localhost:8086".to_string()
}

fn default_measurement() -> String {
  "daily_metrics".to_string()
}

const fn default_influx_timeout() -> u64 {
  10
}
