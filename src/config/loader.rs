//! Configuration Loader - File Loading, Env Overrides and Validation
//!
//! Handles loading `config.toml`, layering environment variables on
//! top, validating all parameters, and providing clear error messages
//! for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};

use super::{AppConfig, InfluxConfig};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "POLLER_CONFIG";

/// Config file used when `POLLER_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Upper bound on `lookback_days`.
const MAX_LOOKBACK_DAYS: u32 = 31;

/// Upper bound on `interval_seconds` (one week).
const MAX_INTERVAL_SECONDS: u64 = 7 * 24 * 3600;

/// Load configuration from `path`, the process environment, and defaults.
///
/// A missing file is not an error: defaults plus environment
/// variables are used instead.
///
/// # Errors
/// Returns detailed error if:
/// - The file exists but can't be read
/// - TOML parsing fails
/// - An environment override is malformed
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
///
/// # Errors
/// See [`load_config`].
pub fn load_config_with<F>(path: &str, env: F) -> Result<AppConfig>
where
  F: Fn(&str) -> Option<String>,
{
  let path = Path::new(path);

  let mut config = if path.exists() {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
      .with_context(|| format!("Failed to parse {}", path.display()))?
  } else {
    AppConfig::default()
  };

  apply_env_overrides(&mut config, env)?;
  validate_config(&config)?;

  Ok(config)
}

/// Parse TOML content into a config without validating it.
///
/// # Errors
/// Returns error if the content is not valid TOML for [`AppConfig`].
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).context("Invalid TOML configuration")
}

/// Apply environment variable overrides.
///
/// Recognised variables: `API_URL`, `POLLING_INTERVAL`, `DEBUG_MODE`,
/// `POLLER_TIMEZONE`, `LOOKBACK_DAYS`, `INFLUX_URL`, `INFLUX_ORG`,
/// `INFLUX_BUCKET`, `INFLUX_MEASUREMENT`. Setting `INFLUX_URL` enables
/// the InfluxDB section when the file has none. `DEBUG_MODE` only
/// raises the log level; it never turns off writes.
///
/// # Errors
/// Returns error if a numeric variable does not parse.
pub fn apply_env_overrides<F>(config: &mut AppConfig, env: F) -> Result<()>
where
  F: Fn(&str) -> Option<String>,
{
  let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

  if let Some(url) = var("API_URL") {
    config.api.url = url;
  }
  if let Some(interval) = var("POLLING_INTERVAL") {
    config.poller.interval_seconds = interval
      .trim()
      .parse()
      .with_context(|| format!("POLLING_INTERVAL must be whole seconds, got {interval:?}"))?;
  }
  if let Some(debug) = var("DEBUG_MODE") {
    if matches!(debug.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes") {
      config.poller.log_level = "debug".to_string();
    }
  }
  if let Some(tz) = var("POLLER_TIMEZONE") {
    config.poller.timezone = tz;
  }
  if let Some(days) = var("LOOKBACK_DAYS") {
    config.poller.lookback_days = days
      .trim()
      .parse()
      .with_context(|| format!("LOOKBACK_DAYS must be a whole number, got {days:?}"))?;
  }

  if let Some(url) = var("INFLUX_URL") {
    config.influx.get_or_insert_with(InfluxConfig::default).url = url;
  }
  if let Some(influx) = config.influx.as_mut() {
    if let Some(org) = var("INFLUX_ORG") {
      influx.org = org;
    }
    if let Some(bucket) = var("INFLUX_BUCKET") {
      influx.bucket = bucket;
    }
    if let Some(measurement) = var("INFLUX_MEASUREMENT") {
      influx.measurement = measurement;
    }
  }

  Ok(())
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    config.poller.interval_seconds > 0,
    "poller.interval_seconds must be positive"
  );
  anyhow::ensure!(
    config.poller.interval_seconds <= MAX_INTERVAL_SECONDS,
    "poller.interval_seconds must be at most {MAX_INTERVAL_SECONDS}, got {}",
    config.poller.interval_seconds
  );
  anyhow::ensure!(
    config.poller.lookback_days <= MAX_LOOKBACK_DAYS,
    "poller.lookback_days must be at most {MAX_LOOKBACK_DAYS}, got {}",
    config.poller.lookback_days
  );
  config
    .poller
    .timezone_policy()
    .context("poller.timezone is invalid")?;

  // API validation
  anyhow::ensure!(!config.api.url.trim().is_empty(), "api.url must not be empty");
  anyhow::ensure!(
    config.api.timeout_seconds > 0,
    "api.timeout_seconds must be positive"
  );

  // InfluxDB validation
  if let Some(influx) = &config.influx {
    anyhow::ensure!(!influx.url.trim().is_empty(), "influx.url must not be empty");
    anyhow::ensure!(!influx.org.trim().is_empty(), "influx.org must not be empty");
    anyhow::ensure!(
      !influx.bucket.trim().is_empty(),
      "influx.bucket must not be empty"
    );
    anyhow::ensure!(
      !influx.measurement.trim().is_empty(),
      "influx.measurement must not be empty"
    );
    anyhow::ensure!(
      influx.timeout_seconds > 0,
      "influx.timeout_seconds must be positive"
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;
  use std::io::Write;

  use super::*;

  fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
      .collect();
    move |key: &str| map.get(key).cloned()
  }

  #[test]
  fn test_missing_file_uses_defaults() {
    let config = load_config_with("nonexistent.toml", env_of(&[])).unwrap();
    assert_eq!(config.poller.interval_seconds, 3600);
    assert_eq!(config.poller.lookback_days, 1);
    assert!(config.influx.is_none());
    assert_eq!(config.api.timeout_seconds, 30);
  }

  #[test]
  fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
      file,
      r#"
[poller]
interval_seconds = 900
timezone = "+05:30"
dry_run = true

[api]
url = "https://partner.example.com/metrics"

[influx]
url = "http://influx:8086"
org = "home"
bucket = "ring"

[influx.tags]
source = "ultrahuman"
"#
    )
    .unwrap();

    let config = load_config_with(file.path().to_str().unwrap(), env_of(&[])).unwrap();
    assert_eq!(config.poller.interval_seconds, 900);
    assert!(config.poller.dry_run);
    assert_eq!(config.api.url, "https://partner.example.com/metrics");
    let influx = config.influx.unwrap();
    assert_eq!(influx.bucket, "ring");
    assert_eq!(influx.measurement, "daily_metrics");
    assert_eq!(influx.tags.get("source").map(String::as_str), Some("ultrahuman"));
  }

  #[test]
  fn test_env_overrides() {
    let config = load_config_with(
      "nonexistent.toml",
      env_of(&[
        ("API_URL", "https://api.example.com/daily"),
        ("POLLING_INTERVAL", "60"),
        ("DEBUG_MODE", "TRUE"),
        ("POLLER_TIMEZONE", "utc"),
        ("INFLUX_URL", "http://db:8086"),
        ("INFLUX_ORG", "org"),
        ("INFLUX_BUCKET", "bucket"),
      ]),
    )
    .unwrap();

    assert_eq!(config.api.url, "https://api.example.com/daily");
    assert_eq!(config.poller.interval_seconds, 60);
    assert_eq!(config.poller.log_level, "debug");
    assert_eq!(config.poller.timezone, "utc");
    let influx = config.influx.unwrap();
    assert_eq!(influx.url, "http://db:8086");
    assert_eq!(influx.org, "org");
    assert_eq!(influx.bucket, "bucket");
  }

  #[test]
  fn test_debug_mode_keeps_writes_enabled() {
    let config = load_config_with(
      "nonexistent.toml",
      env_of(&[
        ("DEBUG_MODE", "true"),
        ("INFLUX_URL", "http://db:8086"),
        ("INFLUX_ORG", "org"),
        ("INFLUX_BUCKET", "bucket"),
      ]),
    )
    .unwrap();

    assert!(!config.poller.dry_run);
    assert!(config.influx.is_some());
    assert_eq!(config.poller.log_level, "debug");
  }

  #[test]
  fn test_debug_mode_false_keeps_log_level() {
    let config = load_config_with("nonexistent.toml", env_of(&[("DEBUG_MODE", "false")])).unwrap();
    assert_eq!(config.poller.log_level, "info");
    assert!(!config.poller.dry_run);
  }

  #[test]
  fn test_measurement_override() {
    let config = load_config_with(
      "nonexistent.toml",
      env_of(&[
        ("INFLUX_URL", "http://db:8086"),
        ("INFLUX_ORG", "org"),
        ("INFLUX_BUCKET", "bucket"),
        ("INFLUX_MEASUREMENT", "ultrahuman_daily"),
      ]),
    )
    .unwrap();
    assert_eq!(config.influx.unwrap().measurement, "ultrahuman_daily");
  }

  #[test]
  fn test_interval_upper_bound() {
    let week = load_config_with("nonexistent.toml", env_of(&[("POLLING_INTERVAL", "604800")]));
    assert_eq!(week.unwrap().poller.interval_seconds, 604_800);

    let huge = load_config_with(
      "nonexistent.toml",
      env_of(&[("POLLING_INTERVAL", "18446744073709551615")]),
    );
    assert!(huge.is_err());
  }

  #[test]
  fn test_org_without_influx_url_is_ignored() {
    let config = load_config_with("nonexistent.toml", env_of(&[("INFLUX_ORG", "org")])).unwrap();
    assert!(config.influx.is_none());
  }

  #[test]
  fn test_bad_interval_env_is_rejected() {
    let result = load_config_with("nonexistent.toml", env_of(&[("POLLING_INTERVAL", "hourly")]));
    assert!(result.is_err());
  }

  #[test]
  fn test_validation_failures() {
    let cases = [
      "[poller]\ninterval_seconds = 0\n",
      "[poller]\ninterval_seconds = 604801\n",
      "[poller]\nlookback_days = 400\n",
      "[poller]\ntimezone = \"Mars/Olympus\"\n",
      "[api]\nurl = \"\"\n",
      "[influx]\nurl = \"http://db:8086\"\n",
    ];
    for content in cases {
      let mut file = tempfile::NamedTempFile::new().unwrap();
      file.write_all(content.as_bytes()).unwrap();
      let result = load_config_with(file.path().to_str().unwrap(), env_of(&[]));
      assert!(result.is_err(), "accepted {content:?}");
    }
  }

  #[test]
  fn test_invalid_toml_is_rejected() {
    assert!(parse_config("[poller\ninterval_seconds = ").is_err());
  }
}
