//! Metric Extractor — Raw Reading to Metric Points
//!
//! Walks a response document and pulls out the sixteen tracked metrics.
//! Pure renaming and numeric coercion; no derived values.
//!
//! Day records are located in this order:
//! 1. `data.daily_data` keyed by `YYYY-MM-DD` (one record per day)
//! 2. the `data` object, or the root object, as a single record for the
//!    window's end date
//!
//! Inside a record a metric is looked up at `<category>.<name>` first,
//! then at `<name>`. Missing and `null` values are skipped silently;
//! values that cannot be read as a finite number are dropped with a
//! warning.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::calendar::TimezonePolicy;
use super::metric::MetricName;
use super::point::MetricPoint;
use super::reading::RawReading;

/// Stateless extractor bound to a timezone policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    timezone: TimezonePolicy,
}

impl Extractor {
    pub const fn new(timezone: TimezonePolicy) -> Self {
        Self { timezone }
    }

    /// Extract every recognised metric present in `reading`.
    ///
    /// Never fails: malformed documents simply produce no points.
    pub fn extract(&self, reading: &RawReading) -> Vec<MetricPoint> {
        let mut points = Vec::new();

        for (date, record) in day_records(reading) {
            let timestamp = self.timezone.day_start(date);
            for metric in MetricName::ALL {
                if let Some(value) = lookup(record, metric).and_then(|raw| coerce(metric, date, raw)) {
                    points.push(MetricPoint::new(metric, value, timestamp));
                }
            }
        }

        debug!(points = points.len(), window = %reading.window, "Extraction finished");
        points
    }
}

/// Day records in ascending date order.
fn day_records(reading: &RawReading) -> Vec<(NaiveDate, &Map<String, Value>)> {
    let body = &reading.body;

    if let Some(daily) = body.pointer("/data/daily_data").and_then(Value::as_object) {
        let mut records: Vec<_> = daily
            .iter()
            .filter_map(|(key, value)| {
                let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") else {
                    warn!(key = %key, "Skipping daily_data entry with non-date key");
                    return None;
                };
                let Some(record) = value.as_object() else {
                    if !value.is_null() {
                        warn!(date = %date, "Skipping daily_data entry that is not an object");
                    }
                    return None;
                };
                Some((date, record))
            })
            .collect();
        records.sort_by_key(|(date, _)| *date);
        return records;
    }

    let record = body
        .get("data")
        .and_then(Value::as_object)
        .or_else(|| body.as_object());

    match record {
        Some(record) => vec![(reading.window.end, record)],
        None => {
            debug!("Response body is not an object, nothing to extract");
            Vec::new()
        }
    }
}

fn lookup(record: &Map<String, Value>, metric: MetricName) -> Option<&Value> {
    record
        .get(metric.category().key())
        .and_then(|category| category.get(metric.as_str()))
        .or_else(|| record.get(metric.as_str()))
        .filter(|value| !value.is_null())
}

fn coerce(metric: MetricName, date: NaiveDate, raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match value {
        Some(v) if v.is_finite() => Some(v),
        _ => {
            warn!(
                metric = %metric,
                date = %date,
                value = %raw,
                "Dropping non-numeric metric value"
            );
            None
        }
    }
}
