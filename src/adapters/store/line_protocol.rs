//! InfluxDB line protocol encoding.
//!
//! Points sharing a timestamp are folded into one line, one field per
//! metric:
//!
//! ```text
//! daily_metrics,source=ultrahuman sleep_score=82,total_sleep=420 1714608000
//! ```
//!
//! Timestamps are written in seconds (`precision=s`).

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::domain::MetricPoint;

/// Series identity shared by every line of a batch.
#[derive(Debug, Clone)]
pub struct Series {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
}

impl Series {
    pub fn new(measurement: impl Into<String>, tags: BTreeMap<String, String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags,
        }
    }

    /// Encode `points` as newline-separated lines, ordered by timestamp.
    pub fn encode(&self, points: &[MetricPoint]) -> String {
        let mut by_time: BTreeMap<DateTime<Utc>, Vec<&MetricPoint>> = BTreeMap::new();
        for point in points {
            by_time.entry(point.timestamp).or_default().push(point);
        }

        let prefix = self.prefix();
        let mut out = String::new();
        for (timestamp, group) in by_time {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&prefix);
            out.push(' ');
            for (i, point) in group.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&escape_key(point.name.as_str()));
                // f64 Display never uses exponent notation
                let _ = write!(out, "={}", point.value);
            }
            let _ = write!(out, " {}", timestamp.timestamp());
        }
        out
    }

    /// `measurement[,tag=value...]`; tags with empty keys or values are
    /// not representable and are skipped.
    fn prefix(&self) -> String {
        let mut prefix = escape_measurement(&self.measurement);
        for (key, value) in &self.tags {
            if key.is_empty() || value.is_empty() {
                continue;
            }
            let _ = write!(prefix, ",{}={}", escape_key(key), escape_key(value));
        }
        prefix
    }
}

fn escape_measurement(s: &str) -> String {
    escape(s, &[',', ' '])
}

/// Escaping for tag keys, tag values and field keys.
fn escape_key(s: &str) -> String {
    escape(s, &[',', '=', ' '])
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
