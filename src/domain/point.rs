//! Time-series point produced once per metric per cycle.

use chrono::{DateTime, Utc};

use super::metric::MetricName;

/// A single (metric, value, timestamp) sample headed for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    /// Metric name from the closed set.
    pub name: MetricName,
    /// Numeric value, always finite.
    pub value: f64,
    /// Start of the day the value belongs to.
    pub timestamp: DateTime<Utc>,
}

impl MetricPoint {
    pub const fn new(name: MetricName, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            name,
            value,
            timestamp,
        }
    }
}
