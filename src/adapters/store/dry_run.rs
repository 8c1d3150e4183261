//! Dry-run sink: logs the line protocol a real write would send.

use async_trait::async_trait;
use tracing::info;

use super::line_protocol::Series;
use crate::domain::{MetricPoint, PollError};
use crate::ports::PointSink;

/// Sink used when no InfluxDB target is configured or dry-run is on.
pub struct DryRunSink {
    series: Series,
}

impl DryRunSink {
    pub const fn new(series: Series) -> Self {
        Self { series }
    }
}

#[async_trait]
impl PointSink for DryRunSink {
    async fn write_batch(&self, points: &[MetricPoint]) -> Result<usize, PollError> {
        if points.is_empty() {
            return Ok(0);
        }
        for line in self.series.encode(points).lines() {
            info!(line = %line, "Dry run, point not written");
        }
        Ok(points.len())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use super::*;
    use crate::domain::MetricName;

    #[tokio::test]
    async fn test_reports_points_as_written() {
        let sink = DryRunSink::new(Series::new("daily_metrics", BTreeMap::new()));
        let points = [
            MetricPoint::new(MetricName::AvgRhr, 52.0, Utc::now()),
            MetricPoint::new(MetricName::AvgHrv, 61.0, Utc::now()),
        ];
        assert_eq!(sink.write_batch(&points).await, Ok(2));
        assert_eq!(sink.write_batch(&[]).await, Ok(0));
    }
}
