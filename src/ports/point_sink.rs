//! Point Sink Port - Time-Series Persistence Interface
//!
//! Receives every point of a cycle as one batch. Writes are
//! best-effort single attempts: a failed batch is dropped, not queued.

use async_trait::async_trait;

use crate::domain::{MetricPoint, PollError};

/// Trait for time-series store writers.
#[async_trait]
pub trait PointSink: Send + Sync + 'static {
  /// Write `points` as a single batch and return how many were written.
  ///
  /// An empty slice is a no-op returning `Ok(0)`.
  ///
  /// # Errors
  /// Returns `PollError::Store` if the store is unreachable or
  /// rejects the write.
  async fn write_batch(&self, points: &[MetricPoint]) -> Result<usize, PollError>;

  /// Human-readable sink name for logs.
  fn name(&self) -> &'static str;
}
