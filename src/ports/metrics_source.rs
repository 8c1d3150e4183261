//! Metrics Source Port - Health API Fetch Interface
//!
//! One call per poll cycle. Implementations must not retry internally;
//! the next scheduled cycle is the retry mechanism.

use async_trait::async_trait;

use crate::domain::{PollError, QueryWindow, RawReading};

/// Trait for health-metrics providers.
#[async_trait]
pub trait MetricsSource: Send + Sync + 'static {
  /// Fetch the raw reading covering `window`.
  ///
  /// # Errors
  /// - `PollError::Transient` on network failure or server error
  /// - `PollError::Auth` when the credential is rejected
  /// - `PollError::Parse` when the body is not a readable document
  async fn fetch(&self, window: &QueryWindow) -> Result<RawReading, PollError>;

  /// Human-readable source name for logs.
  fn name(&self) -> &'static str;
}
