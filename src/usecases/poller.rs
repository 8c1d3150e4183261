//! Poller - Fetch, Extract, Write, Sleep, Repeat
//!
//! The single use case of this crate. Each tick runs one poll cycle:
//! 1. Fetch the raw reading for the query window
//! 2. Extract the tracked metrics
//! 3. Write them to the sink as one batch
//!
//! Every stage failure is caught at the cycle boundary and logged;
//! the loop itself only stops on shutdown.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::domain::{Extractor, PollError, QueryWindow, TimezonePolicy};
use crate::ports::{MetricsSource, PointSink};

/// Loop settings resolved from configuration.
#[derive(Debug, Clone, Copy)]
pub struct PollerSettings {
  /// Delay between cycle starts.
  pub interval: Duration,
  /// Timezone deciding "today" and day boundaries.
  pub timezone: TimezonePolicy,
  /// Extra past days requested with today.
  pub lookback_days: u32,
}

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
  /// Waiting for the next tick.
  Idle,
  /// Executing a poll cycle.
  Running,
}

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
  /// Points were handed to the sink.
  Written(usize),
  /// The reading contained none of the tracked metrics.
  NoData,
  /// A stage failed; the cycle's data is lost.
  Failed(PollError),
}

impl fmt::Display for CycleOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Written(n) => write!(f, "written({n})"),
      Self::NoData => write!(f, "no_data"),
      Self::Failed(e) => write!(f, "failed({})", e.kind()),
    }
  }
}

/// Drives poll cycles on a fixed interval.
pub struct Poller {
  /// Health API port.
  source: Arc<dyn MetricsSource>,
  /// Time-series store port.
  sink: Arc<dyn PointSink>,
  /// Response-to-points mapping.
  extractor: Extractor,
  /// Loop settings.
  settings: PollerSettings,
  /// Current state.
  state: PollerState,
  /// Cycles run since start.
  cycles: u64,
}

impl Poller {
  /// Create a poller over the given ports.
  pub fn new(
    source: Arc<dyn MetricsSource>,
    sink: Arc<dyn PointSink>,
    settings: PollerSettings,
  ) -> Self {
    Self {
      source,
      sink,
      extractor: Extractor::new(settings.timezone),
      settings,
      state: PollerState::Idle,
      cycles: 0,
    }
  }

  /// Current orchestrator state.
  pub const fn state(&self) -> PollerState {
    self.state
  }

  /// Number of cycles run so far.
  pub const fn cycles(&self) -> u64 {
    self.cycles
  }

  /// Query window for a cycle starting at `now`.
  pub fn window_at(&self, now: DateTime<Utc>) -> QueryWindow {
    QueryWindow::ending_on(self.settings.timezone.today(now), self.settings.lookback_days)
  }

  /// Run one fetch → extract → write cycle.
  ///
  /// Never fails: stage errors are logged and reported in the outcome.
  /// The poller is back to `Idle` when this returns.
  pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleOutcome {
    let cycle_id = Uuid::new_v4();
    let window = self.window_at(now);
    let span = info_span!("poll_cycle", %cycle_id, cycle_at = %now, %window);

    self.state = PollerState::Running;
    self.cycles += 1;
    let outcome = self.execute(window).instrument(span.clone()).await;
    self.state = PollerState::Idle;

    span.in_scope(|| match &outcome {
      CycleOutcome::Failed(e) if !e.is_retryable() => error!(
        stage = %e.stage(),
        kind = e.kind(),
        error = %e,
        "Poll cycle failed: credential rejected, fix API_TOKEN"
      ),
      CycleOutcome::Failed(e) => warn!(
        stage = %e.stage(),
        kind = e.kind(),
        error = %e,
        "Poll cycle failed, retrying next cycle"
      ),
      CycleOutcome::NoData => info!("Poll cycle finished with no data"),
      CycleOutcome::Written(n) => info!(points = n, "Poll cycle finished"),
    });

    outcome
  }

  async fn execute(&self, window: QueryWindow) -> CycleOutcome {
    let reading = match self.source.fetch(&window).await {
      Ok(reading) => reading,
      Err(e) => return CycleOutcome::Failed(e),
    };

    let points = self.extractor.extract(&reading);
    if points.is_empty() {
      return CycleOutcome::NoData;
    }
    debug!(points = points.len(), sink = self.sink.name(), "Writing batch");

    match self.sink.write_batch(&points).await {
      Ok(written) => CycleOutcome::Written(written),
      Err(e) => CycleOutcome::Failed(e),
    }
  }

  /// Run cycles until a shutdown signal arrives.
  ///
  /// The first cycle starts immediately. A cycle in progress always
  /// runs to completion; missed ticks are delayed, not bursted.
  pub async fn run(&mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
    let mut ticker = tokio::time::interval(self.settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
      source = self.source.name(),
      sink = self.sink.name(),
      interval_secs = self.settings.interval.as_secs(),
      timezone = %self.settings.timezone,
      lookback_days = self.settings.lookback_days,
      "Poller started"
    );

    loop {
      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!(cycles = self.cycles, "Poller received shutdown signal");
          break;
        }
        _ = ticker.tick() => {
          self.run_cycle(Utc::now()).await;
        }
      }
    }

    Ok(())
  }
}
