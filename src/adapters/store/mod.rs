//! Store Adapters - Time-Series Persistence
//!
//! Implements the `PointSink` port. Points go to InfluxDB 2.x as line
//! protocol, or are only logged in dry-run mode.

pub mod dry_run;
pub mod influx;
pub mod line_protocol;

pub use dry_run::DryRunSink;
pub use influx::InfluxWriter;
pub use line_protocol::Series;
