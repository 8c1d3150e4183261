//! Domain layer - Metric model and extraction logic.
//!
//! Pure types and functions for the poller: the closed metric set,
//! time-series points, the raw API reading, the error taxonomy, and
//! calendar handling. No I/O here (hexagonal architecture inner ring).

pub mod calendar;
pub mod error;
pub mod extract;
pub mod metric;
pub mod point;
pub mod reading;

// Re-export core types for convenience
pub use calendar::{QueryWindow, TimezonePolicy};
pub use error::{PollError, Stage};
pub use extract::Extractor;
pub use metric::{Category, MetricName};
pub use point::MetricPoint;
pub use reading::RawReading;
