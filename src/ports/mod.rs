//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the poller requires from the
//! outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `MetricsSource`: Fetches one raw reading from the health API
//! - `PointSink`: Persists a batch of metric points

pub mod metrics_source;
pub mod point_sink;

pub use metrics_source::MetricsSource;
pub use point_sink::PointSink;
