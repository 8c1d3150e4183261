//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients). Each sub-module groups
//! adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `api`: Ultrahuman daily metrics client and credential
//! - `store`: InfluxDB line-protocol writer and dry-run sink

pub mod api;
pub mod store;
