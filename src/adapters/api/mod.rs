//! Ultrahuman API Adapter
//!
//! Implements the `MetricsSource` port over HTTPS.
//!
//! Sub-modules:
//! - `auth`: Opaque token credential loaded from the environment
//! - `client`: HTTP client with timeout and status classification

pub mod auth;
pub mod client;

pub use auth::ApiCredential;
pub use client::{UltrahumanClient, UltrahumanClientConfig};
