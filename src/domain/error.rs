//! Poll Error Taxonomy
//!
//! Typed failures crossing the port boundaries. The orchestrator
//! catches every variant at the cycle boundary; none of them stop the
//! polling loop.

use std::fmt;

use thiserror::Error;

/// Pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Store,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Store => write!(f, "store"),
        }
    }
}

/// Failure of a single poll cycle stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// Network failure or server-side error. Retried on the next cycle.
    #[error("transient API failure: {0}")]
    Transient(String),

    /// Credential rejected. Needs operator intervention.
    #[error("API rejected credential: {0}")]
    Auth(String),

    /// Response body could not be parsed.
    #[error("unparseable API response: {0}")]
    Parse(String),

    /// Time-series store unreachable or rejected the write.
    #[error("store write failed: {0}")]
    Store(String),
}

impl PollError {
    /// Stage that produced this error.
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Transient(_) | Self::Auth(_) | Self::Parse(_) => Stage::Fetch,
            Self::Store(_) => Stage::Store,
        }
    }

    /// Short machine-friendly kind, used as a log field.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transient(_) => "transient",
            Self::Auth(_) => "auth",
            Self::Parse(_) => "parse",
            Self::Store(_) => "store",
        }
    }

    /// Whether waiting for the next cycle can fix this.
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Auth(_))
    }
}
