//! Raw API reading, kept as an untyped JSON document.
//!
//! The third-party response shape is not under our control, so the
//! document is held as `serde_json::Value` and walked by the extractor
//! instead of being deserialized into a rigid struct.

use serde_json::Value;

use super::calendar::QueryWindow;

/// Parsed response document plus the window it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    /// Parsed response body.
    pub body: Value,
    /// Window that was requested.
    pub window: QueryWindow,
}

impl RawReading {
    pub const fn new(body: Value, window: QueryWindow) -> Self {
        Self { body, window }
    }
}
