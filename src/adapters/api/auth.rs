//! API Credential — Opaque Token for the Health API
//!
//! The token is read once from `API_TOKEN` at startup and sent verbatim
//! in the `Authorization` header of every request. It is never logged:
//! `Debug` output is redacted.

use std::fmt;

use anyhow::{Context, Result};
use reqwest::header::HeaderValue;

/// Environment variable holding the API token.
pub const API_TOKEN_ENV: &str = "API_TOKEN";

/// Process-lifetime API credential.
#[derive(Clone)]
pub struct ApiCredential {
    /// Raw token from API_TOKEN (never printed).
    token: String,
}

impl ApiCredential {
    /// Wrap a token, rejecting empty or whitespace-only values.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into().trim().to_string();
        anyhow::ensure!(!token.is_empty(), "API token must not be empty");
        Ok(Self { token })
    }

    /// Load the credential from the `API_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(API_TOKEN_ENV)
            .with_context(|| format!("{API_TOKEN_ENV} not set"))?;
        Self::new(token).with_context(|| format!("{API_TOKEN_ENV} is empty"))
    }

    /// `Authorization` header value, marked sensitive so reqwest
    /// keeps it out of its own debug output.
    pub fn header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.token)
            .context("API token contains characters not allowed in a header")?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("token", &"<redacted>")
            .finish()
    }
}
