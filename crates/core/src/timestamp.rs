//! Sale timestamp value object.
//!
//! Callers may supply their own timestamp string, which is passed through to
//! the sinks verbatim. When they don't, the server stamps the sale with the
//! current UTC time in [`SaleTimestamp::FORMAT`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Point in time a sale happened, as written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleTimestamp(String);

impl ValueObject for SaleTimestamp {}

impl SaleTimestamp {
    /// `YYYY-MM-DD HH:MM:SS`.
    pub const FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// Server-side timestamp for `instant`.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant.format(Self::FORMAT).to_string())
    }

    /// Use the caller's value when it is present and non-empty, otherwise
    /// default to `now`.
    pub fn from_caller(supplied: Option<String>, now: DateTime<Utc>) -> Self {
        match supplied {
            Some(s) if !s.is_empty() => Self(s),
            _ => Self::at(now),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SaleTimestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
