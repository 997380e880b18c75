//! External sinks a sale is fanned out to.
//!
//! Two collaborators, each reached over HTTP and each treated as opaque:
//!
//! ```text
//!                ┌─> LedgerSink::append   (spreadsheet row)
//! SaleProcessor ─┤
//!                └─> NotifierSink::send   (chat message)
//! ```
//!
//! The traits are the seam: production wires [`sheets::SheetsClient`] and
//! [`telegram::TelegramClient`], tests wire in-process fakes.
//!
//! ## Error Semantics
//!
//! Every failure of a single call is a [`SinkError`]. Sinks never retry; the
//! processor decides what a failure means for the request.
//!
//! Error messages must never carry secrets. Bot tokens are part of Telegram
//! request URLs, so transport errors are always stripped of their URL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use salesrelay_sales::LedgerRow;

pub mod google_auth;
pub mod sheets;
pub mod telegram;

/// User agent sent by both sink clients.
pub const USER_AGENT: &str = concat!("salesrelay/", env!("CARGO_PKG_VERSION"));

/// Longest upstream error body kept in a [`SinkError::Api`] message.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Error)]
pub enum SinkError {
    /// The request never produced an HTTP response (DNS, connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// The upstream API answered with a failure.
    #[error("{service} API error (HTTP {status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// An access token could not be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Credentials could not be located, read or parsed.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// Client-side misconfiguration (bad base URL, unusable HTTP client).
    #[error("sink misconfigured: {0}")]
    Config(String),
}

impl SinkError {
    pub fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }

    /// Build an [`SinkError::Api`] from a failed response body.
    ///
    /// Google APIs report `{"error": {"message": ...}}`, the Bot API reports
    /// `{"description": ...}`. Anything else is kept verbatim (truncated).
    pub fn api(service: &'static str, status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|v| {
                v.pointer("/error/message")
                    .or_else(|| v.get("description"))
                    .or_else(|| v.get("error_description"))
                    .and_then(|m| m.as_str())
            })
            .map(str::to_string)
            .unwrap_or_else(|| truncate(body, MAX_ERROR_BODY));

        Self::Api {
            service,
            status,
            message,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SinkError::Transport(e) if e.is_timeout())
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

/// Where a product line's rows go: one spreadsheet, one sheet, one column range.
///
/// Fixed per product line at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTarget {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// A1 columns, e.g. `A:E`.
    pub column_range: String,
}

impl LedgerTarget {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        column_range: impl Into<String>,
    ) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            column_range: column_range.into(),
        }
    }

    /// Full A1 range, e.g. `Sheet1!A:E` or `'Продажи 2025'!A:D`.
    ///
    /// Sheet names containing anything other than ASCII letters, digits or `_`
    /// are quoted, with embedded quotes doubled.
    pub fn a1_range(&self) -> String {
        let plain = !self.sheet_name.is_empty()
            && self
                .sheet_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain {
            format!("{}!{}", self.sheet_name, self.column_range)
        } else {
            format!(
                "'{}'!{}",
                self.sheet_name.replace('\'', "''"),
                self.column_range
            )
        }
    }
}

/// Append-only row store (the sales ledger).
#[async_trait]
pub trait LedgerSink: Send + Sync {
    /// Append exactly one row after the existing data of `target`.
    ///
    /// Values are interpreted as if typed by a user, so the backend may
    /// auto-format numbers and dates.
    async fn append(&self, target: &LedgerTarget, row: &LedgerRow) -> Result<(), SinkError>;
}

/// One-shot message sender bound to a single destination chat.
#[async_trait]
pub trait NotifierSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), SinkError>;
}

#[async_trait]
impl<T> LedgerSink for Arc<T>
where
    T: LedgerSink + ?Sized,
{
    async fn append(&self, target: &LedgerTarget, row: &LedgerRow) -> Result<(), SinkError> {
        (**self).append(target, row).await
    }
}

#[async_trait]
impl<T> NotifierSink for Arc<T>
where
    T: NotifierSink + ?Sized,
{
    async fn send(&self, text: &str) -> Result<(), SinkError> {
        (**self).send(text).await
    }
}

/// Shared HTTP client settings for the sink clients.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, SinkError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| SinkError::Config(format!("failed to build HTTP client: {e}")))
}

/// Parse a base URL, normalising it to end with `/` so it can be extended.
pub(crate) fn parse_base_url(raw: &str) -> Result<reqwest::Url, SinkError> {
    let mut url = reqwest::Url::parse(raw)
        .map_err(|e| SinkError::Config(format!("invalid base URL {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(SinkError::Config(format!("base URL {raw:?} cannot be a base")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Append path segments (percent-encoded as needed) to `base`.
pub(crate) fn join_segments<'a>(
    base: &reqwest::Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> reqwest::Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
