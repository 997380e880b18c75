//! Configuration loading and representation.
//!
//! Everything comes from the process environment. Empty values count as unset,
//! so `FOO=` in a compose file behaves like leaving `FOO` out.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use salesrelay_sales::ProductLine;

use crate::sinks::telegram::ChatId;
use crate::sinks::LedgerTarget;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";
pub const DEFAULT_SINK_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Telegram destination and credentials.
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: ChatId,
}

impl core::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub toy_ledger: LedgerTarget,
    pub jewelry_ledger: LedgerTarget,
    /// Explicit Google credentials file; `None` means ambient credentials.
    pub credentials_file: Option<PathBuf>,
    pub telegram: TelegramConfig,
    /// Per-call timeout enforced independently by each sink client.
    pub sink_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    ///
    /// All missing required variables are reported together.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            let value = get(key);
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let toy_spreadsheet = required("TOY_SPREADSHEET_ID");
        let jewelry_spreadsheet = required("JEWELRY_SPREADSHEET_ID");
        let bot_token = required("TELEGRAM_BOT_TOKEN");
        let chat_id = required("TELEGRAM_CHAT_ID");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let chat_id = chat_id.parse::<ChatId>().map_err(|reason| ConfigError::Invalid {
            var: "TELEGRAM_CHAT_ID",
            reason,
        })?;

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let sink_timeout_secs = match get("SINK_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        var: "SINK_TIMEOUT_SECS",
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "SINK_TIMEOUT_SECS",
                        reason: e.to_string(),
                    });
                }
            },
            None => DEFAULT_SINK_TIMEOUT_SECS,
        };

        let sheet_name =
            |key: &str| get(key).unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());

        Ok(Self {
            port,
            toy_ledger: LedgerTarget::new(
                toy_spreadsheet,
                sheet_name("TOY_SHEET_NAME"),
                ProductLine::Toy.column_range(),
            ),
            jewelry_ledger: LedgerTarget::new(
                jewelry_spreadsheet,
                sheet_name("JEWELRY_SHEET_NAME"),
                ProductLine::Jewelry.column_range(),
            ),
            credentials_file: get("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            telegram: TelegramConfig { bot_token, chat_id },
            sink_timeout: Duration::from_secs(sink_timeout_secs),
        })
    }
}
