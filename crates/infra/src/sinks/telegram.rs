//! Telegram Bot API notifier.
//!
//! Sends every message to one fixed chat with classic Markdown parsing enabled.

use std::str::FromStr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::sinks::{join_segments, parse_base_url, NotifierSink, SinkError};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Destination chat: a numeric id or a public `@channelusername`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Username(String),
}

impl FromStr for ChatId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i64>() {
            return Ok(ChatId::Id(id));
        }
        match s.strip_prefix('@') {
            Some(name) if !name.is_empty() => Ok(ChatId::Username(s.to_string())),
            _ => Err(format!(
                "expected a numeric chat id or @channelusername, got {s:?}"
            )),
        }
    }
}

impl core::fmt::Display for ChatId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChatId::Id(id) => write!(f, "{id}"),
            ChatId::Username(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a ChatId,
    text: &'a str,
    parse_mode: &'static str,
}

/// Bot API envelope: `{"ok": true, "result": ...}` or `{"ok": false, "description": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

/// Subset of the `User` object returned by `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

pub struct TelegramClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
    token: String,
    chat_id: ChatId,
}

impl core::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url.as_str())
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    pub fn new(
        http: reqwest::Client,
        token: impl Into<String>,
        chat_id: ChatId,
    ) -> Result<Self, SinkError> {
        Self::with_base_url(http, token, chat_id, TELEGRAM_API_BASE)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        token: impl Into<String>,
        chat_id: ChatId,
        base_url: &str,
    ) -> Result<Self, SinkError> {
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
            token: token.into(),
            chat_id,
        })
    }

    /// Build a client and verify the token with `getMe`.
    pub async fn connect(
        http: reqwest::Client,
        token: impl Into<String>,
        chat_id: ChatId,
        base_url: &str,
    ) -> Result<Self, SinkError> {
        let client = Self::with_base_url(http, token, chat_id, base_url)?;
        let me = client.get_me().await?;
        tracing::info!(
            bot_id = me.id,
            bot = me.username.as_deref().unwrap_or(""),
            chat_id = %client.chat_id,
            "telegram bot authorized"
        );
        Ok(client)
    }


    pub async fn get_me(&self) -> Result<BotUser, SinkError> {
        let response = self
            .http
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(SinkError::transport)?;
        read_envelope::<BotUser>(response)
            .await?
            .ok_or_else(|| SinkError::Api {
                service: "telegram",
                status: 200,
                message: "getMe returned no result".to_string(),
            })
    }

    fn method_url(&self, method: &str) -> reqwest::Url {
        let bot = format!("bot{}", self.token);
        join_segments(&self.base_url, [bot.as_str(), method])
    }
}

async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Option<T>, SinkError> {
    let status = response.status();
    let body = response.text().await.map_err(SinkError::transport)?;

    if !status.is_success() {
        return Err(SinkError::api("telegram", status.as_u16(), &body));
    }

    let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| SinkError::Api {
        service: "telegram",
        status: status.as_u16(),
        message: format!("malformed response: {e}"),
    })?;

    if !envelope.ok {
        return Err(SinkError::Api {
            service: "telegram",
            status: status.as_u16(),
            message: envelope
                .description
                .unwrap_or_else(|| "request was not ok".to_string()),
        });
    }

    Ok(envelope.result)
}

#[async_trait]
impl NotifierSink for TelegramClient {
    async fn send(&self, text: &str) -> Result<(), SinkError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .send()
            .await
            .map_err(SinkError::transport)?;

        read_envelope::<serde_json::Value>(response).await?;
        tracing::debug!(chat_id = %self.chat_id, "sent notification");
        Ok(())
    }
}
