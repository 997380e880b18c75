//! Google Sheets ledger client (Sheets API v4, `values.append`).

use async_trait::async_trait;
use serde::Serialize;

use salesrelay_sales::LedgerRow;

use crate::sinks::google_auth::TokenSource;
use crate::sinks::{join_segments, parse_base_url, LedgerSink, LedgerTarget, SinkError};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    major_dimension: &'static str,
    values: [&'a [String]; 1],
}

/// Appends sale rows to spreadsheets.
///
/// One client serves every product line; the destination comes with each call.
#[derive(Debug)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
    tokens: TokenSource,
}

impl SheetsClient {
    pub fn with_base_url(
        http: reqwest::Client,
        tokens: TokenSource,
        base_url: &str,
    ) -> Result<Self, SinkError> {
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
            tokens,
        })
    }

    /// Build a client and obtain a first access token, so unusable
    /// credentials fail here rather than on the first sale.
    pub async fn connect(
        http: reqwest::Client,
        tokens: TokenSource,
        base_url: &str,
    ) -> Result<Self, SinkError> {
        let client = Self::with_base_url(http, tokens, base_url)?;
        client.tokens.token().await?;
        tracing::info!(credentials = client.tokens.kind(), "google credentials verified");
        Ok(client)
    }

    fn append_url(&self, target: &LedgerTarget) -> reqwest::Url {
        let range = format!("{}:append", target.a1_range());
        join_segments(
            &self.base_url,
            [
                "v4",
                "spreadsheets",
                target.spreadsheet_id.as_str(),
                "values",
                range.as_str(),
            ],
        )
    }
}

#[async_trait]
impl LedgerSink for SheetsClient {
    async fn append(&self, target: &LedgerTarget, row: &LedgerRow) -> Result<(), SinkError> {
        let token = self.tokens.token().await?;
        let body = ValueRange {
            major_dimension: "ROWS",
            values: [row.cells()],
        };

        let response = self
            .http
            .post(self.append_url(target))
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body)
            .send()
            .await
            .map_err(SinkError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::api("sheets", status.as_u16(), &body));
        }

        tracing::debug!(
            spreadsheet_id = %target.spreadsheet_id,
            range = %target.a1_range(),
            cells = row.len(),
            "appended ledger row"
        );
        Ok(())
    }
}
