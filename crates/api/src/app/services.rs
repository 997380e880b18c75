use std::sync::Arc;

use salesrelay_infra::sinks::google_auth::{Credentials, TokenSource};
use salesrelay_infra::sinks::sheets::{SheetsClient, SHEETS_API_BASE};
use salesrelay_infra::sinks::telegram::{TelegramClient, TELEGRAM_API_BASE};
use salesrelay_infra::sinks::http_client;
use salesrelay_infra::{
    AppConfig, LedgerSink, LedgerTargets, NotifierSink, SaleProcessor, SinkError,
};

pub type SharedLedger = Arc<dyn LedgerSink>;
pub type SharedNotifier = Arc<dyn NotifierSink>;

/// The processor as wired into the HTTP layer: sinks are trait objects so the
/// same router serves production clients and test fakes.
pub type AppSaleProcessor = SaleProcessor<SharedLedger, SharedNotifier>;

/// Long-lived state shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub processor: AppSaleProcessor,
}

impl AppServices {
    pub fn new(ledger: SharedLedger, notifier: SharedNotifier, targets: LedgerTargets) -> Self {
        Self {
            processor: SaleProcessor::new(ledger, notifier, targets),
        }
    }

    /// Build the production sink clients.
    ///
    /// Resolves Google credentials, obtains a first access token and verifies
    /// the bot token; any failure here is fatal to startup.
    pub async fn from_config(config: &AppConfig) -> Result<Self, SinkError> {
        let credentials = Credentials::discover(config.credentials_file.as_deref())?;
        Self::connect(config, credentials, SHEETS_API_BASE, TELEGRAM_API_BASE).await
    }

    pub async fn connect(
        config: &AppConfig,
        credentials: Credentials,
        sheets_base: &str,
        telegram_base: &str,
    ) -> Result<Self, SinkError> {
        let http = http_client(config.sink_timeout)?;

        let tokens = TokenSource::new(http.clone(), credentials)?;
        let sheets = SheetsClient::connect(http.clone(), tokens, sheets_base).await?;

        let telegram = TelegramClient::connect(
            http,
            config.telegram.bot_token.clone(),
            config.telegram.chat_id.clone(),
            telegram_base,
        )
        .await?;

        let targets = LedgerTargets {
            toy: config.toy_ledger.clone(),
            jewelry: config.jewelry_ledger.clone(),
        };

        Ok(Self::new(Arc::new(sheets), Arc::new(telegram), targets))
    }
}
