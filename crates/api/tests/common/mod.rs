//! In-process sinks and a server harness shared by the API tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;

use salesrelay_api::app::{self, services::AppServices};
use salesrelay_infra::config::DEFAULT_SINK_TIMEOUT_SECS;
use salesrelay_infra::{LedgerSink, LedgerTarget, LedgerTargets, NotifierSink, SinkError};
use salesrelay_sales::LedgerRow;

fn unavailable(service: &'static str) -> SinkError {
    SinkError::Api {
        service,
        status: 503,
        message: "unavailable".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct RecordingLedger {
    pub fail: bool,
    pub delay: Option<Duration>,
    pub rows: Mutex<Vec<(LedgerTarget, LedgerRow)>>,
}

impl RecordingLedger {
    pub fn rows(&self) -> Vec<(LedgerTarget, LedgerRow)> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerSink for RecordingLedger {
    async fn append(&self, target: &LedgerTarget, row: &LedgerRow) -> Result<(), SinkError> {
        self.rows
            .lock()
            .unwrap()
            .push((target.clone(), row.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(unavailable("fake-ledger"));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifierSink for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), SinkError> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(unavailable("fake-notifier"));
        }
        Ok(())
    }
}

pub fn targets() -> LedgerTargets {
    LedgerTargets {
        toy: LedgerTarget::new("toy-sheet", "Sheet1", "A:E"),
        jewelry: LedgerTarget::new("jewelry-sheet", "Sheet1", "A:D"),
    }
}

pub struct Harness {
    pub ledger: Arc<RecordingLedger>,
    pub notifier: Arc<RecordingNotifier>,
    pub app: Router,
}

impl Harness {
    pub fn new(ledger: RecordingLedger, notifier: RecordingNotifier) -> Self {
        let ledger = Arc::new(ledger);
        let notifier = Arc::new(notifier);
        let services = AppServices::new(ledger.clone(), notifier.clone(), targets());
        let app = app::build_app(
            Arc::new(services),
            Duration::from_secs(DEFAULT_SINK_TIMEOUT_SECS),
        );
        Self {
            ledger,
            notifier,
            app,
        }
    }

    pub fn healthy() -> Self {
        Self::new(RecordingLedger::default(), RecordingNotifier::default())
    }
}

/// The router served on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
