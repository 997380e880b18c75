//! Sale fan-out pipeline (application-level orchestration).
//!
//! One sale in, two side effects out, one outcome back:
//!
//! ```text
//! SaleEvent
//!   ↓
//! 1. Validate (item must be non-empty; nothing is dispatched otherwise)
//!   ↓
//! 2. Project (ledger row + notification text, per product line)
//!   ↓
//! 3. Dispatch ──┬─> task: LedgerSink::append
//!               └─> task: NotifierSink::send
//!   ↓
//! 4. Join both tasks
//!   ↓
//! 5. Aggregate → SaleOutcome::Succeeded | SaleOutcome::PartialFailure
//! ```
//!
//! ## Concurrency
//!
//! The two sink calls run as separate tokio tasks, so their network I/O
//! overlaps on the multi-threaded runtime. Each task owns its inputs; the only
//! per-request coordination is the pair of join handles, read once both tasks
//! are done. A failure (or panic) in one task never cancels the other, and
//! each call is attempted exactly once.
//!
//! A successful append is not rolled back when the notification fails.

use tracing::Instrument;
use uuid::Uuid;

use salesrelay_core::DomainError;
use salesrelay_sales::{ProductLine, SaleEvent};

use crate::sinks::{LedgerSink, LedgerTarget, NotifierSink, SinkError};

/// The two side effects of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Ledger,
    Notifier,
}

impl SinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SinkKind::Ledger => "ledger",
            SinkKind::Notifier => "notifier",
        }
    }
}

impl core::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one sale that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleOutcome {
    /// Both sinks accepted the sale.
    Succeeded,
    /// At least one sink failed. `failed` is ordered ledger first, regardless
    /// of which call finished first.
    PartialFailure { failed: Vec<SinkKind> },
}

impl SaleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SaleOutcome::Succeeded)
    }

    pub fn failed(&self) -> &[SinkKind] {
        match self {
            SaleOutcome::Succeeded => &[],
            SaleOutcome::PartialFailure { failed } => failed,
        }
    }

    fn from_results(ledger: bool, notifier: bool) -> Self {
        let failed: Vec<SinkKind> = [(SinkKind::Ledger, ledger), (SinkKind::Notifier, notifier)]
            .into_iter()
            .filter_map(|(kind, ok)| (!ok).then_some(kind))
            .collect();

        if failed.is_empty() {
            SaleOutcome::Succeeded
        } else {
            SaleOutcome::PartialFailure { failed }
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The sale was rejected before any sink was called.
    #[error(transparent)]
    Validation(#[from] DomainError),
}

/// Ledger destination of each product line, fixed at startup.
#[derive(Debug, Clone)]
pub struct LedgerTargets {
    pub toy: LedgerTarget,
    pub jewelry: LedgerTarget,
}

impl LedgerTargets {
    pub fn for_line(&self, line: ProductLine) -> &LedgerTarget {
        match line {
            ProductLine::Toy => &self.toy,
            ProductLine::Jewelry => &self.jewelry,
        }
    }
}

/// Validates sales and fans them out to the ledger and the notifier.
///
/// Generic over the sink implementations so tests can run the real pipeline
/// against in-process fakes. Sinks are cloned into each dispatch task, so they
/// should be cheap handles (typically `Arc<...>`).
#[derive(Debug, Clone)]
pub struct SaleProcessor<L, N> {
    ledger: L,
    notifier: N,
    targets: LedgerTargets,
}

impl<L, N> SaleProcessor<L, N> {
    pub fn new(ledger: L, notifier: N, targets: LedgerTargets) -> Self {
        Self {
            ledger,
            notifier,
            targets,
        }
    }
}

impl<L, N> SaleProcessor<L, N>
where
    L: LedgerSink + Clone + 'static,
    N: NotifierSink + Clone + 'static,
{
    /// Process one sale.
    ///
    /// Returns `Err` only for sales rejected before dispatch. Sink failures are
    /// reported through [`SaleOutcome::PartialFailure`], after both calls have
    /// finished.
    pub async fn process(&self, sale: SaleEvent) -> Result<SaleOutcome, ProcessError> {
        let line = sale.product_line();

        if let Err(e) = sale.validate() {
            tracing::info!(line = %line, error = %e, "rejected sale");
            return Err(e.into());
        }

        let sale_id = Uuid::now_v7();
        let span = tracing::info_span!("sale", %sale_id, line = %line);
        self.dispatch(sale, span.clone()).instrument(span).await
    }

    async fn dispatch(
        &self,
        sale: SaleEvent,
        span: tracing::Span,
    ) -> Result<SaleOutcome, ProcessError> {
        let line = sale.product_line();
        let target = self.targets.for_line(line).clone();
        let row = sale.ledger_row();
        let text = sale.notification_text();
        debug_assert_eq!(row.len(), line.column_count());

        let ledger = self.ledger.clone();
        let ledger_task = tokio::spawn(
            async move { ledger.append(&target, &row).await }.instrument(span.clone()),
        );

        let notifier = self.notifier.clone();
        let notifier_task =
            tokio::spawn(async move { notifier.send(&text).await }.instrument(span));

        let (ledger_result, notifier_result) = tokio::join!(ledger_task, notifier_task);

        let ledger_ok = settle(SinkKind::Ledger, ledger_result);
        let notifier_ok = settle(SinkKind::Notifier, notifier_result);
        let outcome = SaleOutcome::from_results(ledger_ok, notifier_ok);

        if outcome.is_success() {
            tracing::info!(
                item = %sale.item(),
                material = sale.material().unwrap_or_default(),
                "processed sale"
            );
        } else {
            tracing::warn!(
                errors = outcome.failed().len(),
                failed = ?outcome.failed(),
                "processed sale with errors"
            );
        }

        Ok(outcome)
    }
}

/// Log a finished dispatch task and report whether its sink succeeded.
fn settle(kind: SinkKind, result: Result<Result<(), SinkError>, tokio::task::JoinError>) -> bool {
    match result {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(sink = %kind, timeout = e.is_timeout(), error = %e, "sink call failed");
            false
        }
        Err(e) => {
            tracing::error!(sink = %kind, error = %e, "sink task did not complete");
            false
        }
    }
}
