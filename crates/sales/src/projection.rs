//! Projections of a sale into the shapes the two sinks consume.
//!
//! Every product line provides exactly two pure projections:
//!
//! - a **ledger row**: ordered cell values appended to the spreadsheet
//! - a **notification text**: the multi-line message posted to the chat
//!
//! Both are compatibility surfaces. Column order and message labels are read by
//! people and by existing spreadsheet formulas, so they must not drift.

use serde::{Deserialize, Serialize};

use salesrelay_core::ValueObject;

use crate::sale::ProductLine;

/// One spreadsheet row, cells in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerRow(Vec<String>);

impl ValueObject for LedgerRow {}

impl LedgerRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self(cells)
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for LedgerRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Variant-specific shaping of a sale.
///
/// Implemented once per product line; everything downstream (validation,
/// fan-out, aggregation) is shared.
pub trait SaleProjection {
    /// Product line this variant belongs to.
    const LINE: ProductLine;

    /// The name of the thing sold. Must be non-empty before dispatch.
    fn item(&self) -> &str;

    /// Row appended to the product line's ledger sheet.
    ///
    /// Its length always equals `Self::LINE.column_count()`.
    fn ledger_row(&self) -> LedgerRow;

    /// Message posted to the notification chat.
    fn notification_text(&self) -> String;
}
