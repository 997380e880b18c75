//! Point-of-sale domain module.
//!
//! Sale events for the two product lines and their projections into a ledger
//! row and a chat notification. Pure, deterministic logic (no IO, no HTTP, no
//! clients).

pub mod projection;
pub mod sale;

pub use projection::{LedgerRow, SaleProjection};
pub use sale::{JewelrySale, ProductLine, SaleEvent, ToySale};
