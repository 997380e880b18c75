//! `salesrelay-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no HTTP, no clients).

pub mod error;
pub mod timestamp;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use timestamp::SaleTimestamp;
pub use value_object::ValueObject;
