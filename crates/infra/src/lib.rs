//! Infrastructure layer: configuration, external sink clients, sale fan-out.

pub mod config;
pub mod sale_processor;
pub mod sinks;

pub use config::{AppConfig, ConfigError};
pub use sale_processor::{LedgerTargets, ProcessError, SaleOutcome, SaleProcessor, SinkKind};
pub use sinks::{LedgerSink, LedgerTarget, NotifierSink, SinkError};
