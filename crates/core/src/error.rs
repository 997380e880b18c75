//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only deterministic failures of caller input live here. Sink and transport
/// failures belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl DomainError {
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField(field)
    }
}
