//! Process-wide logging setup shared by the binaries.

/// Install the JSON log subscriber.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filters, JSON layout).
pub mod tracing;
