//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: sink clients and the sale processor behind them
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and body decoding
//! - `errors.rs`: error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer, http::StatusCode, routing::get, BoxError, Extension, Router,
};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Slack added on top of the slowest sink path before the router gives up.
pub const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Upper bound on handling one request.
///
/// The ledger path makes two sequential calls (token exchange, then append),
/// each bounded by `sink_timeout`. The router must outlast both so a sink
/// timeout reaches the caller as a partial failure instead of a 408.
pub fn request_timeout(sink_timeout: Duration) -> Duration {
    sink_timeout * 2 + REQUEST_TIMEOUT_MARGIN
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<services::AppServices>, sink_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout(sink_timeout)),
        )
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request timed out");
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    }
}
