use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use crate::app::dto::{self, JewelrySaleRequest, SaleRequest, ToySaleRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// Both paths are served with and without the trailing slash.
pub fn router() -> Router {
    Router::new()
        .route("/3d-toy-sale/", post(record_sale::<ToySaleRequest>))
        .route("/3d-toy-sale", post(record_sale::<ToySaleRequest>))
        .route("/jewelry-sale/", post(record_sale::<JewelrySaleRequest>))
        .route("/jewelry-sale", post(record_sale::<JewelrySaleRequest>))
}

/// Decode, process and answer one sale webhook.
///
/// The body is decoded from raw bytes; the `Content-Type` header is not checked.
pub async fn record_sale<R: SaleRequest>(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> axum::response::Response {
    let request = match dto::decode::<R>(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(line = %R::LINE, error = ?e, "invalid request body");
            return e.into_response();
        }
    };

    match services.processor.process(request.into_event(Utc::now())).await {
        Ok(outcome) if outcome.is_success() => {
            (StatusCode::OK, Json(dto::SaleRecorded::default())).into_response()
        }
        Ok(_) => ApiError::PartialFailure.into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
