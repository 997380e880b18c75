use axum::Router;

pub mod sales;
pub mod system;

/// Router for the sale webhooks.
pub fn router() -> Router {
    Router::new().merge(sales::router())
}
