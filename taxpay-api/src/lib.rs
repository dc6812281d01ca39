//! HTTP surface for the crypto tax payment flow.
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `POST` | `/verify-tax-id` | format check plus registry lookup |
//! | `POST` | `/process-tax-payment` | payment checks plus settlement |
//! | `POST` | `/calculate-tax` | bracket calculation |
//! | `GET` | `/health` | liveness and active backend |
//!
//! Every path also answers `OPTIONS` with an empty 200, and every response
//! carries the permissive CORS headers.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

pub mod config;
pub mod dto;
pub mod handlers;
pub mod logging;
pub mod state;
pub mod utils;
pub mod walkthrough;

pub use config::{ConfigError, ServiceConfig};
pub use state::AppState;

/// Build the router over `state`.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ]);

    Router::new()
        .route(
            "/verify-tax-id",
            post(handlers::verify_tax_id).options(handlers::preflight),
        )
        .route(
            "/process-tax-payment",
            post(handlers::process_tax_payment).options(handlers::preflight),
        )
        .route(
            "/calculate-tax",
            post(handlers::calculate_tax).options(handlers::preflight),
        )
        .route(
            "/health",
            get(handlers::health).options(handlers::preflight),
        )
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(handlers::ALLOWED_HEADERS),
        ))
        .with_state(state)
}
