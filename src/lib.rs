//! Payments relay: forwards card charges to Stripe and STK push requests to
//! M-Pesa, answering clients with a simplified JSON body.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the HTTP router.
///
/// Only the listed methods are routed; anything else on these paths gets
/// axum's 405 Method Not Allowed.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::charge::create_charge))
        .route("/mpesa-payment/", post(handlers::mpesa::create_mpesa_payment))
        .route("/health", get(handlers::health::health_check))
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share provider clients with all handlers via State extraction
        .with_state(state)
}
