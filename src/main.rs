//! Payments Relay - Main Application Entry Point
//!
//! This is an HTTP server that forwards payment requests to third-party
//! providers and translates their answers into a simple JSON body.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Card payments**: Stripe charges API via reqwest
//! - **Mobile money**: M-Pesa Daraja STK push via reqwest
//! - **Format**: form or JSON requests, JSON responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build the shared HTTP client and provider clients
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

use payments_relay_web_server::{app, config::Config, state::AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    if config.static_access_token().is_some() {
        tracing::info!("Using pre-provisioned M-Pesa access token");
    }

    let state = AppState::new(&config)?;
    tracing::info!(policy = ?config.status_policy(), "Provider clients ready");

    let router = app(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, router).await?;

    Ok(())
}
