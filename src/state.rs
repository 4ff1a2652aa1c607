//! Shared application state handed to every handler.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, StatusPolicy};
use crate::services::mpesa::MpesaClient;
use crate::services::stripe::{ChargeProvider, StripeClient};

/// Error building the state from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid Stripe API base URL: {0}")]
    StripeUrl(#[from] url::ParseError),
}

/// Provider clients built once at startup.
///
/// Cloning is cheap; every field is shared.
#[derive(Clone)]
pub struct AppState {
    pub charges: Arc<dyn ChargeProvider>,
    pub mpesa: Arc<MpesaClient>,
    pub status_policy: StatusPolicy,
}

impl AppState {
    /// Build the provider clients from configuration.
    ///
    /// Both clients share one `reqwest::Client` with the configured timeout.
    pub fn new(config: &Config) -> Result<Self, StateError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            charges: Arc::new(StripeClient::new(http.clone(), config)?),
            mpesa: Arc::new(MpesaClient::new(http, config)),
            status_policy: config.status_policy(),
        })
    }

    /// Replace the charge provider, e.g. with an in-process fake.
    pub fn with_charge_provider(mut self, provider: Arc<dyn ChargeProvider>) -> Self {
        self.charges = provider;
        self
    }
}
