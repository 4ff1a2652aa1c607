//! Stripe charge client.
//!
//! Creates charges through `POST /v1/charges` and sorts every failure into
//! one [`ChargeError`] variant, so handlers never see raw HTTP responses.

use async_trait::async_trait;
use axum::http::StatusCode;
use url::Url;

use crate::config::Config;
use crate::error::ChargeError;
use crate::models::charge::{Charge, ChargeRequest, ProviderErrorBody, ProviderErrorDetail};

/// Anything that can create a card charge.
#[async_trait]
pub trait ChargeProvider: Send + Sync {
    /// Create a charge and return it if it succeeded.
    ///
    /// # Errors
    ///
    /// A charge in any state other than `succeeded` comes back as
    /// [`ChargeError::CardDeclined`]; provider and transport failures map to
    /// the remaining variants.
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, ChargeError>;
}

/// Charge provider backed by the Stripe REST API.
#[derive(Debug, Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    charges_url: Url,
}

impl StripeClient {
    pub fn new(http: reqwest::Client, config: &Config) -> Result<Self, url::ParseError> {
        Ok(Self {
            http,
            secret_key: config.stripe_secret_key.clone(),
            charges_url: config.stripe_api_base.join("v1/charges")?,
        })
    }
}

#[async_trait]
impl ChargeProvider for StripeClient {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, ChargeError> {
        let response = self
            .http
            .post(self.charges_url.clone())
            .bearer_auth(&self.secret_key)
            .form(&[
                ("amount", request.amount.as_str()),
                ("currency", request.currency.as_str()),
                ("source", request.source.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        let charge: Charge = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Unreadable charge response: {}", e);
            ChargeError::Provider {
                status,
                detail: ProviderErrorDetail {
                    message: Some(format!("Invalid response body from API: {}", e)),
                    ..ProviderErrorDetail::default()
                },
            }
        })?;

        if !charge.succeeded() {
            return Err(ChargeError::CardDeclined {
                status: StatusCode::PAYMENT_REQUIRED,
                detail: ProviderErrorDetail::from(&charge),
            });
        }

        tracing::info!(charge_id = %charge.id, "Charge succeeded");
        Ok(charge)
    }
}

/// Map a non-2xx Stripe response to an error kind.
///
/// The HTTP status decides; the body only refines 400/404.
///
/// # Mapping
///
/// - 400, 404 with code `rate_limit` → `RateLimited`
/// - 400, 404 → `InvalidRequest`
/// - 401 → `Authentication`
/// - 402 → `CardDeclined`
/// - 429 → `RateLimited`
/// - anything else → `Provider`
pub fn classify_error(status: StatusCode, body: &str) -> ChargeError {
    let detail = serde_json::from_str::<ProviderErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_default();

    match status {
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
            if detail.code.as_deref() == Some("rate_limit") {
                ChargeError::RateLimited(detail)
            } else {
                ChargeError::InvalidRequest(detail)
            }
        }
        StatusCode::UNAUTHORIZED => ChargeError::Authentication(detail),
        StatusCode::PAYMENT_REQUIRED => ChargeError::CardDeclined { status, detail },
        StatusCode::TOO_MANY_REQUESTS => ChargeError::RateLimited(detail),
        _ => ChargeError::Provider { status, detail },
    }
}
