//! Card charge data models.
//!
//! This module defines:
//! - `ChargeRequest`: form body accepted by `POST /`
//! - `Charge`: the subset of the Stripe charge object we read
//! - `ProviderErrorDetail`: the `error` object of a Stripe error response

use serde::{Deserialize, Serialize};

/// Request to charge a card.
///
/// # Form Example
///
/// ```text
/// amount=500&currency=usd&source=tok_visa
/// ```
///
/// Absent fields become empty strings and are passed through; the provider
/// rejects them as invalid parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChargeRequest {
    /// Amount in the currency's minor unit (e.g. cents)
    #[serde(default)]
    pub amount: String,

    /// ISO 4217 currency code
    #[serde(default)]
    pub currency: String,

    /// Payment method token (e.g. `tok_visa`)
    #[serde(default)]
    pub source: String,
}

/// Charge object returned by the provider on a 2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    #[serde(default)]
    pub id: String,

    /// `succeeded`, `pending` or `failed`
    pub status: String,

    pub failure_code: Option<String>,
    pub failure_message: Option<String>,
}

impl Charge {
    pub fn succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

/// Error response envelope: `{"error": {...}}`.
#[derive(Debug, Deserialize)]
pub struct ProviderErrorBody {
    pub error: ProviderErrorDetail,
}

/// Error details as reported by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderErrorDetail {
    /// Error category, e.g. `card_error` or `invalid_request_error`
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub code: Option<String>,
    pub message: Option<String>,
    pub decline_code: Option<String>,
}

impl From<&Charge> for ProviderErrorDetail {
    /// A charge that came back in a non-succeeded state reads as a decline.
    fn from(charge: &Charge) -> Self {
        Self {
            kind: Some("card_error".to_string()),
            code: charge.failure_code.clone(),
            message: charge.failure_message.clone(),
            decline_code: None,
        }
    }
}

/// Response body of both endpoints on the happy path: `{"message": "..."}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
