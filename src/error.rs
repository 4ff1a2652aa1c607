//! Error types and HTTP error response handling.
//!
//! This module defines the failures of both payment flows and how they are
//! converted into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::config::StatusPolicy;
use crate::models::charge::ProviderErrorDetail;

/// Failure of a card charge, as reported by the charge provider.
///
/// This is a closed set: the handler matches every variant when building
/// the client response.
#[derive(Debug, thiserror::Error)]
pub enum ChargeError {
    /// The card was declined, or the charge finished in a non-succeeded state.
    #[error("Card declined ({status}): {}", .detail.message.as_deref().unwrap_or("no message"))]
    CardDeclined {
        status: StatusCode,
        detail: ProviderErrorDetail,
    },

    /// Too many requests hit the provider API too quickly.
    #[error("Rate limited by charge provider")]
    RateLimited(ProviderErrorDetail),

    /// Invalid parameters were supplied to the provider API.
    #[error("Invalid request to charge provider")]
    InvalidRequest(ProviderErrorDetail),

    /// The secret key was rejected.
    #[error("Authentication with charge provider failed")]
    Authentication(ProviderErrorDetail),

    /// The provider could not be reached, or the response could not be read.
    #[error("Network error talking to charge provider: {0}")]
    Network(#[from] reqwest::Error),

    /// Any other error status from the provider (403, 5xx, ...).
    #[error("Charge provider error ({status})")]
    Provider {
        status: StatusCode,
        detail: ProviderErrorDetail,
    },

    /// Something unrelated to the provider's error taxonomy went wrong.
    #[error("Unexpected charge failure: {0}")]
    Unexpected(String),
}

impl ChargeError {
    /// Message shown to the client for this failure.
    pub fn client_message(&self) -> String {
        match self {
            ChargeError::CardDeclined { detail, .. } => detail
                .message
                .clone()
                .unwrap_or_else(|| "Your card was declined.".to_string()),
            ChargeError::RateLimited(_) => "Too many requests to the API.".to_string(),
            ChargeError::InvalidRequest(_) => "Invalid parameters.".to_string(),
            ChargeError::Authentication(_) => "Authentication failed.".to_string(),
            ChargeError::Network(_) => "Network communication failed, try again.".to_string(),
            ChargeError::Provider { .. } => "Provider error!".to_string(),
            ChargeError::Unexpected(_) => "Unable to process payment, try again.".to_string(),
        }
    }

    /// HTTP status for this failure under the given policy.
    ///
    /// Declines always carry the provider's status. Under
    /// [`StatusPolicy::Observed`] every other failure answers 200.
    pub fn status_code(&self, policy: StatusPolicy) -> StatusCode {
        if let ChargeError::CardDeclined { status, .. } = self {
            return *status;
        }

        match policy {
            StatusPolicy::Observed => StatusCode::OK,
            StatusPolicy::Strict => match self {
                ChargeError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                ChargeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                ChargeError::Authentication(_) => StatusCode::UNAUTHORIZED,
                ChargeError::Network(_) | ChargeError::Provider { .. } => StatusCode::BAD_GATEWAY,
                ChargeError::CardDeclined { .. } | ChargeError::Unexpected(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Build the `{"message": ...}` response for this failure.
    pub fn into_response_with(self, policy: StatusPolicy) -> Response {
        let status = self.status_code(policy);
        (status, Json(json!({ "message": self.client_message() }))).into_response()
    }
}

/// Failure of an M-Pesa STK push request.
#[derive(Debug, thiserror::Error)]
pub enum MpesaError {
    /// Phone number or amount missing or empty.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Phone number and amount are required.")]
    MissingFields,

    /// The OAuth endpoint answered with a non-200 status.
    ///
    /// The provider's status is forwarded unchanged.
    #[error("Failed to generate M-Pesa access token.")]
    TokenRejected { status: StatusCode, body: Value },

    /// The OAuth endpoint answered 200 without an `access_token`.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("No access token received from M-Pesa.")]
    NoAccessToken,

    /// The STK push endpoint answered with a non-200 status.
    #[error("STK push rejected with status {status}")]
    PushRejected { status: StatusCode, body: Value },

    /// Transport failure on either outbound call.
    ///
    /// Returns HTTP 500 with the error text.
    #[error("Network or request error occurred.")]
    Network(#[from] reqwest::Error),

    /// Anything else, including a request body that cannot be parsed.
    ///
    /// Returns HTTP 500 with the error text.
    #[error("Error processing M-Pesa payment.")]
    Processing(String),
}

/// Convert MpesaError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "message": "Human-readable error message",
///   "error": "provider body or error text, when there is one"
/// }
/// ```
impl IntoResponse for MpesaError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            MpesaError::MissingFields => {
                (StatusCode::BAD_REQUEST, json!({ "message": self.to_string() }))
            }
            MpesaError::NoAccessToken => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": self.to_string() }),
            ),
            MpesaError::TokenRejected { status, ref body } => (
                status,
                json!({ "message": self.to_string(), "error": body }),
            ),
            MpesaError::PushRejected { status, body } => {
                tracing::warn!("STK push rejected with status {}: {}", status, body);
                let message = if is_blank(&body) {
                    Value::String("Payment failed, please try again.".to_string())
                } else {
                    body.clone()
                };
                (status, json!({ "message": message, "error": body }))
            }
            MpesaError::Network(ref e) => {
                tracing::error!("M-Pesa request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": self.to_string(), "error": e.to_string() }),
                )
            }
            MpesaError::Processing(ref msg) => {
                tracing::error!("M-Pesa payment processing failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": self.to_string(), "error": msg }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn is_blank(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
