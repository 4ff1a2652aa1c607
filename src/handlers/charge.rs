//! Card charge handler.
//!
//! - POST / - charge a card through Stripe

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    error::ChargeError,
    models::charge::{ChargeRequest, MessageResponse},
    state::AppState,
};

pub const SUCCESS_MESSAGE: &str = "Your transaction has been successful.";

/// Charge a card.
///
/// # Request Body (form-encoded)
///
/// ```text
/// amount=500&currency=usd&source=tok_visa
/// ```
///
/// # Response (200)
///
/// ```json
/// { "message": "Your transaction has been successful." }
/// ```
///
/// Failures answer `{"message": ...}` with the status chosen by
/// [`ChargeError::status_code`].
pub async fn create_charge(
    State(state): State<AppState>,
    form: Result<Form<ChargeRequest>, FormRejection>,
) -> Response {
    let result = match form {
        Ok(Form(request)) => state.charges.create_charge(&request).await,
        // No form body at all: every field is empty and the provider decides.
        Err(FormRejection::InvalidFormContentType(_)) => {
            state.charges.create_charge(&ChargeRequest::default()).await
        }
        Err(rejection) => Err(ChargeError::Unexpected(rejection.body_text())),
    };

    match result {
        Ok(_) => (StatusCode::OK, Json(MessageResponse::new(SUCCESS_MESSAGE))).into_response(),
        Err(error) => {
            log_failure(&error);
            error.into_response_with(state.status_policy)
        }
    }
}

fn log_failure(error: &ChargeError) {
    match error {
        ChargeError::CardDeclined { status, detail } => {
            tracing::warn!(
                status = %status,
                kind = detail.kind.as_deref().unwrap_or_default(),
                code = detail.code.as_deref().unwrap_or_default(),
                provider_message = detail.message.as_deref().unwrap_or_default(),
                "Card declined"
            );
        }
        ChargeError::Network(e) => tracing::error!("Charge provider unreachable: {}", e),
        ChargeError::Unexpected(msg) => tracing::error!("Charge failed: {}", msg),
        other => tracing::warn!("Charge failed: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::charge::{Charge, ProviderErrorDetail};
    use crate::services::stripe::ChargeProvider;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use std::sync::{Arc, Mutex};

    /// Fake provider returning a canned outcome and recording the request.
    struct Canned {
        outcome: Mutex<Option<Result<Charge, ChargeError>>>,
        seen: Mutex<Option<ChargeRequest>>,
    }

    #[async_trait]
    impl ChargeProvider for Canned {
        async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, ChargeError> {
            *self.seen.lock().unwrap() = Some(request.clone());
            self.outcome.lock().unwrap().take().expect("called once")
        }
    }

    fn state(outcome: Result<Charge, ChargeError>, strict: bool) -> (AppState, Arc<Canned>) {
        let config: Config = envy::from_iter([
            ("STRIPE_SECRET_KEY", "sk_test"),
            ("MPESA_CONSUMER_KEY", "ck"),
            ("MPESA_CONSUMER_SECRET", "cs"),
            ("SHORTCODE", "174379"),
            ("MPESA_PASSKEY", "pk"),
            ("MPESA_AUTH_URL", "http://127.0.0.1:9/auth"),
            ("MPESA_STK_PUSH_URL", "http://127.0.0.1:9/push"),
            ("MPESA_CALLBACK_URL", "http://127.0.0.1:9/cb"),
            ("STRICT_STATUS_CODES", if strict { "true" } else { "false" }),
        ]
        .map(|(k, v)| (k.to_string(), v.to_string())))
        .unwrap();

        let provider = Arc::new(Canned {
            outcome: Mutex::new(Some(outcome)),
            seen: Mutex::new(None),
        });
        let state = AppState::new(&config)
            .unwrap()
            .with_charge_provider(provider.clone());
        (state, provider)
    }

    fn request() -> ChargeRequest {
        ChargeRequest {
            amount: "500".to_string(),
            currency: "usd".to_string(),
            source: "tok_visa".to_string(),
        }
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn succeeded_charge_returns_success_message() {
        let (state, provider) = state(
            Ok(Charge {
                id: "ch_1".to_string(),
                status: "succeeded".to_string(),
                failure_code: None,
                failure_message: None,
            }),
            false,
        );

        let response = create_charge(State(state), Ok(Form(request()))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], SUCCESS_MESSAGE);

        let seen = provider.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.amount, "500");
        assert_eq!(seen.currency, "usd");
        assert_eq!(seen.source, "tok_visa");
    }

    #[tokio::test]
    async fn decline_forwards_provider_status_and_message() {
        let (state, _) = state(
            Err(ChargeError::CardDeclined {
                status: StatusCode::PAYMENT_REQUIRED,
                detail: ProviderErrorDetail {
                    kind: Some("card_error".to_string()),
                    code: Some("card_declined".to_string()),
                    message: Some("Your card was declined.".to_string()),
                    decline_code: Some("generic_decline".to_string()),
                },
            }),
            false,
        );

        let response = create_charge(State(state), Ok(Form(request()))).await;

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(json_body(response).await["message"], "Your card was declined.");
    }

    #[tokio::test]
    async fn authentication_failure_answers_200_by_default() {
        let (state, _) = state(Err(ChargeError::Authentication(ProviderErrorDetail::default())), false);

        let response = create_charge(State(state), Ok(Form(request()))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], "Authentication failed.");
    }

    #[tokio::test]
    async fn strict_policy_changes_status_not_message() {
        let (state, _) = state(Err(ChargeError::RateLimited(ProviderErrorDetail::default())), true);

        let response = create_charge(State(state), Ok(Form(request()))).await;

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json_body(response).await["message"], "Too many requests to the API.");
    }
}
