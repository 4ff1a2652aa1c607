//! M-Pesa STK push handler.
//!
//! - POST /mpesa-payment/ - prompt a subscriber to pay from their handset

use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{
    error::MpesaError,
    models::mpesa::MobileMoneyRequest,
    services::mpesa,
    state::AppState,
};

/// Body parsed as form data when sent form-encoded, as JSON otherwise.
///
/// JSON is parsed regardless of the declared content type; parse failures
/// become [`MpesaError::Processing`].
#[derive(Debug)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = MpesaError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| MpesaError::Processing(e.body_text()))?;
            return Ok(Self(value));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| MpesaError::Processing(e.body_text()))?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| MpesaError::Processing(e.to_string()))?;
        Ok(Self(value))
    }
}

/// Send an STK push.
///
/// # Request Body (JSON or form-encoded)
///
/// ```json
/// {
///   "phone_number": "254712345678",
///   "amount": 100,
///   "transaction_reference": "INV-0042"
/// }
/// ```
///
/// # Process
///
/// 1. Validate phone number and amount (400 if missing, no outbound call)
/// 2. Obtain an access token
/// 3. Build the payload with a fresh timestamp and password
/// 4. POST it to the STK push endpoint
///
/// # Response (200)
///
/// ```json
/// {
///   "message": "Payment request sent successfully.",
///   "data": { "ResponseCode": "0", "CheckoutRequestID": "ws_CO_..." }
/// }
/// ```
pub async fn create_mpesa_payment(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<MobileMoneyRequest>,
) -> Result<Json<Value>, MpesaError> {
    let details = request.validate()?;

    let token = state.mpesa.access_token().await?;

    let timestamp = mpesa::timestamp(&chrono::Local::now());
    let payload = state.mpesa.stk_push_payload(details, timestamp);

    let data = state.mpesa.stk_push(&token, &payload).await?;
    tracing::info!(reference = %payload.account_reference, "STK push accepted");

    Ok(Json(json!({
        "message": "Payment request sent successfully.",
        "data": data,
    })))
}
