//! M-Pesa STK push data models.
//!
//! This module defines:
//! - `MobileMoneyRequest`: body accepted by `POST /mpesa-payment/`
//! - `PaymentDetails`: a validated request
//! - `StkPushPayload`: the body posted to the Daraja STK push endpoint

use serde::{Deserialize, Serialize};

use crate::error::MpesaError;

pub const TRANSACTION_TYPE: &str = "CustomerPayBillOnline";
pub const TRANSACTION_DESC: &str = "Payment for goods/services";
pub const DEFAULT_REFERENCE: &str = "DefaultReference";

/// A JSON scalar forwarded to the provider exactly as the client sent it.
///
/// Clients send amounts and phone numbers both as numbers and as strings;
/// form bodies always produce strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    /// Empty strings and numeric zero count as "not provided".
    pub fn is_empty(&self) -> bool {
        match self {
            Scalar::Number(n) => n.as_f64() == Some(0.0),
            Scalar::Text(s) => s.is_empty(),
        }
    }
}

/// Request to push a payment prompt to a subscriber's handset.
///
/// # JSON Example
///
/// ```json
/// {
///   "phone_number": "254712345678",
///   "amount": 100,
///   "transaction_reference": "INV-0042"
/// }
/// ```
///
/// The camelCase spellings `phoneNumber` and `transactionReference` are
/// accepted as well.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MobileMoneyRequest {
    #[serde(default, alias = "phoneNumber")]
    pub phone_number: Option<Scalar>,

    #[serde(default)]
    pub amount: Option<Scalar>,

    #[serde(default, alias = "transactionReference")]
    pub transaction_reference: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDetails {
    pub phone_number: Scalar,
    pub amount: Scalar,
    pub account_reference: String,
}

impl MobileMoneyRequest {
    /// Check required fields before any outbound call is made.
    ///
    /// # Errors
    ///
    /// Returns [`MpesaError::MissingFields`] when the phone number or amount
    /// is absent or empty.
    pub fn validate(self) -> Result<PaymentDetails, MpesaError> {
        let phone_number = self
            .phone_number
            .filter(|p| !p.is_empty())
            .ok_or(MpesaError::MissingFields)?;
        let amount = self
            .amount
            .filter(|a| !a.is_empty())
            .ok_or(MpesaError::MissingFields)?;

        let account_reference = self
            .transaction_reference
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REFERENCE.to_string());

        Ok(PaymentDetails {
            phone_number,
            amount,
            account_reference,
        })
    }
}

/// Body of the Daraja OAuth response.
#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: Option<String>,
}

/// Lipa Na M-Pesa Online (STK push) request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushPayload {
    pub business_short_code: String,
    pub password: String,
    pub timestamp: String,
    pub transaction_type: &'static str,
    pub amount: Scalar,
    /// Subscriber paying
    pub party_a: Scalar,
    /// Short-code receiving the funds
    pub party_b: String,
    pub phone_number: Scalar,
    #[serde(rename = "CallBackURL")]
    pub call_back_url: String,
    pub account_reference: String,
    pub transaction_desc: &'static str,
}
