//! M-Pesa (Daraja) STK push client.
//!
//! This module handles access-token acquisition, password generation and
//! the STK push call itself.

use std::time::Duration;

use base64::{Engine, prelude::BASE64_STANDARD};
use chrono::{DateTime, TimeZone};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::MpesaError;
use crate::models::mpesa::{
    AccessTokenResponse, PaymentDetails, StkPushPayload, TRANSACTION_DESC, TRANSACTION_TYPE,
};
use crate::services::token_cache::TokenCache;

/// Client for the Daraja OAuth and STK push endpoints.
#[derive(Debug)]
pub struct MpesaClient {
    http: reqwest::Client,
    consumer_key: String,
    consumer_secret: String,
    shortcode: String,
    passkey: String,
    auth_url: Url,
    stk_push_url: Url,
    callback_url: String,
    static_token: Option<String>,
    tokens: TokenCache,
}

impl MpesaClient {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            consumer_key: config.mpesa_consumer_key.clone(),
            consumer_secret: config.mpesa_consumer_secret.clone(),
            shortcode: config.shortcode.clone(),
            passkey: config.mpesa_passkey.clone(),
            auth_url: config.mpesa_auth_url.clone(),
            stk_push_url: config.mpesa_stk_push_url.clone(),
            callback_url: config.mpesa_callback_url.clone(),
            static_token: config.static_access_token().map(str::to_string),
            tokens: TokenCache::new(Duration::from_secs(config.mpesa_token_ttl_secs)),
        }
    }

    /// Bearer token for the STK push call.
    ///
    /// # Process
    ///
    /// 1. Use the pre-provisioned token if one is configured
    /// 2. Reuse a cached token for this consumer key if still fresh
    /// 3. Otherwise GET the auth URL with Basic credentials
    ///
    /// # Errors
    ///
    /// - `TokenRejected` if the auth endpoint answers anything but 200
    /// - `NoAccessToken` if a 200 body has no usable `access_token`
    /// - `Network` on transport failure
    pub async fn access_token(&self) -> Result<String, MpesaError> {
        if let Some(token) = &self.static_token {
            return Ok(token.clone());
        }

        if let Some(token) = self.tokens.get(&self.consumer_key).await {
            tracing::debug!("Using cached M-Pesa access token");
            return Ok(token);
        }

        let response = self
            .http
            .get(self.auth_url.clone())
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .send()
            .await?;

        let status = response.status();
        let body = read_body(response).await?;

        if status != reqwest::StatusCode::OK {
            tracing::warn!("M-Pesa auth endpoint returned {}: {}", status, body);
            return Err(MpesaError::TokenRejected { status, body });
        }

        let token = serde_json::from_value::<AccessTokenResponse>(body)
            .ok()
            .and_then(|r| r.access_token)
            .filter(|t| !t.is_empty())
            .ok_or(MpesaError::NoAccessToken)?;

        self.tokens.insert(&self.consumer_key, &token).await;
        Ok(token)
    }

    /// Build the STK push body for a validated request.
    pub fn stk_push_payload(&self, details: PaymentDetails, timestamp: String) -> StkPushPayload {
        StkPushPayload {
            business_short_code: self.shortcode.clone(),
            password: password(&self.shortcode, &self.passkey, &timestamp),
            timestamp,
            transaction_type: TRANSACTION_TYPE,
            amount: details.amount,
            party_a: details.phone_number.clone(),
            party_b: self.shortcode.clone(),
            phone_number: details.phone_number,
            call_back_url: self.callback_url.clone(),
            account_reference: details.account_reference,
            transaction_desc: TRANSACTION_DESC,
        }
    }

    /// Send the STK push and return the provider's acknowledgment body.
    ///
    /// # Errors
    ///
    /// - `PushRejected` with the provider status and body on any non-200
    /// - `Network` on transport failure
    ///
    /// A rejected token is dropped from the cache so the next request
    /// fetches a fresh one.
    pub async fn stk_push(&self, token: &str, payload: &StkPushPayload) -> Result<Value, MpesaError> {
        let response = self
            .http
            .post(self.stk_push_url.clone())
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = read_body(response).await?;

        if status != reqwest::StatusCode::OK {
            if token_rejected(status, &body) {
                tracing::warn!("M-Pesa rejected the access token, clearing cached token");
                self.tokens.remove(&self.consumer_key).await;
            }
            return Err(MpesaError::PushRejected { status, body });
        }

        Ok(body)
    }
}

/// Daraja answers 401, or `errorCode` 404.001.04 "Invalid Access Token".
fn token_rejected(status: reqwest::StatusCode, body: &Value) -> bool {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return true;
    }

    let code = body.get("errorCode").and_then(Value::as_str);
    let message = body.get("errorMessage").and_then(Value::as_str);
    code == Some("404.001.04") || message.is_some_and(|m| m.contains("Invalid Access Token"))
}

/// `YYYYMMDDHHMMSS` in the given clock's timezone.
pub fn timestamp<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y%m%d%H%M%S").to_string()
}

/// Base64 of short-code, passkey and timestamp concatenated.
pub fn password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    BASE64_STANDARD.encode(format!("{shortcode}{passkey}{timestamp}"))
}

/// Read a provider body as JSON, keeping non-JSON text as a JSON string.
async fn read_body(response: reqwest::Response) -> Result<Value, reqwest::Error> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn timestamp_is_fourteen_digits() {
        let now = FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 2)
            .unwrap();

        assert_eq!(timestamp(&now), "20240307090502");
        assert_eq!(timestamp(&Utc::now()).len(), 14);
    }

    #[test]
    fn password_decodes_to_concatenation() {
        let ts = "20240307090502";
        let encoded = password("174379", "bfb279f9aa9bdbcf158e97dd71a467cd", ts);
        let decoded = BASE64_STANDARD.decode(encoded).unwrap();

        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            format!("174379bfb279f9aa9bdbcf158e97dd71a467cd{ts}")
        );
    }

    #[test]
    fn invalid_token_responses_are_recognised() {
        use reqwest::StatusCode;
        use serde_json::json;

        let invalid = json!({"errorCode": "404.001.04", "errorMessage": "Invalid Access Token"});

        assert!(token_rejected(StatusCode::UNAUTHORIZED, &Value::String(String::new())));
        assert!(token_rejected(StatusCode::NOT_FOUND, &invalid));
        assert!(!token_rejected(
            StatusCode::BAD_REQUEST,
            &json!({"errorCode": "400.002.02", "errorMessage": "Bad Request - Invalid PhoneNumber"})
        ));
    }

    #[test]
    fn password_matches_known_value() {
        assert_eq!(password("1", "2", "3"), "MTIz");
    }
}
