//! Shared helpers for router-level tests.

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use payments_relay_web_server::{app, config::Config, state::AppState};
use serde_json::Value;
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

pub const SHORTCODE: &str = "174379";
pub const PASSKEY: &str = "bfb279f9aa9bdbcf158e97dd71a467cd";
pub const CALLBACK_URL: &str = "https://example.com/mpesa/callback";
pub const STRIPE_KEY: &str = "sk_test_123";

/// Configuration with every provider pointed at the mock server.
///
/// Token caching is off so each request fetches its own token.
pub fn config(server: &MockServer) -> Config {
    let base = Url::parse(&server.uri()).unwrap();
    Config {
        stripe_secret_key: STRIPE_KEY.to_string(),
        stripe_api_base: base.clone(),
        mpesa_consumer_key: "consumer-key".to_string(),
        mpesa_consumer_secret: "consumer-secret".to_string(),
        shortcode: SHORTCODE.to_string(),
        mpesa_passkey: PASSKEY.to_string(),
        mpesa_auth_url: base
            .join("oauth/v1/generate?grant_type=client_credentials")
            .unwrap(),
        mpesa_stk_push_url: base.join("mpesa/stkpush/v1/processrequest").unwrap(),
        mpesa_callback_url: CALLBACK_URL.to_string(),
        mpesa_access_token: None,
        mpesa_token_ttl_secs: 0,
        http_timeout_secs: 5,
        strict_status_codes: false,
        server_port: 0,
    }
}

pub fn router(config: &Config) -> Router {
    app(AppState::new(config).unwrap())
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_post(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
