//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
///
/// Built once in `main` and handed to the provider clients; nothing reads
/// the environment after startup.
///
/// # Environment Variables
///
/// - `STRIPE_SECRET_KEY` (required): Stripe secret API key
/// - `STRIPE_API_BASE` (optional): defaults to `https://api.stripe.com/`
/// - `MPESA_CONSUMER_KEY` / `MPESA_CONSUMER_SECRET` (required): Daraja app credentials
/// - `SHORTCODE` / `MPESA_PASSKEY` (required): business short-code and its passkey
/// - `MPESA_AUTH_URL` / `MPESA_STK_PUSH_URL` / `MPESA_CALLBACK_URL` (required)
/// - `MPESA_ACCESS_TOKEN` (optional): pre-provisioned bearer token, skips the OAuth call
/// - `MPESA_TOKEN_TTL_SECS` (optional): token cache lifetime, 0 disables caching
/// - `HTTP_TIMEOUT_SECS` (optional): per-call timeout for outbound requests
/// - `STRICT_STATUS_CODES` (optional): use non-200 statuses for every charge failure
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 8000
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub stripe_secret_key: String,

    #[serde(default = "default_stripe_api_base")]
    pub stripe_api_base: Url,

    pub mpesa_consumer_key: String,
    pub mpesa_consumer_secret: String,
    pub shortcode: String,
    pub mpesa_passkey: String,
    pub mpesa_auth_url: Url,
    pub mpesa_stk_push_url: Url,
    pub mpesa_callback_url: String,

    #[serde(default)]
    pub mpesa_access_token: Option<String>,

    #[serde(default = "default_token_ttl")]
    pub mpesa_token_ttl_secs: u64,

    #[serde(default = "default_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub strict_status_codes: bool,

    #[serde(default = "default_port")]
    pub server_port: u16,
}

/// How charge failures other than card declines are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Every failure except a decline answers 200, as existing clients expect.
    #[default]
    Observed,
    /// Each failure kind gets its own 4xx/5xx status.
    Strict,
}

fn default_stripe_api_base() -> Url {
    Url::parse("https://api.stripe.com/").expect("static URL is valid")
}

/// Daraja tokens live for 3599 seconds; refresh well before that.
fn default_token_ttl() -> u64 {
    3000
}

fn default_timeout() -> u64 {
    30
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., STRIPE_SECRET_KEY)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: mpesa_passkey -> MPESA_PASSKEY
        envy::from_env::<Config>()
    }

    pub fn status_policy(&self) -> StatusPolicy {
        if self.strict_status_codes {
            StatusPolicy::Strict
        } else {
            StatusPolicy::Observed
        }
    }

    /// Static token wins over fetching; blank values count as unset.
    pub fn static_access_token(&self) -> Option<&str> {
        self.mpesa_access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}
