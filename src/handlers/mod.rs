//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (form or JSON body)
//! 2. Calls the payment provider
//! 3. Returns HTTP response (JSON, status code)

/// Card charge endpoint
pub mod charge;
/// Liveness endpoint
pub mod health;
/// M-Pesa STK push endpoint
pub mod mpesa;
