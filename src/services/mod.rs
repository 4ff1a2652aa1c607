//! Payment provider clients.
//!
//! Services talk to the external providers and translate their responses
//! into typed results, keeping HTTP handlers thin.

pub mod mpesa;
pub mod stripe;
pub mod token_cache;
