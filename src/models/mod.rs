//! Request, response and provider payload types.

/// Card charge models
pub mod charge;
/// M-Pesa STK push models
pub mod mpesa;
