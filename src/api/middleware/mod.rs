//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Rate limiter: reject early, save model calls
//! 2. Caller identity: `X-User-Id` from the auth gateway
//! 3. Audit logger: logs after identity, has the caller id

pub mod audit;
pub mod identity;
pub mod rate;

/// Header carrying the authenticated user id from the gateway.
pub const USER_ID_HEADER: &str = "X-User-Id";
