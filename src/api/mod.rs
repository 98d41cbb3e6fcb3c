//! HTTP surface of the service.
//!
//! Routes live under `/api/` behind a middleware stack:
//! CORS → Rate Limit → Caller Identity → Audit → Handler.
//!
//! `api_router()` returns a composable `Router` that `server` mounts on
//! a bound listener and tests drive with `oneshot`.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ApiServer, ServerError};
pub use types::{ApiContext, CallerContext};
