//! Web server module: endpoint handlers, ingress guards, and the
//! request error taxonomy.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod signature;

pub use error::ApiError;
pub use handlers::{router, AppState, MAX_BODY_BYTES};
pub use rate_limit::{source_key, RateLimiter};
pub use signature::{verify_signature, SIGNATURE_HEADER};
