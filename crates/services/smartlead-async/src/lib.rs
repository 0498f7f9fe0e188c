#![deny(missing_docs)]

//! Async SmartLead API gateway: authenticated calls routed to configurable
//! backend targets, with rate-limit pacing, exponential retries and a single
//! normalized error shape.

/// Gateway implementation
pub mod client;
/// Configuration and backend targets
pub mod config;
/// Endpoint descriptors and request parameters
pub mod endpoint;
/// Error types
pub mod error;
/// Layered config file loading
pub mod loader;
/// Process-wide request pacing
pub mod rate_limit;
/// Retry policy and retryable-status predicate
pub mod retry;
/// Test support utilities (for use in tests)
#[doc(hidden)]
pub mod test_support;

pub use crate::client::Gateway;
pub use crate::config::{AuthPlacement, BackendTarget, GatewayConfig, PRIMARY, SMART_DELIVERY};
pub use crate::endpoint::{Endpoint, Method, Params};
pub use crate::error::{ConfigError, ErrorKind, FailureCause, GatewayError};
pub use crate::rate_limit::RateLimiter;
pub use crate::retry::RetryPolicy;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BackendTarget, Endpoint, Gateway, GatewayConfig, GatewayError, Method, Params, PRIMARY,
        SMART_DELIVERY,
    };
}
