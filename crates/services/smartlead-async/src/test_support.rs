//! Test-only utilities for safely mutating process-global state in tests.

use std::sync::Arc;
use std::time::Duration;

use crate::client::Gateway;
use crate::config::{
    ENV_API_KEY, ENV_BASE_URL, ENV_CALL_DEADLINE_MS, ENV_MAX_RETRIES, ENV_RATE_LIMIT,
    ENV_RETRY_DELAY_MS, ENV_SMART_DELIVERY_URL, ENV_TIMEOUT_MS, GatewayConfig, PRIMARY,
    SMART_DELIVERY,
};
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;

/// API key used by [`config_for`]
pub const TEST_API_KEY: &str = "test-key-123";

/// RAII guard for temporarily setting an environment variable.
///
/// The variable is automatically restored to its previous state (or removed if it
/// was not set) when the guard is dropped.
pub struct EnvGuard {
    key: &'static str,
    prev: Option<String>,
}

impl EnvGuard {
    /// Set an environment variable temporarily.
    ///
    /// # Safety
    ///
    /// This function uses `unsafe` because `std::env::set_var` can cause data races
    /// if called concurrently. Safe when used with `#[serial(env)]`.
    #[must_use]
    pub fn set(key: &'static str, val: &str) -> Self {
        let prev = std::env::var(key).ok();
        // SAFETY: callers serialize env mutation with #[serial(env)]
        unsafe { std::env::set_var(key, val) };
        Self { key, prev }
    }

    /// Remove an environment variable temporarily.
    ///
    /// # Safety
    ///
    /// This function uses `unsafe` because `std::env::remove_var` can cause data races
    /// if called concurrently. Safe when used with `#[serial(env)]`.
    #[must_use]
    pub fn remove(key: &'static str) -> Self {
        let prev = std::env::var(key).ok();
        // SAFETY: callers serialize env mutation with #[serial(env)]
        unsafe { std::env::remove_var(key) };
        Self { key, prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: the guard is dropped inside the same serialized test
        match &self.prev {
            Some(v) => unsafe { std::env::set_var(self.key, v) },
            None => unsafe { std::env::remove_var(self.key) },
        }
    }
}

/// Removes every `SMARTLEAD_*` variable the gateway reads, restoring them on drop.
#[must_use]
pub fn clear_gateway_env() -> Vec<EnvGuard> {
    [
        ENV_API_KEY,
        ENV_BASE_URL,
        ENV_SMART_DELIVERY_URL,
        ENV_TIMEOUT_MS,
        ENV_MAX_RETRIES,
        ENV_RATE_LIMIT,
        ENV_RETRY_DELAY_MS,
        ENV_CALL_DEADLINE_MS,
    ]
    .into_iter()
    .map(EnvGuard::remove)
    .collect()
}

/// Config with both built-in targets pointed at `base_url`, fast retries and a short timeout.
#[must_use]
pub fn config_for(base_url: &str) -> GatewayConfig {
    GatewayConfig::default()
        .with_api_key(TEST_API_KEY)
        .with_base_url(PRIMARY, base_url)
        .with_base_url(SMART_DELIVERY, format!("{}/sd", base_url.trim_end_matches('/')))
        .with_timeout(Duration::from_secs(2))
        .with_retry(RetryPolicy::new(3, Duration::from_millis(10)))
        .with_rate_limit(10_000)
}

/// Gateway built from [`config_for`].
///
/// # Panics
///
/// Panics if the gateway cannot be built.
#[must_use]
#[expect(clippy::expect_used, reason = "test helper")]
pub fn gateway_for(base_url: &str) -> Arc<Gateway> {
    Arc::new(Gateway::new(config_for(base_url)).expect("test gateway"))
}

/// Gateway built from `config` with an injected limiter.
///
/// # Panics
///
/// Panics if the gateway cannot be built.
#[must_use]
#[expect(clippy::expect_used, reason = "test helper")]
pub fn gateway_with_limiter(config: GatewayConfig, limiter: RateLimiter) -> Gateway {
    Gateway::with_rate_limiter(config, Arc::new(limiter)).expect("test gateway")
}
