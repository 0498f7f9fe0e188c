use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ConfigError;
use crate::retry::RetryPolicy;

/// Name of the main SmartLead API target
pub const PRIMARY: &str = "primary";
/// Name of the Smart Delivery API target
pub const SMART_DELIVERY: &str = "smart_delivery";

/// Default SmartLead API base URL
pub const SMARTLEAD_DEFAULT_BASE: &str = "https://server.smartlead.ai/api/v1";
/// Default Smart Delivery API base URL
pub const SMART_DELIVERY_DEFAULT_BASE: &str = "https://smartdelivery.smartlead.ai/api/v1";
/// Query parameter carrying the API key on both built-in targets
pub const API_KEY_PARAM: &str = "api_key";

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);
/// Default requests allowed per 60 second window
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// User agent sent on every request
pub const USER_AGENT: &str = concat!("smartlead-async/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "SMARTLEAD_API_KEY";
/// Environment override for the primary base URL
pub const ENV_BASE_URL: &str = "SMARTLEAD_BASE_URL";
/// Environment override for the Smart Delivery base URL
pub const ENV_SMART_DELIVERY_URL: &str = "SMARTLEAD_SMART_DELIVERY_URL";
/// Environment override for the per-attempt timeout (ms)
pub const ENV_TIMEOUT_MS: &str = "SMARTLEAD_TIMEOUT_MS";
/// Environment override for the attempt budget
pub const ENV_MAX_RETRIES: &str = "SMARTLEAD_MAX_RETRIES";
/// Environment override for the initial backoff (ms)
pub const ENV_RETRY_DELAY_MS: &str = "SMARTLEAD_RETRY_DELAY_MS";
/// Environment override for requests per minute
pub const ENV_RATE_LIMIT: &str = "SMARTLEAD_RATE_LIMIT";
/// Environment override for the overall call deadline (ms, 0 disables)
pub const ENV_CALL_DEADLINE_MS: &str = "SMARTLEAD_CALL_DEADLINE_MS";

/// Where a target expects the API key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthPlacement {
    /// Query string parameter
    Query {
        /// Parameter name
        param: String,
    },
    /// Request header
    Header {
        /// Header name
        name: String,
    },
}

impl Default for AuthPlacement {
    fn default() -> Self {
        Self::Query {
            param: API_KEY_PARAM.into(),
        }
    }
}

/// One upstream API surface: base URL plus auth convention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendTarget {
    /// Routing name used by endpoint descriptors
    pub name: String,
    /// Base URL that endpoint paths are appended to
    pub base_url: String,
    /// API key placement
    #[serde(default)]
    pub auth: AuthPlacement,
    /// Per-attempt timeout override in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Extra headers sent with every request to this target
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl BackendTarget {
    /// Creates a target that takes the key as the `api_key` query parameter
    #[must_use]
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            auth: AuthPlacement::default(),
            timeout_ms: None,
            headers: BTreeMap::new(),
        }
    }

    /// Sets the auth placement
    #[must_use]
    pub fn with_auth(mut self, auth: AuthPlacement) -> Self {
        self.auth = auth;
        self
    }

    /// Sets a per-attempt timeout for this target
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(crate::error::duration_ms(timeout));
        self
    }

    /// Adds a default header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Constructs the full URL for an endpoint path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("target name must not be empty".into()));
        }
        let parsed = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl {
            target: self.name.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                target: self.name.clone(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }
        match &self.auth {
            AuthPlacement::Query { param } if param.trim().is_empty() => Err(
                ConfigError::Invalid(format!("target `{}` has an empty auth param", self.name)),
            ),
            AuthPlacement::Header { name } if name.trim().is_empty() => Err(
                ConfigError::Invalid(format!("target `{}` has an empty auth header", self.name)),
            ),
            _ if self.timeout_ms == Some(0) => Err(ConfigError::Invalid(format!(
                "target `{}` timeout must be positive",
                self.name
            ))),
            _ => Ok(()),
        }
    }
}

/// Gateway configuration, built once at startup.
///
/// Debug output automatically redacts the API key via [`SecretString`].
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    api_key: Option<SecretString>,
    targets: Vec<BackendTarget>,
    timeout: Duration,
    retry: RetryPolicy,
    rate_limit: u32,
    call_deadline: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            targets: vec![
                BackendTarget::new(PRIMARY, SMARTLEAD_DEFAULT_BASE),
                BackendTarget::new(SMART_DELIVERY, SMART_DELIVERY_DEFAULT_BASE),
            ],
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            rate_limit: DEFAULT_RATE_LIMIT,
            call_deadline: None,
        }
    }
}

impl GatewayConfig {
    /// Built-in defaults overlaid with the `SMARTLEAD_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// Applies `SMARTLEAD_*` environment overrides. The API key is only ever read here.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse.
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Some(key) = env_trimmed(ENV_API_KEY) {
            self.api_key = Some(SecretString::from(key));
        }
        if let Some(v) = env_trimmed(ENV_BASE_URL) {
            self = self.with_base_url(PRIMARY, v);
        }
        if let Some(v) = env_trimmed(ENV_SMART_DELIVERY_URL) {
            self = self.with_base_url(SMART_DELIVERY, v);
        }
        if let Some(ms) = env_number(ENV_TIMEOUT_MS)? {
            self.timeout = Duration::from_millis(ms);
        }
        if let Some(n) = env_number(ENV_MAX_RETRIES)? {
            self.retry.max_attempts = u32::try_from(n).unwrap_or(u32::MAX);
        }
        if let Some(ms) = env_number(ENV_RETRY_DELAY_MS)? {
            self.retry.initial_delay = Duration::from_millis(ms);
        }
        if let Some(n) = env_number(ENV_RATE_LIMIT)? {
            self.rate_limit = u32::try_from(n).unwrap_or(u32::MAX);
        }
        if let Some(ms) = env_number(ENV_CALL_DEADLINE_MS)? {
            self.call_deadline = (ms > 0).then(|| Duration::from_millis(ms));
        }
        Ok(self)
    }

    /// Sets the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Points an existing target at a new base URL, creating it if absent
    #[must_use]
    pub fn with_base_url(mut self, target: &str, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        match self.targets.iter_mut().find(|t| t.name == target) {
            Some(t) => t.base_url = base_url,
            None => self.targets.push(BackendTarget::new(target, base_url)),
        }
        self
    }

    /// Adds a target, replacing any target of the same name
    #[must_use]
    pub fn with_target(mut self, target: BackendTarget) -> Self {
        match self.targets.iter_mut().find(|t| t.name == target.name) {
            Some(existing) => *existing = target,
            None => self.targets.push(target),
        }
        self
    }

    /// Sets the default per-attempt timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets requests allowed per 60 second window
    #[must_use]
    pub const fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit = per_minute;
        self
    }

    /// Bounds a whole call, retries and backoff included
    #[must_use]
    pub const fn with_call_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.call_deadline = deadline;
        self
    }

    /// Looks up a target by name
    #[must_use]
    pub fn target(&self, name: &str) -> Option<&BackendTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// All configured targets
    #[must_use]
    pub fn targets(&self) -> &[BackendTarget] {
        &self.targets
    }

    /// Default per-attempt timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Per-attempt timeout for a target
    #[must_use]
    pub fn timeout_for(&self, target: &BackendTarget) -> Duration {
        target.timeout_ms.map_or(self.timeout, Duration::from_millis)
    }

    /// Retry policy
    #[must_use]
    pub const fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Requests allowed per 60 second window
    #[must_use]
    pub const fn rate_limit(&self) -> u32 {
        self.rate_limit
    }

    /// Overall call deadline, if any
    #[must_use]
    pub const fn call_deadline(&self) -> Option<Duration> {
        self.call_deadline
    }

    /// Whether a non-blank API key is configured
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    pub(crate) fn api_key(&self) -> &str {
        self.api_key
            .as_ref()
            .map_or("", |k| k.expose_secret().trim())
    }

    /// Checks credentials, URLs and numeric bounds.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.has_api_key() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.targets.is_empty() {
            return Err(ConfigError::Invalid("at least one target is required".into()));
        }
        for target in &self.targets {
            target.validate()?;
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be positive".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("maxRetries must be at least 1".into()));
        }
        if !self.retry.multiplier.is_finite() || self.retry.multiplier < 1.0 {
            return Err(ConfigError::Invalid("backoffFactor must be at least 1".into()));
        }
        if self.rate_limit == 0 {
            return Err(ConfigError::Invalid("rateLimit must be at least 1".into()));
        }
        if self.call_deadline.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::Invalid("callDeadline must be positive".into()));
        }
        Ok(())
    }

    pub(crate) fn retry_mut(&mut self) -> &mut RetryPolicy {
        &mut self.retry
    }
}

/// Helper to read and normalize an env var (trim + filter empty).
pub(crate) fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_number(name: &str) -> Result<Option<u64>, ConfigError> {
    env_trimmed(name)
        .map(|v| {
            v.parse::<u64>().map_err(|_| {
                ConfigError::Invalid(format!("{name} must be a non-negative integer, got `{v}`"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{EnvGuard, clear_gateway_env};
    use serial_test::serial;

    #[test]
    fn defaults_match_upstream_conventions() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.target(PRIMARY).unwrap().base_url, SMARTLEAD_DEFAULT_BASE);
        assert_eq!(
            cfg.target(SMART_DELIVERY).unwrap().base_url,
            SMART_DELIVERY_DEFAULT_BASE
        );
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.retry().max_attempts, 3);
        assert_eq!(cfg.retry().initial_delay, Duration::from_secs(1));
        assert_eq!(cfg.rate_limit(), 100);
        assert_eq!(cfg.call_deadline(), None);
        assert!(matches!(
            &cfg.target(PRIMARY).unwrap().auth,
            AuthPlacement::Query { param } if param == "api_key"
        ));
    }

    #[test]
    #[serial(env)]
    fn config_reads_env_vars() {
        let _clear = clear_gateway_env();
        let _key = EnvGuard::set(ENV_API_KEY, "  test-key-123  ");
        let _base = EnvGuard::set(ENV_BASE_URL, "https://custom.smartlead.test/api/v1");
        let _timeout = EnvGuard::set(ENV_TIMEOUT_MS, "5000");
        let _retries = EnvGuard::set(ENV_MAX_RETRIES, "5");
        let _delay = EnvGuard::set(ENV_RETRY_DELAY_MS, "250");
        let _rate = EnvGuard::set(ENV_RATE_LIMIT, "60");
        let _deadline = EnvGuard::set(ENV_CALL_DEADLINE_MS, "9000");

        let cfg = GatewayConfig::from_env().unwrap();
        assert_eq!(cfg.api_key(), "test-key-123");
        assert_eq!(
            cfg.target(PRIMARY).unwrap().base_url,
            "https://custom.smartlead.test/api/v1"
        );
        assert_eq!(cfg.timeout(), Duration::from_millis(5000));
        assert_eq!(cfg.retry().max_attempts, 5);
        assert_eq!(cfg.retry().initial_delay, Duration::from_millis(250));
        assert_eq!(cfg.rate_limit(), 60);
        assert_eq!(cfg.call_deadline(), Some(Duration::from_millis(9000)));
        cfg.validate().unwrap();
    }

    #[test]
    #[serial(env)]
    fn bad_numeric_env_is_an_error() {
        let _clear = clear_gateway_env();
        let _rate = EnvGuard::set(ENV_RATE_LIMIT, "lots");
        let err = GatewayConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("SMARTLEAD_RATE_LIMIT"));
    }

    #[test]
    #[serial(env)]
    fn zero_deadline_disables_it() {
        let _clear = clear_gateway_env();
        let _deadline = EnvGuard::set(ENV_CALL_DEADLINE_MS, "0");
        let cfg = GatewayConfig::default()
            .with_call_deadline(Some(Duration::from_secs(1)))
            .apply_env()
            .unwrap();
        assert_eq!(cfg.call_deadline(), None);
    }

    #[test]
    #[serial(env)]
    fn missing_key_fails_validation() {
        let _clear = clear_gateway_env();
        let cfg = GatewayConfig::from_env().unwrap();
        assert!(matches!(cfg.validate(), Err(ConfigError::MissingApiKey)));
        let cfg = cfg.with_api_key("   ");
        assert!(matches!(cfg.validate(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let base = GatewayConfig::default().with_api_key("k");
        base.validate().unwrap();

        let cfg = base.clone().with_retry(RetryPolicy::new(0, Duration::from_millis(1)));
        assert!(cfg.validate().unwrap_err().to_string().contains("maxRetries"));

        let cfg = base.clone().with_rate_limit(0);
        assert!(cfg.validate().unwrap_err().to_string().contains("rateLimit"));

        let cfg = base
            .clone()
            .with_retry(RetryPolicy::default().with_multiplier(0.5));
        assert!(cfg.validate().unwrap_err().to_string().contains("backoffFactor"));

        let cfg = base.clone().with_base_url(PRIMARY, "not a url");
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidUrl { .. })));

        let cfg = base.clone().with_base_url(PRIMARY, "ftp://files.example.com");
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidUrl { .. })));

        let cfg = base.with_target(BackendTarget::new(" ", "https://x.example.com"));
        assert!(cfg.validate().unwrap_err().to_string().contains("name"));
    }

    #[test]
    fn with_target_replaces_by_name() {
        let cfg = GatewayConfig::default()
            .with_target(
                BackendTarget::new(SMART_DELIVERY, "https://sd.internal/api")
                    .with_auth(AuthPlacement::Header {
                        name: "x-api-key".into(),
                    }),
            )
            .with_target(BackendTarget::new("reporting", "https://reports.internal"));
        assert_eq!(cfg.targets().len(), 3);
        let sd = cfg.target(SMART_DELIVERY).unwrap();
        assert_eq!(sd.base_url, "https://sd.internal/api");
        assert!(matches!(sd.auth, AuthPlacement::Header { .. }));
    }

    #[test]
    fn url_joins_without_double_slashes() {
        let t = BackendTarget::new(PRIMARY, "https://server.smartlead.ai/api/v1/");
        assert_eq!(
            t.url("/campaigns/7"),
            "https://server.smartlead.ai/api/v1/campaigns/7"
        );
        assert_eq!(t.url("client/"), "https://server.smartlead.ai/api/v1/client/");
    }

    #[test]
    fn per_target_timeout_overrides_global() {
        let cfg = GatewayConfig::default().with_timeout(Duration::from_secs(10));
        let slow = BackendTarget::new("slow", "https://slow.example.com")
            .with_timeout(Duration::from_secs(60));
        assert_eq!(cfg.timeout_for(&slow), Duration::from_secs(60));
        assert_eq!(
            cfg.timeout_for(cfg.target(PRIMARY).unwrap()),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = GatewayConfig::default().with_api_key("super-secret-key");
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret-key"));
    }
}
