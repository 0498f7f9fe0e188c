use backon::Retryable;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{AuthPlacement, BackendTarget, GatewayConfig, USER_AGENT};
use crate::endpoint::{Endpoint, Method, Params, query_pairs, without_nulls};
use crate::error::{
    AttemptError, ConfigError, FailureCause, GatewayError, Redactor, duration_ms, upstream_message,
};
use crate::rate_limit::RateLimiter;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Authenticated, rate-limited, retrying gateway to the SmartLead APIs.
///
/// Clones share the HTTP connection pool and the rate limiter.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    config: Arc<GatewayConfig>,
    limiter: Arc<RateLimiter>,
    redact: Redactor,
}

impl Gateway {
    /// Creates a gateway with its own limiter sized from `config.rate_limit()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation or the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let limiter = Arc::new(RateLimiter::per_minute(config.rate_limit()));
        Self::with_rate_limiter(config, limiter)
    }

    /// Creates a gateway that paces calls through an existing limiter.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation or the HTTP client cannot be built.
    pub fn with_rate_limiter(
        config: GatewayConfig,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT.min(config.timeout()))
            .build()
            .map_err(|e| ConfigError::Http(e.without_url().to_string()))?;
        let redact = Redactor::new(config.api_key());
        Ok(Self {
            http,
            config: Arc::new(config),
            limiter,
            redact,
        })
    }

    /// Returns the gateway configuration
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the shared rate limiter
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Calls an endpoint descriptor, filling its path template from `params`.
    ///
    /// # Errors
    ///
    /// See [`Gateway::call`]. A missing or unsafe path parameter is a
    /// [`GatewayError::RequestRejected`] without a status.
    pub async fn call_endpoint(
        &self,
        endpoint: &Endpoint,
        mut params: Params,
    ) -> Result<Value, GatewayError> {
        let path = endpoint.render(&mut params)?;
        self.call(endpoint.target, endpoint.method, &path, params).await
    }

    /// Performs one logical call: authenticated, paced attempts and retries.
    ///
    /// GET and DELETE send `params` as the query string, POST and PUT as a JSON
    /// body. Null parameters are dropped. The decoded body is returned as-is;
    /// an empty body is `Value::Null` and a non-JSON body is `Value::String`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::RequestRejected`] for an unknown target, a request
    ///   that cannot be built, or a non-retryable upstream status
    /// - [`GatewayError::RetriesExhausted`] when timeouts, transport failures,
    ///   429 or 5xx persist for every attempt, or the call deadline elapses
    pub async fn call(
        &self,
        target: &str,
        method: Method,
        path: &str,
        params: Params,
    ) -> Result<Value, GatewayError> {
        let Some(backend) = self.config.target(target) else {
            return Err(GatewayError::malformed(
                target,
                format!("unknown backend target `{target}`"),
            ));
        };
        let params = without_nulls(params);
        let per_attempt = self.config.timeout_for(backend);

        let attempts = AtomicU32::new(0);
        let attempt = || async {
            // Every attempt is an upstream request and takes its own slot.
            self.limiter.acquire().await;
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(backend = %backend.name, %method, path, attempt = n, "sending request");

            let request = self.build_request(backend, method, path, &params, per_attempt)?;
            let response = self
                .http
                .execute(request)
                .await
                .map_err(AttemptError::from_reqwest)?;

            let status = response.status();
            let bytes = response
                .bytes()
                .await
                .map_err(AttemptError::from_reqwest)?;

            if status.is_success() {
                debug!(
                    backend = %backend.name,
                    %method,
                    path,
                    status = status.as_u16(),
                    "request succeeded"
                );
                return Ok(decode_body(&bytes));
            }

            Err(AttemptError::Status {
                status: status.as_u16(),
                message: upstream_message(&bytes),
            })
        };

        let retried = attempt
            .retry(self.config.retry().backoff())
            .when(AttemptError::is_retryable)
            .notify(|err: &AttemptError, delay: Duration| {
                warn!(
                    backend = %backend.name,
                    %method,
                    path,
                    error = %err.summary(),
                    delay_ms = duration_ms(delay),
                    "retrying request"
                );
            });

        let outcome = match self.config.call_deadline() {
            Some(deadline) => {
                if let Ok(result) = tokio::time::timeout(deadline, retried).await {
                    result
                } else {
                    let err = GatewayError::RetriesExhausted {
                        target: backend.name.clone(),
                        attempts: attempts.load(Ordering::SeqCst),
                        cause: FailureCause::DeadlineElapsed {
                            after_ms: duration_ms(deadline),
                        },
                    };
                    warn!(
                        backend = %backend.name,
                        %method,
                        path,
                        error = %err,
                        "call deadline elapsed"
                    );
                    return Err(err);
                }
            }
            None => retried.await,
        };

        outcome.map_err(|e| {
            let err = e.into_gateway_error(
                &backend.name,
                attempts.load(Ordering::SeqCst),
                &self.redact,
            );
            warn!(backend = %backend.name, %method, path, kind = %err.kind(), "call failed");
            err
        })
    }

    /// GET with query parameters
    ///
    /// # Errors
    ///
    /// See [`Gateway::call`].
    pub async fn get(
        &self,
        target: &str,
        path: &str,
        params: Params,
    ) -> Result<Value, GatewayError> {
        self.call(target, Method::Get, path, params).await
    }

    /// POST with a JSON body
    ///
    /// # Errors
    ///
    /// See [`Gateway::call`].
    pub async fn post(
        &self,
        target: &str,
        path: &str,
        body: Params,
    ) -> Result<Value, GatewayError> {
        self.call(target, Method::Post, path, body).await
    }

    /// PUT with a JSON body
    ///
    /// # Errors
    ///
    /// See [`Gateway::call`].
    pub async fn put(
        &self,
        target: &str,
        path: &str,
        body: Params,
    ) -> Result<Value, GatewayError> {
        self.call(target, Method::Put, path, body).await
    }

    /// DELETE with query parameters
    ///
    /// # Errors
    ///
    /// See [`Gateway::call`].
    pub async fn delete(
        &self,
        target: &str,
        path: &str,
        params: Params,
    ) -> Result<Value, GatewayError> {
        self.call(target, Method::Delete, path, params).await
    }

    fn build_request(
        &self,
        backend: &BackendTarget,
        method: Method,
        path: &str,
        params: &Params,
        timeout: Duration,
    ) -> Result<reqwest::Request, AttemptError> {
        let key = self.config.api_key();
        let mut req = self
            .http
            .request(method.into(), backend.url(path))
            .timeout(timeout);

        for (name, value) in &backend.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        req = match &backend.auth {
            AuthPlacement::Query { param } => req.query(&[(param.as_str(), key)]),
            AuthPlacement::Header { name } => req.header(name.as_str(), key),
        };

        req = if method.sends_body() {
            req.json(params)
        } else {
            req.query(&query_pairs(params))
        };

        req.build().map_err(AttemptError::from_reqwest)
    }
}

fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
