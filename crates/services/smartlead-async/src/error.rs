use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on how much of an upstream body ends up in an error message
const BODY_SNIPPET_LIMIT: usize = 400;

/// Replacement text for scrubbed secrets
pub const REDACTED: &str = "[REDACTED]";

/// Normalized error category shared by the gateway and tool adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input failed shape checks before reaching the gateway
    Validation,
    /// Upstream answered with a non-retryable status, or the request was malformed
    RequestRejected,
    /// Retryable failures persisted until the attempt budget or deadline ran out
    RetriesExhausted,
}

impl ErrorKind {
    /// Stable `snake_case` name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::RequestRejected => "request_rejected",
            Self::RetriesExhausted => "retries_exhausted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last underlying cause of a failed call, free of transport types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureCause {
    /// The attempt hit its timeout
    Timeout,
    /// The connection could not be established
    Connect {
        /// Transport message
        message: String,
    },
    /// Any other transport failure while sending or reading
    Transport {
        /// Transport message
        message: String,
    },
    /// Upstream answered with a retryable status
    Status {
        /// HTTP status code
        status: u16,
        /// Server-provided message
        message: String,
    },
    /// The overall call deadline elapsed
    DeadlineElapsed {
        /// Configured deadline in milliseconds
        after_ms: u64,
    },
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("request timed out"),
            Self::Connect { message } => write!(f, "connection failed: {message}"),
            Self::Transport { message } => write!(f, "transport error: {message}"),
            Self::Status { status, message } if message.is_empty() => write!(f, "HTTP {status}"),
            Self::Status { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::DeadlineElapsed { after_ms } => {
                write!(f, "call deadline of {after_ms}ms elapsed")
            }
        }
    }
}

/// Errors produced by a gateway call.
///
/// Nothing beyond this boundary sees a transport exception type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Non-retryable upstream status, or a request that could not be formed
    #[error("{target} rejected the request{}: {message}", status_suffix(*.status))]
    RequestRejected {
        /// Backend target name
        target: String,
        /// HTTP status, absent for malformed requests
        status: Option<u16>,
        /// Server-provided or local message
        message: String,
    },

    /// Retryable failures outlasted the retry policy or call deadline
    #[error("{target} call failed after {attempts} attempt(s): {cause}")]
    RetriesExhausted {
        /// Backend target name
        target: String,
        /// Attempts actually made
        attempts: u32,
        /// Last underlying cause
        cause: FailureCause,
    },
}

fn status_suffix(status: Option<u16>) -> String {
    status.map(|s| format!(" with HTTP {s}")).unwrap_or_default()
}

impl GatewayError {
    /// Rejection for input the gateway could not turn into a request
    #[must_use]
    pub fn malformed(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RequestRejected {
            target: target.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Normalized category
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RequestRejected { .. } => ErrorKind::RequestRejected,
            Self::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
        }
    }

    /// HTTP status if the failure carried one
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestRejected { status, .. } => *status,
            Self::RetriesExhausted {
                cause: FailureCause::Status { status, .. },
                ..
            } => Some(*status),
            Self::RetriesExhausted { .. } => None,
        }
    }

    /// Backend target the call was routed to
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::RequestRejected { target, .. } | Self::RetriesExhausted { target, .. } => target,
        }
    }

    /// Attempts made before giving up (1 for rejections)
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::RequestRejected { .. } => 1,
            Self::RetriesExhausted { attempts, .. } => *attempts,
        }
    }
}

/// Configuration errors raised while building a gateway
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No usable API key
    #[error("Missing SmartLead credentials: set SMARTLEAD_API_KEY environment variable")]
    MissingApiKey,

    /// A base URL did not parse
    #[error("Invalid base URL for target `{target}`: {reason}")]
    InvalidUrl {
        /// Target name
        target: String,
        /// Parser message
        reason: String,
    },

    /// Any other invalid setting
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(String),

    /// A config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid JSON or has the wrong shape
    #[error("Invalid config file {path}: {message}")]
    Parse {
        /// File path
        path: String,
        /// Parser message
        message: String,
    },
}

/// Failure of a single attempt, before retry classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttemptError {
    Status { status: u16, message: String },
    Timeout,
    Connect(String),
    Transport(String),
    Build(String),
}

impl AttemptError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        let is_timeout = e.is_timeout();
        let is_connect = e.is_connect();
        let is_builder = e.is_builder();
        let message = e.without_url().to_string();
        if is_timeout {
            Self::Timeout
        } else if is_builder {
            Self::Build(message)
        } else if is_connect {
            Self::Connect(message)
        } else {
            Self::Transport(message)
        }
    }

    pub(crate) const fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => crate::retry::is_retryable_status(*status),
            Self::Timeout | Self::Connect(_) | Self::Transport(_) => true,
            Self::Build(_) => false,
        }
    }

    pub(crate) fn into_gateway_error(
        self,
        target: &str,
        attempts: u32,
        redact: &Redactor,
    ) -> GatewayError {
        let retryable = self.is_retryable();
        match self {
            Self::Status { status, message } if !retryable => GatewayError::RequestRejected {
                target: target.to_string(),
                status: Some(status),
                message: redact.scrub(&message),
            },
            Self::Build(message) => GatewayError::malformed(target, redact.scrub(&message)),
            other => GatewayError::RetriesExhausted {
                target: target.to_string(),
                attempts,
                cause: other.into_cause(redact),
            },
        }
    }

    fn into_cause(self, redact: &Redactor) -> FailureCause {
        match self {
            Self::Status { status, message } => FailureCause::Status {
                status,
                message: redact.scrub(&message),
            },
            Self::Timeout => FailureCause::Timeout,
            Self::Connect(message) => FailureCause::Connect {
                message: redact.scrub(&message),
            },
            Self::Transport(message) | Self::Build(message) => FailureCause::Transport {
                message: redact.scrub(&message),
            },
        }
    }

    pub(crate) fn summary(&self) -> String {
        match self {
            Self::Status { status, .. } => format!("HTTP {status}"),
            Self::Timeout => "timeout".into(),
            Self::Connect(_) => "connect error".into(),
            Self::Transport(_) => "transport error".into(),
            Self::Build(_) => "malformed request".into(),
        }
    }
}

/// Scrubs a secret out of any text before it leaves the gateway.
///
/// Only whole-token occurrences are replaced: a match must not touch an
/// alphanumeric, `-` or `_` on either side. A very short key therefore never
/// mangles ordinary words, but a key glued to other token characters is
/// left as-is.
#[derive(Clone)]
pub(crate) struct Redactor {
    secret: String,
}

impl Redactor {
    pub(crate) fn new(secret: &str) -> Self {
        Self {
            secret: secret.trim().to_string(),
        }
    }

    pub(crate) fn scrub(&self, text: &str) -> String {
        if self.secret.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        for (start, found) in text.match_indices(self.secret.as_str()) {
            let end = start + found.len();
            let joined = text[..start].chars().next_back().is_some_and(is_token_char)
                || text[end..].chars().next().is_some_and(is_token_char);
            if joined {
                continue;
            }
            out.push_str(&text[copied..start]);
            out.push_str(REDACTED);
            copied = end;
        }
        out.push_str(&text[copied..]);
        out
    }
}

const fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_')
}

impl fmt::Debug for Redactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Redactor").finish_non_exhaustive()
    }
}

/// Extracts the server-provided message from an error body.
///
/// Prefers a JSON `message` or `error` field, falling back to the first
/// 400 bytes of the body as text.
#[must_use]
pub fn upstream_message(body: &[u8]) -> String {
    if let Ok(serde_json::Value::Object(obj)) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            match obj.get(key) {
                Some(serde_json::Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(serde_json::Value::Object(inner)) => {
                    if let Some(serde_json::Value::String(s)) = inner.get("message") {
                        return s.clone();
                    }
                }
                _ => {}
            }
        }
    }
    String::from_utf8_lossy(&body[..body.len().min(BODY_SNIPPET_LIMIT)])
        .trim()
        .to_string()
}

pub(crate) fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_prefers_json_fields() {
        assert_eq!(upstream_message(br#"{"message":"Campaign not found"}"#), "Campaign not found");
        assert_eq!(upstream_message(br#"{"error":"Invalid api key"}"#), "Invalid api key");
        assert_eq!(
            upstream_message(br#"{"error":{"message":"nested"}}"#),
            "nested"
        );
    }

    #[test]
    fn upstream_message_caps_plain_text() {
        let body = "x".repeat(1000);
        assert_eq!(upstream_message(body.as_bytes()).len(), 400);
        assert_eq!(upstream_message(b"  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn non_retryable_status_becomes_rejection() {
        let r = Redactor::new("k");
        let err = AttemptError::Status {
            status: 404,
            message: "missing".into(),
        }
        .into_gateway_error("primary", 1, &r);
        assert_eq!(err.kind(), ErrorKind::RequestRejected);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.attempts(), 1);
        assert_eq!(err.to_string(), "primary rejected the request with HTTP 404: missing");
    }

    #[test]
    fn retryable_failure_becomes_exhaustion() {
        let r = Redactor::new("k");
        let err = AttemptError::Status {
            status: 503,
            message: "busy".into(),
        }
        .into_gateway_error("smart_delivery", 3, &r);
        assert_eq!(err.kind(), ErrorKind::RetriesExhausted);
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.attempts(), 3);
        assert_eq!(err.target(), "smart_delivery");

        let err = AttemptError::Timeout.into_gateway_error("primary", 2, &r);
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn build_errors_are_malformed_rejections() {
        let r = Redactor::new("k");
        let err = AttemptError::Build("bad header".into()).into_gateway_error("primary", 1, &r);
        assert_eq!(err.kind(), ErrorKind::RequestRejected);
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "primary rejected the request: bad header");
    }

    #[test]
    fn redactor_scrubs_secret() {
        let r = Redactor::new(" secret-key ");
        assert_eq!(r.scrub("bad key secret-key given"), "bad key [REDACTED] given");
        assert_eq!(Redactor::new("").scrub("unchanged"), "unchanged");
        assert_eq!(
            r.scrub(r#"{"api_key":"secret-key"} ?api_key=secret-key&x=1"#),
            r#"{"api_key":"[REDACTED]"} ?api_key=[REDACTED]&x=1"#
        );
    }

    #[test]
    fn short_secret_leaves_words_alone() {
        let r = Redactor::new("k");
        assert_eq!(r.scrub("unknown kind k"), "unknown kind [REDACTED]");
        assert_eq!(r.scrub("key=k"), "key=[REDACTED]");
        assert!(!format!("{r:?}").contains("secret-key"));
    }

    #[test]
    fn kinds_serialize_snake_case() {
        assert_eq!(
            serde_json::to_value(ErrorKind::RetriesExhausted).unwrap(),
            serde_json::json!("retries_exhausted")
        );
        let cause = FailureCause::Status {
            status: 429,
            message: "slow down".into(),
        };
        assert_eq!(
            serde_json::to_value(&cause).unwrap(),
            serde_json::json!({"type": "status", "status": 429, "message": "slow down"})
        );
    }
}
