//! Tool-level errors and the normalized shape every failure is reported in.

use serde::{Deserialize, Serialize};
use smartlead_async::{ErrorKind, GatewayError};
use thiserror::Error;

/// Error type returned by tool operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Input failed shape or semantic checks; no request was made.
    #[error("invalid input{}: {message}", field_suffix(.field.as_deref()))]
    Validation {
        /// Offending field path, when known
        field: Option<String>,
        /// What was wrong
        message: String,
    },

    /// Upstream refused the request, or it could not be formed.
    #[error("{message}")]
    RequestRejected {
        /// HTTP status, absent for locally rejected requests
        status: Option<u16>,
        /// Server-provided or local message
        message: String,
    },

    /// Retryable failures persisted until the gateway gave up.
    #[error("{message}")]
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
        /// Last HTTP status, if the last cause was a status
        status: Option<u16>,
        /// Summary of the failure
        message: String,
        /// Last underlying cause
        cause: String,
    },

    /// No tool with this name is registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

fn field_suffix(field: Option<&str>) -> String {
    field.map(|f| format!(" at `{f}`")).unwrap_or_default()
}

impl ToolError {
    /// Validation failure on a named field
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Normalized category
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::UnknownTool(_) => ErrorKind::Validation,
            Self::RequestRejected { .. } => ErrorKind::RequestRejected,
            Self::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
        }
    }

    /// HTTP status, if any
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestRejected { status, .. } | Self::RetriesExhausted { status, .. } => *status,
            Self::Validation { .. } | Self::UnknownTool(_) => None,
        }
    }

    /// Serializable view of this error
    #[must_use]
    pub fn normalized(&self) -> NormalizedError {
        let (message, field, cause) = match self {
            Self::Validation { field, message } => (message.clone(), field.clone(), None),
            Self::RequestRejected { message, .. } => (message.clone(), None, None),
            Self::RetriesExhausted { message, cause, .. } => {
                (message.clone(), None, Some(cause.clone()))
            }
            Self::UnknownTool(_) => (self.to_string(), None, None),
        };
        NormalizedError {
            kind: self.kind(),
            message,
            status: self.status(),
            field,
            cause,
        }
    }
}

impl From<GatewayError> for ToolError {
    fn from(e: GatewayError) -> Self {
        let status = e.status();
        match e {
            GatewayError::RequestRejected { message, .. } => {
                Self::RequestRejected { status, message }
            }
            GatewayError::RetriesExhausted {
                ref cause,
                attempts,
                ..
            } => Self::RetriesExhausted {
                attempts,
                status,
                cause: cause.to_string(),
                message: e.to_string(),
            },
        }
    }
}

/// The single error shape callers see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    /// Error category
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// HTTP status, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Offending input field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Last underlying cause, for exhausted retries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

/// Errors raised while assembling a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two tools share a name
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),
}
