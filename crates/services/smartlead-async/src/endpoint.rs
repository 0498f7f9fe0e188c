use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::GatewayError;

/// Query parameters (GET/DELETE) or JSON body (POST/PUT) of a call.
///
/// Kept as an ordered JSON object so the gateway never interprets payload shape.
pub type Params = serde_json::Map<String, Value>;

/// HTTP method supported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Whether parameters travel as a JSON body rather than the query string
    #[must_use]
    pub const fn sends_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    /// Whether the method only reads upstream state
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::Get)
    }

    /// Upper-case method name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// Endpoint descriptor: which backend, which method, which path template.
///
/// Path templates use `{name}` placeholders that are filled from the
/// same-named parameter, which is then removed from the parameter bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Backend target name
    pub target: &'static str,
    /// HTTP method
    pub method: Method,
    /// Path template relative to the target base URL
    pub path: &'static str,
}

impl Endpoint {
    /// GET endpoint
    #[must_use]
    pub const fn get(target: &'static str, path: &'static str) -> Self {
        Self {
            target,
            method: Method::Get,
            path,
        }
    }

    /// POST endpoint
    #[must_use]
    pub const fn post(target: &'static str, path: &'static str) -> Self {
        Self {
            target,
            method: Method::Post,
            path,
        }
    }

    /// PUT endpoint
    #[must_use]
    pub const fn put(target: &'static str, path: &'static str) -> Self {
        Self {
            target,
            method: Method::Put,
            path,
        }
    }

    /// DELETE endpoint
    #[must_use]
    pub const fn delete(target: &'static str, path: &'static str) -> Self {
        Self {
            target,
            method: Method::Delete,
            path,
        }
    }

    /// Placeholder names in the path template, in order of appearance
    #[must_use]
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        let mut rest = self.path;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else { break };
            out.push(&after[..close]);
            rest = &after[close + 1..];
        }
        out
    }

    /// Fills the path template from `params`, consuming the placeholder entries.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequestRejected`] without a status when a
    /// placeholder is missing or its value is not a plain path segment.
    pub fn render(&self, params: &mut Params) -> Result<String, GatewayError> {
        let mut path = self.path.to_string();
        for name in self.placeholders() {
            let value = params.remove(name).ok_or_else(|| {
                GatewayError::malformed(self.target, format!("missing path parameter `{name}`"))
            })?;
            let segment = path_segment(&value).ok_or_else(|| {
                GatewayError::malformed(
                    self.target,
                    format!("path parameter `{name}` must be a number or a plain identifier"),
                )
            })?;
            path = path.replace(&format!("{{{name}}}"), &segment);
        }
        Ok(path)
    }
}

fn path_segment(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        // At least one alphanumeric, so `.` and `..` never reach the URL.
        Value::String(s)
            if s.chars().any(|c| c.is_ascii_alphanumeric())
                && s
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@')) =>
        {
            Some(s.clone())
        }
        _ => None,
    }
}

/// Flattens params into query pairs.
///
/// Nulls are dropped, arrays are comma-joined and nested objects are sent as compact JSON.
#[must_use]
pub fn query_pairs(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(k, v)| scalar_text(v).map(|text| (k.clone(), text)))
        .collect()
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(v.to_string()),
    }
}

/// Drops top-level null entries so optional inputs are never sent
#[must_use]
pub fn without_nulls(mut params: Params) -> Params {
    params.retain(|_, v| !v.is_null());
    params
}
