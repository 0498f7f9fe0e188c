//! Tool trait and the endpoint-backed implementation every catalog entry uses.

use futures::future::BoxFuture;
use schemars::{JsonSchema, Schema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smartlead_async::endpoint::without_nulls;
use smartlead_async::{Endpoint, Gateway, Params};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::ToolError;
use crate::validation::Validate;

/// Tool family, in the order tools are listed and verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Campaign management
    Campaigns,
    /// Lead management
    Leads,
    /// Sending mailboxes
    EmailAccounts,
    /// Campaign webhooks
    Webhooks,
    /// Clients and client API keys
    ClientManagement,
    /// Reporting
    Analytics,
    /// Deliverability tests (Smart Delivery API)
    SmartDelivery,
}

impl Category {
    /// Every category, in listing order
    pub const ALL: [Self; 7] = [
        Self::Campaigns,
        Self::Leads,
        Self::EmailAccounts,
        Self::Webhooks,
        Self::ClientManagement,
        Self::Analytics,
        Self::SmartDelivery,
    ];

    /// Stable `snake_case` name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Campaigns => "campaigns",
            Self::Leads => "leads",
            Self::EmailAccounts => "email_accounts",
            Self::Webhooks => "webhooks",
            Self::ClientManagement => "client_management",
            Self::Analytics => "analytics",
            Self::SmartDelivery => "smart_delivery",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a successful payload is summarized in one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Summary {
    /// No summary line
    None,
    /// `Found N <noun>` for an array payload, or a `data`/`results` array inside an object
    Count {
        /// Plural noun
        noun: &'static str,
    },
    /// `<label>: <value or N/A>` from a top-level field
    Field {
        /// Label shown before the value
        label: &'static str,
        /// Top-level key to read
        key: &'static str,
    },
}

impl Summary {
    /// Renders the summary line for a payload
    #[must_use]
    pub fn render(&self, payload: &Value) -> Option<String> {
        match *self {
            Self::None => None,
            Self::Count { noun } => {
                let n = match payload {
                    Value::Array(items) => items.len(),
                    Value::Object(obj) => ["data", "results"]
                        .iter()
                        .find_map(|k| obj.get(*k).and_then(Value::as_array))
                        .map_or(0, Vec::len),
                    _ => 0,
                };
                Some(format!("Found {n} {noun}"))
            }
            Self::Field { label, key } => {
                let value = match payload.get(key) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Null) | None => "N/A".to_string(),
                    Some(other) => other.to_string(),
                };
                Some(format!("{label}: {value}"))
            }
        }
    }
}

/// Static description of one tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    /// Unique tool name, always prefixed `smartlead_`
    pub name: &'static str,
    /// Short title used as the first line of a success response
    pub title: &'static str,
    /// What the tool does
    pub description: &'static str,
    /// Tool family
    pub category: Category,
    /// Endpoint the tool calls
    pub endpoint: Endpoint,
    /// Summary line style
    pub summary: Summary,
}

/// Any type usable as a tool's input
pub trait ToolInput: DeserializeOwned + Serialize + JsonSchema + Validate + Send + 'static {}

impl<T> ToolInput for T where
    T: DeserializeOwned + Serialize + JsonSchema + Validate + Send + 'static
{
}

/// Input for tools that take no arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NoInput {}

impl Validate for NoInput {}

/// Type-erased tool for dynamic dispatch.
pub trait Tool: Send + Sync {
    /// Static description
    fn spec(&self) -> &ToolSpec;

    /// Get the input JSON schema.
    fn input_schema(&self) -> Schema;

    /// Call the tool with JSON arguments.
    fn call_json(&self, args: Value) -> BoxFuture<'static, Result<Value, ToolError>>;
}

/// A tool that validates `I` and forwards it to one gateway endpoint.
pub struct EndpointTool<I> {
    spec: ToolSpec,
    gateway: Arc<Gateway>,
    _input: PhantomData<fn() -> I>,
}

impl<I: ToolInput> EndpointTool<I> {
    /// Binds a spec to a gateway
    #[must_use]
    pub const fn new(spec: ToolSpec, gateway: Arc<Gateway>) -> Self {
        Self {
            spec,
            gateway,
            _input: PhantomData,
        }
    }
}

impl<I: ToolInput> Tool for EndpointTool<I> {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn input_schema(&self) -> Schema {
        schemars::schema_for!(I)
    }

    fn call_json(&self, args: Value) -> BoxFuture<'static, Result<Value, ToolError>> {
        let params = match prepare::<I>(args) {
            Ok(p) => p,
            Err(e) => return Box::pin(async move { Err(e) }),
        };
        let gateway = Arc::clone(&self.gateway);
        let endpoint = self.spec.endpoint;
        Box::pin(async move {
            gateway
                .call_endpoint(&endpoint, params)
                .await
                .map_err(ToolError::from)
        })
    }
}

/// Decodes, validates and flattens tool arguments into request parameters.
///
/// # Errors
///
/// Returns [`ToolError::Validation`] naming the offending field path.
pub fn prepare<I: ToolInput>(args: Value) -> Result<Params, ToolError> {
    let args = if args.is_null() {
        Value::Object(Params::new())
    } else {
        args
    };
    let input: I = serde_path_to_error::deserialize(args).map_err(|e| {
        let path = e.path().to_string();
        let message = e.into_inner().to_string();
        let field = if path == "." {
            missing_field(&message)
        } else {
            Some(path)
        };
        ToolError::Validation { field, message }
    })?;
    input.validate()?;
    match serde_json::to_value(&input) {
        Ok(Value::Object(map)) => Ok(without_nulls(map)),
        Ok(_) => Ok(Params::new()),
        Err(e) => Err(ToolError::Validation {
            field: None,
            message: e.to_string(),
        }),
    }
}

// serde reports a missing field at the parent path; recover the name from the message.
fn missing_field(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split_once('`').map(|(name, _)| name.to_string())
}
