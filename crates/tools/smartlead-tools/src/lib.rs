//! SmartLead tools: every REST endpoint of the primary and Smart Delivery
//! APIs exposed as a named, schema-validated tool call over a shared
//! [`smartlead_async::Gateway`].
//!
//! ```ignore
//! let gateway = Arc::new(Gateway::new(GatewayConfig::from_env()?)?);
//! let registry = smartlead_tools::build_registry(gateway)?;
//! let response = registry
//!     .dispatch("smartlead_get_campaign", json!({"campaign_id": 42}))
//!     .await;
//! ```

pub mod catalog;
pub mod error;
pub mod fmt;
pub mod registry;
pub mod tool;
pub mod validation;
pub mod verify;

pub use catalog::build_registry;
pub use error::{NormalizedError, RegistryError, ToolError};
pub use fmt::{Content, ToolResponse};
pub use registry::{ToolDescriptor, ToolRegistry, ToolRegistryBuilder};
pub use tool::{Category, EndpointTool, NoInput, Summary, Tool, ToolInput, ToolSpec};
pub use validation::Validate;
pub use verify::{VerificationReport, Verifier};
