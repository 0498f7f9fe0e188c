//! The SmartLead tool catalog.

pub mod analytics;
pub mod campaigns;
pub mod client_management;
pub mod email_accounts;
pub mod inputs;
pub mod leads;
pub mod smart_delivery;
pub mod webhooks;

use smartlead_async::Gateway;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::registry::ToolRegistry;

/// Build the registry with every SmartLead tool bound to `gateway`.
pub fn build_registry(gateway: Arc<Gateway>) -> Result<ToolRegistry, RegistryError> {
    let b = ToolRegistry::builder(gateway);
    let b = campaigns::register(b);
    let b = leads::register(b);
    let b = email_accounts::register(b);
    let b = webhooks::register(b);
    let b = client_management::register(b);
    let b = analytics::register(b);
    let b = smart_delivery::register(b);
    b.finish()
}
