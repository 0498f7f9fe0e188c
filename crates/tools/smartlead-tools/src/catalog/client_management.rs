//! Client (white-label sub-account) and client API key tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smartlead_async::{Endpoint, PRIMARY};

use super::inputs::ApiKeyIdInput;
use crate::error::ToolError;
use crate::registry::ToolRegistryBuilder;
use crate::tool::{Category, NoInput, Summary, ToolSpec};
use crate::validation::{Validate, email, non_empty};

/// Input for add_client_to_system and create_client tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddClientInput {
    /// Client name
    pub name: String,
    /// Client login e-mail
    pub email: String,
    /// Whether the client gets a white-labelled workspace
    #[serde(default)]
    pub is_whitelabel: bool,
    /// Free-form client settings passed through unchanged
    #[serde(default)]
    pub settings: Option<Value>,
}

impl Validate for AddClientInput {
    fn validate(&self) -> Result<(), ToolError> {
        non_empty("name", &self.name)?;
        email("email", &self.email)
    }
}

/// Input for create_client_api_key tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateClientApiKeyInput {
    /// Key name
    pub name: String,
    /// Permissions granted to the key
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl Validate for CreateClientApiKeyInput {
    fn validate(&self) -> Result<(), ToolError> {
        non_empty("name", &self.name)?;
        if let Some(perms) = &self.permissions {
            for p in perms {
                non_empty("permissions", p)?;
            }
        }
        Ok(())
    }
}

pub const ADD_CLIENT_TO_SYSTEM: ToolSpec = ToolSpec {
    name: "smartlead_add_client_to_system",
    title: "Client added",
    description: "Add a client to the system, optionally white-labelled.",
    category: Category::ClientManagement,
    endpoint: Endpoint::post(PRIMARY, "/client/save"),
    summary: Summary::Field {
        label: "Client ID",
        key: "id",
    },
};

pub const CREATE_CLIENT: ToolSpec = ToolSpec {
    name: "smartlead_create_client",
    title: "Client created",
    description: "Create a client.",
    category: Category::ClientManagement,
    endpoint: Endpoint::post(PRIMARY, "/client/save"),
    summary: Summary::Field {
        label: "Client ID",
        key: "id",
    },
};

pub const GET_ALL_CLIENTS: ToolSpec = ToolSpec {
    name: "smartlead_get_all_clients",
    title: "Clients",
    description: "List every client on the account.",
    category: Category::ClientManagement,
    endpoint: Endpoint::get(PRIMARY, "/client/"),
    summary: Summary::Count { noun: "clients" },
};

pub const CREATE_CLIENT_API_KEY: ToolSpec = ToolSpec {
    name: "smartlead_create_client_api_key",
    title: "Client API key created",
    description: "Create an API key for a client.",
    category: Category::ClientManagement,
    endpoint: Endpoint::post(PRIMARY, "/client/api-key"),
    summary: Summary::Field {
        label: "API key ID",
        key: "id",
    },
};

pub const GET_CLIENT_API_KEYS: ToolSpec = ToolSpec {
    name: "smartlead_get_client_api_keys",
    title: "Client API keys",
    description: "List the client API keys.",
    category: Category::ClientManagement,
    endpoint: Endpoint::get(PRIMARY, "/client/api-key"),
    summary: Summary::Count { noun: "API keys" },
};

pub const DELETE_CLIENT_API_KEY: ToolSpec = ToolSpec {
    name: "smartlead_delete_client_api_key",
    title: "Client API key deleted",
    description: "Delete a client API key.",
    category: Category::ClientManagement,
    endpoint: Endpoint::delete(PRIMARY, "/client/api-key/{api_key_id}"),
    summary: Summary::None,
};

pub const RESET_CLIENT_API_KEY: ToolSpec = ToolSpec {
    name: "smartlead_reset_client_api_key",
    title: "Client API key reset",
    description: "Rotate a client API key.",
    category: Category::ClientManagement,
    endpoint: Endpoint::put(PRIMARY, "/client/api-key/reset/{api_key_id}"),
    summary: Summary::None,
};

pub(super) fn register(b: ToolRegistryBuilder) -> ToolRegistryBuilder {
    b.endpoint::<AddClientInput>(ADD_CLIENT_TO_SYSTEM)
        .endpoint::<AddClientInput>(CREATE_CLIENT)
        .endpoint::<NoInput>(GET_ALL_CLIENTS)
        .endpoint::<CreateClientApiKeyInput>(CREATE_CLIENT_API_KEY)
        .endpoint::<NoInput>(GET_CLIENT_API_KEYS)
        .endpoint::<ApiKeyIdInput>(DELETE_CLIENT_API_KEY)
        .endpoint::<ApiKeyIdInput>(RESET_CLIENT_API_KEY)
}
