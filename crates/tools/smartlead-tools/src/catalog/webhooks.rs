//! Campaign webhook tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smartlead_async::{Endpoint, PRIMARY};

use super::inputs::CampaignIdInput;
use crate::error::ToolError;
use crate::registry::ToolRegistryBuilder;
use crate::tool::{Category, Summary, ToolSpec};
use crate::validation::{Validate, http_url, non_empty, positive};

/// Input for upsert_campaign_webhook tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpsertWebhookInput {
    /// Campaign ID
    pub campaign_id: u64,
    /// Webhook ID to update; omit to create
    #[serde(default)]
    pub id: Option<u64>,
    /// Webhook name
    pub name: String,
    /// Delivery URL
    pub webhook_url: String,
    /// Event types, e.g. EMAIL_SENT, EMAIL_REPLY, LEAD_UNSUBSCRIBED
    pub event_types: Vec<String>,
    /// Lead categories that trigger the webhook
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl Validate for UpsertWebhookInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("campaign_id", self.campaign_id)?;
        non_empty("name", &self.name)?;
        http_url("webhook_url", &self.webhook_url)?;
        if self.event_types.is_empty() {
            return Err(ToolError::invalid("event_types", "must list at least one event"));
        }
        Ok(())
    }
}

/// Input for delete_campaign_webhook tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeleteWebhookInput {
    /// Campaign ID
    pub campaign_id: u64,
    /// Webhook ID
    pub id: u64,
}

impl Validate for DeleteWebhookInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("campaign_id", self.campaign_id)?;
        positive("id", self.id)
    }
}

pub const GET_CAMPAIGN_WEBHOOKS: ToolSpec = ToolSpec {
    name: "smartlead_get_campaign_webhooks",
    title: "Campaign webhooks",
    description: "List the webhooks of a campaign.",
    category: Category::Webhooks,
    endpoint: Endpoint::get(PRIMARY, "/campaigns/{campaign_id}/webhooks"),
    summary: Summary::Count { noun: "webhooks" },
};

pub const UPSERT_CAMPAIGN_WEBHOOK: ToolSpec = ToolSpec {
    name: "smartlead_upsert_campaign_webhook",
    title: "Webhook saved",
    description: "Create or update a campaign webhook.",
    category: Category::Webhooks,
    endpoint: Endpoint::post(PRIMARY, "/campaigns/{campaign_id}/webhooks"),
    summary: Summary::Field {
        label: "Webhook ID",
        key: "id",
    },
};

pub const DELETE_CAMPAIGN_WEBHOOK: ToolSpec = ToolSpec {
    name: "smartlead_delete_campaign_webhook",
    title: "Webhook deleted",
    description: "Delete a campaign webhook.",
    category: Category::Webhooks,
    endpoint: Endpoint::delete(PRIMARY, "/campaigns/{campaign_id}/webhooks"),
    summary: Summary::None,
};

pub(super) fn register(b: ToolRegistryBuilder) -> ToolRegistryBuilder {
    b.endpoint::<CampaignIdInput>(GET_CAMPAIGN_WEBHOOKS)
        .endpoint::<UpsertWebhookInput>(UPSERT_CAMPAIGN_WEBHOOK)
        .endpoint::<DeleteWebhookInput>(DELETE_CAMPAIGN_WEBHOOK)
}
