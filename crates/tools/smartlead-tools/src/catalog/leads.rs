//! Lead tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smartlead_async::{Endpoint, PRIMARY};

use super::inputs::{CampaignLeadInput, Paging};
use crate::error::ToolError;
use crate::registry::ToolRegistryBuilder;
use crate::tool::{Category, NoInput, Summary, ToolSpec};
use crate::validation::{Validate, email, positive};

/// Input for list_leads_by_campaign tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListLeadsInput {
    /// Campaign ID
    pub campaign_id: u64,
    #[serde(flatten)]
    pub paging: Paging,
}

impl Validate for ListLeadsInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("campaign_id", self.campaign_id)?;
        self.paging.validate()
    }
}

/// Input for get_lead_by_email tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LeadByEmailInput {
    /// Lead e-mail address
    pub email: String,
}

impl Validate for LeadByEmailInput {
    fn validate(&self) -> Result<(), ToolError> {
        email("email", &self.email)
    }
}

/// Input for unsubscribe_lead_globally tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LeadIdInput {
    /// Lead ID
    pub lead_id: u64,
}

impl Validate for LeadIdInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("lead_id", self.lead_id)
    }
}

/// Input for resume_lead tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResumeLeadInput {
    /// Campaign ID
    pub campaign_id: u64,
    /// Lead ID
    pub lead_id: u64,
    /// Delay before the next sequence step, in days
    #[serde(default)]
    pub resume_lead_with_delay_days: Option<u32>,
}

impl Validate for ResumeLeadInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("campaign_id", self.campaign_id)?;
        positive("lead_id", self.lead_id)
    }
}

pub const LIST_LEADS_BY_CAMPAIGN: ToolSpec = ToolSpec {
    name: "smartlead_list_leads_by_campaign",
    title: "Campaign leads",
    description: "List the leads of a campaign, with paging.",
    category: Category::Leads,
    endpoint: Endpoint::get(PRIMARY, "/campaigns/{campaign_id}/leads"),
    summary: Summary::Count { noun: "leads" },
};

pub const GET_LEAD_BY_EMAIL: ToolSpec = ToolSpec {
    name: "smartlead_get_lead_by_email",
    title: "Lead",
    description: "Look up a lead by e-mail address.",
    category: Category::Leads,
    endpoint: Endpoint::get(PRIMARY, "/leads/"),
    summary: Summary::Field {
        label: "Lead ID",
        key: "id",
    },
};

pub const FETCH_LEAD_CATEGORIES: ToolSpec = ToolSpec {
    name: "smartlead_fetch_lead_categories",
    title: "Lead categories",
    description: "List the lead categories defined on the account.",
    category: Category::Leads,
    endpoint: Endpoint::get(PRIMARY, "/leads/fetch-categories"),
    summary: Summary::Count { noun: "categories" },
};

pub const PAUSE_LEAD: ToolSpec = ToolSpec {
    name: "smartlead_pause_lead",
    title: "Lead paused",
    description: "Pause a lead in a campaign.",
    category: Category::Leads,
    endpoint: Endpoint::post(PRIMARY, "/campaigns/{campaign_id}/leads/{lead_id}/pause"),
    summary: Summary::None,
};

pub const RESUME_LEAD: ToolSpec = ToolSpec {
    name: "smartlead_resume_lead",
    title: "Lead resumed",
    description: "Resume a paused lead in a campaign.",
    category: Category::Leads,
    endpoint: Endpoint::post(PRIMARY, "/campaigns/{campaign_id}/leads/{lead_id}/resume"),
    summary: Summary::None,
};

pub const DELETE_LEAD_FROM_CAMPAIGN: ToolSpec = ToolSpec {
    name: "smartlead_delete_lead_from_campaign",
    title: "Lead deleted",
    description: "Remove a lead from a campaign.",
    category: Category::Leads,
    endpoint: Endpoint::delete(PRIMARY, "/campaigns/{campaign_id}/leads/{lead_id}"),
    summary: Summary::None,
};

pub const UNSUBSCRIBE_LEAD_GLOBALLY: ToolSpec = ToolSpec {
    name: "smartlead_unsubscribe_lead_globally",
    title: "Lead unsubscribed",
    description: "Unsubscribe a lead from every campaign.",
    category: Category::Leads,
    endpoint: Endpoint::post(PRIMARY, "/leads/{lead_id}/unsubscribe"),
    summary: Summary::None,
};

pub const GET_LEAD_MESSAGE_HISTORY: ToolSpec = ToolSpec {
    name: "smartlead_get_lead_message_history",
    title: "Lead message history",
    description: "Get the messages exchanged with a lead in a campaign.",
    category: Category::Leads,
    endpoint: Endpoint::get(
        PRIMARY,
        "/campaigns/{campaign_id}/leads/{lead_id}/message-history",
    ),
    summary: Summary::Count { noun: "messages" },
};

pub(super) fn register(b: ToolRegistryBuilder) -> ToolRegistryBuilder {
    b.endpoint::<ListLeadsInput>(LIST_LEADS_BY_CAMPAIGN)
        .endpoint::<LeadByEmailInput>(GET_LEAD_BY_EMAIL)
        .endpoint::<NoInput>(FETCH_LEAD_CATEGORIES)
        .endpoint::<CampaignLeadInput>(PAUSE_LEAD)
        .endpoint::<ResumeLeadInput>(RESUME_LEAD)
        .endpoint::<CampaignLeadInput>(DELETE_LEAD_FROM_CAMPAIGN)
        .endpoint::<LeadIdInput>(UNSUBSCRIBE_LEAD_GLOBALLY)
        .endpoint::<CampaignLeadInput>(GET_LEAD_MESSAGE_HISTORY)
}
