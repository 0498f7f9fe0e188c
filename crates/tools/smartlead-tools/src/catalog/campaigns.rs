//! Campaign tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smartlead_async::{Endpoint, PRIMARY};

use super::inputs::CampaignIdInput;
use crate::error::ToolError;
use crate::registry::ToolRegistryBuilder;
use crate::tool::{Category, Summary, ToolSpec};
use crate::validation::{Validate, date_range, non_empty, positive};

// ============================================================================
// Inputs
// ============================================================================

/// Input for list_campaigns tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListCampaignsInput {
    /// Only campaigns belonging to this client
    #[serde(default)]
    pub client_id: Option<u64>,
    /// Include campaign tags in the response
    #[serde(default)]
    pub include_tags: Option<bool>,
}

impl Validate for ListCampaignsInput {
    fn validate(&self) -> Result<(), ToolError> {
        self.client_id.map_or(Ok(()), |id| positive("client_id", id))
    }
}

/// Input for create_campaign tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateCampaignInput {
    /// Campaign name
    pub name: String,
    /// Client the campaign belongs to
    #[serde(default)]
    pub client_id: Option<u64>,
}

impl Validate for CreateCampaignInput {
    fn validate(&self) -> Result<(), ToolError> {
        non_empty("name", &self.name)?;
        self.client_id.map_or(Ok(()), |id| positive("client_id", id))
    }
}

/// Campaign run state accepted by the status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum CampaignStatus {
    /// Pause sending
    Paused,
    /// Stop the campaign for good
    Stopped,
    /// Start or resume sending
    Start,
}

/// Input for update_campaign_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateCampaignStatusInput {
    /// Campaign ID
    pub campaign_id: u64,
    /// New status
    pub status: CampaignStatus,
}

impl Validate for UpdateCampaignStatusInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("campaign_id", self.campaign_id)
    }
}

/// Input for get_campaign_analytics_by_date tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CampaignDateRangeInput {
    /// Campaign ID
    pub campaign_id: u64,
    /// Start date (YYYY-MM-DD)
    pub start_date: String,
    /// End date (YYYY-MM-DD)
    pub end_date: String,
}

impl Validate for CampaignDateRangeInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("campaign_id", self.campaign_id)?;
        date_range(Some(&self.start_date), Some(&self.end_date))
    }
}

/// Input for get_campaign_statistics tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CampaignStatisticsInput {
    /// Campaign ID
    pub campaign_id: u64,
    /// Number of records to skip
    #[serde(default)]
    pub offset: Option<u32>,
    /// Page size
    #[serde(default)]
    pub limit: Option<u32>,
    /// Filter by email status (e.g. opened, clicked, replied)
    #[serde(default)]
    pub email_status: Option<String>,
}

impl Validate for CampaignStatisticsInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("campaign_id", self.campaign_id)?;
        if let Some(status) = &self.email_status {
            non_empty("email_status", status)?;
        }
        Ok(())
    }
}

// ============================================================================
// Specs
// ============================================================================

pub const LIST_CAMPAIGNS: ToolSpec = ToolSpec {
    name: "smartlead_list_campaigns",
    title: "Campaigns",
    description: "List all campaigns, optionally filtered by client.",
    category: Category::Campaigns,
    endpoint: Endpoint::get(PRIMARY, "/campaigns"),
    summary: Summary::Count { noun: "campaigns" },
};

pub const GET_CAMPAIGN: ToolSpec = ToolSpec {
    name: "smartlead_get_campaign",
    title: "Campaign",
    description: "Get a campaign by ID.",
    category: Category::Campaigns,
    endpoint: Endpoint::get(PRIMARY, "/campaigns/{campaign_id}"),
    summary: Summary::Field {
        label: "Campaign",
        key: "name",
    },
};

pub const CREATE_CAMPAIGN: ToolSpec = ToolSpec {
    name: "smartlead_create_campaign",
    title: "Campaign created",
    description: "Create a new campaign.",
    category: Category::Campaigns,
    endpoint: Endpoint::post(PRIMARY, "/campaigns/create"),
    summary: Summary::Field {
        label: "Campaign ID",
        key: "id",
    },
};

pub const UPDATE_CAMPAIGN_STATUS: ToolSpec = ToolSpec {
    name: "smartlead_update_campaign_status",
    title: "Campaign status updated",
    description: "Pause, stop or start a campaign.",
    category: Category::Campaigns,
    endpoint: Endpoint::post(PRIMARY, "/campaigns/{campaign_id}/status"),
    summary: Summary::None,
};

pub const GET_CAMPAIGN_SEQUENCE: ToolSpec = ToolSpec {
    name: "smartlead_get_campaign_sequence",
    title: "Campaign sequence",
    description: "Get the email sequence steps of a campaign.",
    category: Category::Campaigns,
    endpoint: Endpoint::get(PRIMARY, "/campaigns/{campaign_id}/sequences"),
    summary: Summary::Count { noun: "sequence steps" },
};

pub const DELETE_CAMPAIGN: ToolSpec = ToolSpec {
    name: "smartlead_delete_campaign",
    title: "Campaign deleted",
    description: "Delete a campaign permanently.",
    category: Category::Campaigns,
    endpoint: Endpoint::delete(PRIMARY, "/campaigns/{campaign_id}"),
    summary: Summary::None,
};

pub const GET_CAMPAIGN_ANALYTICS: ToolSpec = ToolSpec {
    name: "smartlead_get_campaign_analytics",
    title: "Campaign analytics",
    description: "Get top-level analytics of a campaign.",
    category: Category::Campaigns,
    endpoint: Endpoint::get(PRIMARY, "/campaigns/{campaign_id}/analytics"),
    summary: Summary::None,
};

pub const GET_CAMPAIGN_STATISTICS: ToolSpec = ToolSpec {
    name: "smartlead_get_campaign_statistics",
    title: "Campaign statistics",
    description: "Get per-lead email statistics of a campaign.",
    category: Category::Campaigns,
    endpoint: Endpoint::get(PRIMARY, "/campaigns/{campaign_id}/statistics"),
    summary: Summary::Count { noun: "records" },
};

pub const GET_CAMPAIGN_ANALYTICS_BY_DATE: ToolSpec = ToolSpec {
    name: "smartlead_get_campaign_analytics_by_date",
    title: "Campaign analytics by date",
    description: "Get campaign analytics for a date range.",
    category: Category::Campaigns,
    endpoint: Endpoint::get(PRIMARY, "/campaigns/{campaign_id}/analytics-by-date"),
    summary: Summary::None,
};

pub(super) fn register(b: ToolRegistryBuilder) -> ToolRegistryBuilder {
    b.endpoint::<ListCampaignsInput>(LIST_CAMPAIGNS)
        .endpoint::<CampaignIdInput>(GET_CAMPAIGN)
        .endpoint::<CreateCampaignInput>(CREATE_CAMPAIGN)
        .endpoint::<UpdateCampaignStatusInput>(UPDATE_CAMPAIGN_STATUS)
        .endpoint::<CampaignIdInput>(GET_CAMPAIGN_SEQUENCE)
        .endpoint::<CampaignIdInput>(DELETE_CAMPAIGN)
        .endpoint::<CampaignIdInput>(GET_CAMPAIGN_ANALYTICS)
        .endpoint::<CampaignStatisticsInput>(GET_CAMPAIGN_STATISTICS)
        .endpoint::<CampaignDateRangeInput>(GET_CAMPAIGN_ANALYTICS_BY_DATE)
}
