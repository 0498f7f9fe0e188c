//! Input types shared by several tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::validation::{Validate, positive};

/// Input for tools addressing one campaign.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CampaignIdInput {
    /// Campaign ID
    pub campaign_id: u64,
}

impl Validate for CampaignIdInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("campaign_id", self.campaign_id)
    }
}

/// Input for tools addressing one lead inside a campaign.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CampaignLeadInput {
    /// Campaign ID
    pub campaign_id: u64,
    /// Lead ID
    pub lead_id: u64,
}

impl Validate for CampaignLeadInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("campaign_id", self.campaign_id)?;
        positive("lead_id", self.lead_id)
    }
}

/// Input for tools addressing one email account.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EmailAccountIdInput {
    /// Email account ID
    pub email_account_id: u64,
}

impl Validate for EmailAccountIdInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("email_account_id", self.email_account_id)
    }
}

/// Input for tools addressing one client API key.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApiKeyIdInput {
    /// API key ID
    pub api_key_id: u64,
}

impl Validate for ApiKeyIdInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("api_key_id", self.api_key_id)
    }
}

/// Input for tools addressing one placement test.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TestIdInput {
    /// Spam/placement test ID
    pub test_id: u64,
}

impl Validate for TestIdInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("test_id", self.test_id)
    }
}

/// Input for tools addressing one test folder.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FolderIdInput {
    /// Folder ID
    pub folder_id: u64,
}

impl Validate for FolderIdInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("folder_id", self.folder_id)
    }
}

/// Offset/limit paging.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Paging {
    /// Number of records to skip
    #[serde(default)]
    pub offset: Option<u32>,
    /// Page size (upstream maximum 100)
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Validate for Paging {
    fn validate(&self) -> Result<(), ToolError> {
        match self.limit {
            Some(0) => Err(ToolError::invalid("limit", "must be at least 1")),
            Some(n) if n > 100 => Err(ToolError::invalid("limit", "must be at most 100")),
            _ => Ok(()),
        }
    }
}
