//! Email account tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smartlead_async::{Endpoint, PRIMARY};

use super::inputs::{CampaignIdInput, EmailAccountIdInput, Paging};
use crate::error::ToolError;
use crate::registry::ToolRegistryBuilder;
use crate::tool::{Category, NoInput, Summary, ToolSpec};
use crate::validation::Validate;

/// Input for list_email_accounts tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListEmailAccountsInput {
    #[serde(flatten)]
    pub paging: Paging,
}

impl Validate for ListEmailAccountsInput {
    fn validate(&self) -> Result<(), ToolError> {
        self.paging.validate()
    }
}

pub const LIST_EMAIL_ACCOUNTS: ToolSpec = ToolSpec {
    name: "smartlead_list_email_accounts",
    title: "Email accounts",
    description: "List the sending email accounts on the account.",
    category: Category::EmailAccounts,
    endpoint: Endpoint::get(PRIMARY, "/email-accounts/"),
    summary: Summary::Count {
        noun: "email accounts",
    },
};

pub const GET_EMAIL_ACCOUNT: ToolSpec = ToolSpec {
    name: "smartlead_get_email_account",
    title: "Email account",
    description: "Get an email account by ID.",
    category: Category::EmailAccounts,
    endpoint: Endpoint::get(PRIMARY, "/email-accounts/{email_account_id}"),
    summary: Summary::Field {
        label: "From",
        key: "from_email",
    },
};

pub const LIST_CAMPAIGN_EMAIL_ACCOUNTS: ToolSpec = ToolSpec {
    name: "smartlead_list_campaign_email_accounts",
    title: "Campaign email accounts",
    description: "List the email accounts sending for a campaign.",
    category: Category::EmailAccounts,
    endpoint: Endpoint::get(PRIMARY, "/campaigns/{campaign_id}/email-accounts"),
    summary: Summary::Count {
        noun: "email accounts",
    },
};

pub const GET_WARMUP_STATS: ToolSpec = ToolSpec {
    name: "smartlead_get_warmup_stats",
    title: "Warmup stats",
    description: "Get the last seven days of warmup statistics of an email account.",
    category: Category::EmailAccounts,
    endpoint: Endpoint::get(PRIMARY, "/email-accounts/{email_account_id}/warmup-stats"),
    summary: Summary::None,
};

pub const RECONNECT_FAILED_EMAIL_ACCOUNTS: ToolSpec = ToolSpec {
    name: "smartlead_reconnect_failed_email_accounts",
    title: "Reconnect requested",
    description: "Queue a reconnect of every email account whose connection failed.",
    category: Category::EmailAccounts,
    endpoint: Endpoint::post(PRIMARY, "/email-accounts/reconnect-failed-email-accounts"),
    summary: Summary::None,
};

pub(super) fn register(b: ToolRegistryBuilder) -> ToolRegistryBuilder {
    b.endpoint::<ListEmailAccountsInput>(LIST_EMAIL_ACCOUNTS)
        .endpoint::<EmailAccountIdInput>(GET_EMAIL_ACCOUNT)
        .endpoint::<CampaignIdInput>(LIST_CAMPAIGN_EMAIL_ACCOUNTS)
        .endpoint::<EmailAccountIdInput>(GET_WARMUP_STATS)
        .endpoint::<NoInput>(RECONNECT_FAILED_EMAIL_ACCOUNTS)
}
