//! Smart Delivery tools: inbox placement tests, their reports and folders.
//!
//! Every tool here routes to the `smart_delivery` backend target.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smartlead_async::{Endpoint, SMART_DELIVERY};

use super::inputs::{FolderIdInput, TestIdInput};
use crate::error::ToolError;
use crate::registry::ToolRegistryBuilder;
use crate::tool::{Category, NoInput, Summary, ToolSpec};
use crate::validation::{Validate, date, non_empty, positive};

// ============================================================================
// Inputs
// ============================================================================

/// Settings shared by manual and automated placement tests.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlacementTestCommon {
    /// Test name
    pub test_name: String,
    /// Test description
    #[serde(default)]
    pub description: Option<String>,
    /// Spam filters to run (e.g. spam_assassin)
    #[serde(default)]
    pub spam_filters: Vec<String>,
    /// Check links in the email body
    #[serde(default)]
    pub link_checker: bool,
    /// Campaign whose sequence is sent
    pub campaign_id: u64,
    /// Sequence step to send
    pub sequence_mapping_id: u64,
    /// Seed provider IDs (see get_region_wise_provider_ids)
    pub provider_ids: Vec<u64>,
    /// Sender mailboxes
    pub sender_accounts: Vec<String>,
    /// Send every email at once instead of spacing them
    #[serde(default)]
    pub all_email_sent_without_time_gap: bool,
    /// Gap between emails
    #[serde(default)]
    pub min_time_btwn_emails: Option<u32>,
    /// Unit of the gap: minutes, hours or days
    #[serde(default)]
    pub min_time_unit: Option<String>,
    /// Use warmup-enabled mailboxes
    #[serde(default)]
    pub is_warmup: bool,
    /// Folder to file the test under
    #[serde(default)]
    pub folder_id: Option<u64>,
}

impl Validate for PlacementTestCommon {
    fn validate(&self) -> Result<(), ToolError> {
        non_empty("test_name", &self.test_name)?;
        positive("campaign_id", self.campaign_id)?;
        positive("sequence_mapping_id", self.sequence_mapping_id)?;
        if self.provider_ids.is_empty() {
            return Err(ToolError::invalid("provider_ids", "must list at least one provider"));
        }
        if self.sender_accounts.is_empty() {
            return Err(ToolError::invalid(
                "sender_accounts",
                "must list at least one sender account",
            ));
        }
        if let Some(unit) = &self.min_time_unit
            && !matches!(unit.as_str(), "minutes" | "hours" | "days")
        {
            return Err(ToolError::invalid(
                "min_time_unit",
                "must be one of minutes, hours, days",
            ));
        }
        Ok(())
    }
}

/// Input for create_manual_placement_test tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ManualPlacementTestInput {
    #[serde(flatten)]
    pub test: PlacementTestCommon,
}

impl Validate for ManualPlacementTestInput {
    fn validate(&self) -> Result<(), ToolError> {
        self.test.validate()
    }
}

/// Input for create_automated_placement_test tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AutomatedPlacementTestInput {
    #[serde(flatten)]
    pub test: PlacementTestCommon,
    /// First run (ISO 8601 timestamp)
    pub schedule_start_time: String,
    /// Last day the test runs (YYYY-MM-DD)
    pub test_end_date: String,
    /// Run every N days
    pub every_days: u32,
    /// IANA timezone of the schedule
    pub tz: String,
    /// Days of week to run on (1 = Monday .. 7 = Sunday)
    pub days: Vec<u8>,
}

impl Validate for AutomatedPlacementTestInput {
    fn validate(&self) -> Result<(), ToolError> {
        self.test.validate()?;
        non_empty("schedule_start_time", &self.schedule_start_time)?;
        date("test_end_date", &self.test_end_date)?;
        positive("every_days", u64::from(self.every_days))?;
        non_empty("tz", &self.tz)?;
        if self.days.is_empty() || self.days.iter().any(|d| !(1..=7).contains(d)) {
            return Err(ToolError::invalid("days", "must list weekdays between 1 and 7"));
        }
        Ok(())
    }
}

/// Input for delete_tests_in_bulk tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BulkDeleteInput {
    /// Test IDs to delete
    pub test_ids: Vec<u64>,
}

impl Validate for BulkDeleteInput {
    fn validate(&self) -> Result<(), ToolError> {
        if self.test_ids.is_empty() {
            return Err(ToolError::invalid("test_ids", "must list at least one test"));
        }
        if self.test_ids.contains(&0) {
            return Err(ToolError::invalid("test_ids", "ids must be positive integers"));
        }
        Ok(())
    }
}

/// Test kind filter for list_all_tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    /// One-off tests
    Manual,
    /// Scheduled tests
    Auto,
}

/// Input for list_all_tests tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListTestsInput {
    /// Which tests to list
    pub test_type: TestType,
    /// Number of records to skip
    #[serde(default)]
    pub offset: Option<u32>,
    /// Page size
    #[serde(default)]
    pub limit: Option<u32>,
    /// Extra report filters passed through unchanged
    #[serde(default)]
    pub filters: Option<Value>,
}

impl Validate for ListTestsInput {}

/// Input for provider-wise and geo-wise reports.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TestReportInput {
    /// Spam test ID
    pub spam_test_id: u64,
    /// Extra report filters passed through unchanged
    #[serde(default)]
    pub filters: Option<Value>,
}

impl Validate for TestReportInput {
    fn validate(&self) -> Result<(), ToolError> {
        positive("spam_test_id", self.spam_test_id)
    }
}

/// Input for create_folder tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateFolderInput {
    /// Folder name
    pub name: String,
}

impl Validate for CreateFolderInput {
    fn validate(&self) -> Result<(), ToolError> {
        non_empty("name", &self.name)
    }
}

// ============================================================================
// Specs
// ============================================================================

const fn sd(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    endpoint: Endpoint,
) -> ToolSpec {
    ToolSpec {
        name,
        title,
        description,
        category: Category::SmartDelivery,
        endpoint,
        summary: Summary::None,
    }
}

const fn report(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    path: &'static str,
) -> ToolSpec {
    sd(name, title, description, Endpoint::get(SMART_DELIVERY, path))
}

pub const GET_REGION_WISE_PROVIDER_IDS: ToolSpec = sd(
    "smartlead_get_region_wise_provider_ids",
    "Seed providers",
    "List seed mailbox providers by region, for placement tests.",
    Endpoint::get(SMART_DELIVERY, "/spam-test/seed/providers"),
);

pub const CREATE_MANUAL_PLACEMENT_TEST: ToolSpec = ToolSpec {
    summary: Summary::Field {
        label: "Test ID",
        key: "id",
    },
    ..sd(
        "smartlead_create_manual_placement_test",
        "Manual placement test created",
        "Create a one-off inbox placement test.",
        Endpoint::post(SMART_DELIVERY, "/spam-test/manual"),
    )
};

pub const CREATE_AUTOMATED_PLACEMENT_TEST: ToolSpec = ToolSpec {
    summary: Summary::Field {
        label: "Test ID",
        key: "id",
    },
    ..sd(
        "smartlead_create_automated_placement_test",
        "Automated placement test created",
        "Create a scheduled inbox placement test.",
        Endpoint::post(SMART_DELIVERY, "/spam-test/automated"),
    )
};

pub const GET_SPAM_TEST_DETAILS: ToolSpec = report(
    "smartlead_get_spam_test_details",
    "Spam test",
    "Get a placement test by ID.",
    "/spam-test/{test_id}",
);

pub const DELETE_TESTS_IN_BULK: ToolSpec = sd(
    "smartlead_delete_tests_in_bulk",
    "Tests deleted",
    "Delete several placement tests at once.",
    Endpoint::post(SMART_DELIVERY, "/spam-test/bulk-delete"),
);

pub const STOP_AUTOMATED_TEST: ToolSpec = sd(
    "smartlead_stop_automated_test",
    "Automated test stopped",
    "Stop a scheduled placement test.",
    Endpoint::put(SMART_DELIVERY, "/spam-test/{test_id}/stop"),
);

pub const LIST_ALL_TESTS: ToolSpec = ToolSpec {
    summary: Summary::Count { noun: "tests" },
    ..sd(
        "smartlead_list_all_tests",
        "Placement tests",
        "List manual or automated placement tests.",
        Endpoint::post(SMART_DELIVERY, "/spam-test/report"),
    )
};

pub const GET_PROVIDER_WISE_REPORT: ToolSpec = sd(
    "smartlead_get_provider_wise_report",
    "Provider-wise report",
    "Placement results grouped by mailbox provider.",
    Endpoint::post(SMART_DELIVERY, "/spam-test/provider-wise-results"),
);

pub const GET_GEO_WISE_REPORT: ToolSpec = sd(
    "smartlead_get_geo_wise_report",
    "Geo-wise report",
    "Placement results grouped by region.",
    Endpoint::post(SMART_DELIVERY, "/spam-test/geo-wise-report"),
);

pub const GET_SENDER_ACCOUNT_WISE_REPORT: ToolSpec = report(
    "smartlead_get_sender_account_wise_report",
    "Sender account report",
    "Placement results grouped by sender account.",
    "/spam-test/sender-account-wise-report",
);

/// Per-test reports, all `GET /spam-test/{test_id}/...`
pub const TEST_REPORTS: [ToolSpec; 14] = [
    report(
        "smartlead_get_spam_filter_report",
        "Spam filter report",
        "Spam filter verdicts of a test.",
        "/spam-test/{test_id}/spam-filter-report",
    ),
    report(
        "smartlead_get_dkim_details",
        "DKIM details",
        "DKIM check results of a test.",
        "/spam-test/{test_id}/dkim-details",
    ),
    report(
        "smartlead_get_spf_details",
        "SPF details",
        "SPF check results of a test.",
        "/spam-test/{test_id}/spf-details",
    ),
    report(
        "smartlead_get_rdns_report",
        "rDNS report",
        "Reverse DNS check results of a test.",
        "/spam-test/{test_id}/rdns-report",
    ),
    report(
        "smartlead_get_sender_account_list",
        "Sender accounts",
        "Sender accounts used by a test.",
        "/spam-test/{test_id}/sender-account-list",
    ),
    report(
        "smartlead_get_blacklists",
        "Blacklists",
        "Blacklist hits of a test.",
        "/spam-test/{test_id}/blacklists",
    ),
    report(
        "smartlead_get_domain_blacklist",
        "Domain blacklist",
        "Domain blacklist hits of a test.",
        "/spam-test/{test_id}/domain-blacklist",
    ),
    report(
        "smartlead_get_spam_test_email_content",
        "Email content",
        "Email content sent by a test.",
        "/spam-test/{test_id}/email-content",
    ),
    report(
        "smartlead_get_ip_blacklist_count",
        "IP blacklist count",
        "Number of IP blacklist hits of a test.",
        "/spam-test/{test_id}/ip-blacklist-count",
    ),
    report(
        "smartlead_get_email_reply_headers",
        "Email headers",
        "Headers of the emails received by seed mailboxes.",
        "/spam-test/{test_id}/email-headers",
    ),
    report(
        "smartlead_get_schedule_history",
        "Schedule history",
        "Run history of an automated test.",
        "/spam-test/{test_id}/schedule-history",
    ),
    report(
        "smartlead_get_ip_details",
        "IP details",
        "Sending IP details of a test.",
        "/spam-test/{test_id}/ip-details",
    ),
    report(
        "smartlead_get_mailbox_summary",
        "Mailbox summary",
        "Per-mailbox placement summary of a test.",
        "/spam-test/{test_id}/mailbox-summary",
    ),
    report(
        "smartlead_get_mailbox_count",
        "Mailbox count",
        "Number of mailboxes used by a test.",
        "/spam-test/{test_id}/mailbox-count",
    ),
];

pub const GET_ALL_FOLDERS: ToolSpec = ToolSpec {
    summary: Summary::Count { noun: "folders" },
    ..report(
        "smartlead_get_all_folders",
        "Test folders",
        "List placement test folders.",
        "/spam-test/folder",
    )
};

pub const CREATE_FOLDER: ToolSpec = ToolSpec {
    summary: Summary::Field {
        label: "Folder ID",
        key: "id",
    },
    ..sd(
        "smartlead_create_folder",
        "Folder created",
        "Create a placement test folder.",
        Endpoint::post(SMART_DELIVERY, "/spam-test/folder"),
    )
};

pub const GET_FOLDER_BY_ID: ToolSpec = report(
    "smartlead_get_folder_by_id",
    "Test folder",
    "Get a placement test folder by ID.",
    "/spam-test/folder/{folder_id}",
);

pub const DELETE_FOLDER: ToolSpec = sd(
    "smartlead_delete_folder",
    "Folder deleted",
    "Delete a placement test folder.",
    Endpoint::delete(SMART_DELIVERY, "/spam-test/folder/{folder_id}"),
);

pub(super) fn register(b: ToolRegistryBuilder) -> ToolRegistryBuilder {
    let b = b
        .endpoint::<NoInput>(GET_REGION_WISE_PROVIDER_IDS)
        .endpoint::<ManualPlacementTestInput>(CREATE_MANUAL_PLACEMENT_TEST)
        .endpoint::<AutomatedPlacementTestInput>(CREATE_AUTOMATED_PLACEMENT_TEST)
        .endpoint::<TestIdInput>(GET_SPAM_TEST_DETAILS)
        .endpoint::<BulkDeleteInput>(DELETE_TESTS_IN_BULK)
        .endpoint::<TestIdInput>(STOP_AUTOMATED_TEST)
        .endpoint::<ListTestsInput>(LIST_ALL_TESTS)
        .endpoint::<TestReportInput>(GET_PROVIDER_WISE_REPORT)
        .endpoint::<TestReportInput>(GET_GEO_WISE_REPORT)
        .endpoint::<TestIdInput>(GET_SENDER_ACCOUNT_WISE_REPORT);
    TEST_REPORTS
        .iter()
        .fold(b, |b, spec| b.endpoint::<TestIdInput>(*spec))
        .endpoint::<NoInput>(GET_ALL_FOLDERS)
        .endpoint::<CreateFolderInput>(CREATE_FOLDER)
        .endpoint::<FolderIdInput>(GET_FOLDER_BY_ID)
        .endpoint::<FolderIdInput>(DELETE_FOLDER)
}
