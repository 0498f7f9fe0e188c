//! Global analytics tools. All share one filter input and differ only by path.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smartlead_async::{Endpoint, PRIMARY};

use crate::error::ToolError;
use crate::registry::ToolRegistryBuilder;
use crate::tool::{Category, Summary, ToolSpec};
use crate::validation::{Validate, date_range};

/// Filters accepted by every analytics endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AnalyticsInput {
    /// Start date (YYYY-MM-DD)
    #[serde(default)]
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD)
    #[serde(default)]
    pub end_date: Option<String>,
    /// Restrict to these clients (sent comma-separated)
    #[serde(default)]
    pub client_ids: Option<Vec<u64>>,
    /// Restrict to these campaigns (sent comma-separated)
    #[serde(default)]
    pub campaign_ids: Option<Vec<u64>>,
}

impl Validate for AnalyticsInput {
    fn validate(&self) -> Result<(), ToolError> {
        date_range(self.start_date.as_deref(), self.end_date.as_deref())?;
        for (field, ids) in [
            ("client_ids", &self.client_ids),
            ("campaign_ids", &self.campaign_ids),
        ] {
            if ids.as_ref().is_some_and(|ids| ids.contains(&0)) {
                return Err(ToolError::invalid(field, "ids must be positive integers"));
            }
        }
        Ok(())
    }
}

const fn analytics(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    path: &'static str,
) -> ToolSpec {
    ToolSpec {
        name,
        title,
        description,
        category: Category::Analytics,
        endpoint: Endpoint::get(PRIMARY, path),
        summary: Summary::None,
    }
}

const fn analytics_list(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    path: &'static str,
    noun: &'static str,
) -> ToolSpec {
    ToolSpec {
        summary: Summary::Count { noun },
        ..analytics(name, title, description, path)
    }
}

/// Every analytics tool, in listing order
pub const TOOLS: [ToolSpec; 20] = [
    analytics_list(
        "smartlead_analytics_campaign_list",
        "Analytics: campaigns",
        "List campaigns with analytics, filtered by client and date range.",
        "/analytics/campaign/list",
        "campaigns",
    ),
    analytics_list(
        "smartlead_analytics_client_list",
        "Analytics: clients",
        "List clients with analytics.",
        "/analytics/client/list",
        "clients",
    ),
    analytics(
        "smartlead_analytics_client_month_wise_count",
        "Analytics: clients per month",
        "Count clients created per month.",
        "/analytics/client/month-wise-count",
    ),
    analytics(
        "smartlead_analytics_overall_stats_v2",
        "Analytics: overall stats",
        "Overall sending, open, click and reply statistics.",
        "/analytics/overall-stats-v2",
    ),
    analytics(
        "smartlead_analytics_day_wise_overall_stats",
        "Analytics: daily stats",
        "Overall statistics broken down by day.",
        "/analytics/day-wise-overall-stats",
    ),
    analytics(
        "smartlead_analytics_day_wise_positive_reply_stats",
        "Analytics: daily positive replies",
        "Positive reply counts broken down by day.",
        "/analytics/day-wise-positive-reply-stats",
    ),
    analytics(
        "smartlead_analytics_campaign_overall_stats",
        "Analytics: campaign stats",
        "Overall statistics per campaign.",
        "/analytics/campaign/overall-stats",
    ),
    analytics(
        "smartlead_analytics_client_overall_stats",
        "Analytics: client stats",
        "Overall statistics per client.",
        "/analytics/client/overall-stats",
    ),
    analytics(
        "smartlead_analytics_mailbox_name_wise_health_metrics",
        "Analytics: mailbox health by name",
        "Mailbox health metrics per mailbox.",
        "/analytics/mailbox/name-wise-health-metrics",
    ),
    analytics(
        "smartlead_analytics_mailbox_domain_wise_health_metrics",
        "Analytics: mailbox health by domain",
        "Mailbox health metrics per sending domain.",
        "/analytics/mailbox/domain-wise-health-metrics",
    ),
    analytics(
        "smartlead_analytics_mailbox_provider_wise_overall_performance",
        "Analytics: provider performance",
        "Overall performance per mailbox provider.",
        "/analytics/mailbox/provider-wise-overall-performance",
    ),
    analytics(
        "smartlead_analytics_team_board_overall_stats",
        "Analytics: team board",
        "Team board statistics.",
        "/analytics/team-board/overall-stats",
    ),
    analytics(
        "smartlead_analytics_lead_overall_stats",
        "Analytics: lead stats",
        "Overall lead statistics.",
        "/analytics/lead/overall-stats",
    ),
    analytics(
        "smartlead_analytics_lead_category_wise_response",
        "Analytics: responses by lead category",
        "Responses grouped by lead category.",
        "/analytics/lead/category-wise-response",
    ),
    analytics(
        "smartlead_analytics_campaign_leads_take_for_first_reply",
        "Analytics: time to first reply",
        "How long leads take to send a first reply.",
        "/analytics/campaign/leads-take-for-first-reply",
    ),
    analytics(
        "smartlead_analytics_campaign_follow_up_reply_rate",
        "Analytics: follow-up reply rate",
        "Reply rate of follow-up steps.",
        "/analytics/campaign/follow-up-reply-rate",
    ),
    analytics(
        "smartlead_analytics_campaign_lead_to_reply_time",
        "Analytics: lead to reply time",
        "Time between first contact and reply.",
        "/analytics/campaign/lead-to-reply-time",
    ),
    analytics(
        "smartlead_analytics_campaign_response_stats",
        "Analytics: response stats",
        "Campaign response statistics.",
        "/analytics/campaign/response-stats",
    ),
    analytics(
        "smartlead_analytics_campaign_status_stats",
        "Analytics: campaign status",
        "Campaign counts by status.",
        "/analytics/campaign/status-stats",
    ),
    analytics(
        "smartlead_analytics_mailbox_overall_stats",
        "Analytics: mailbox stats",
        "Overall mailbox statistics.",
        "/analytics/mailbox/overall-stats",
    ),
];

pub(super) fn register(b: ToolRegistryBuilder) -> ToolRegistryBuilder {
    TOOLS
        .iter()
        .fold(b, |b, spec| b.endpoint::<AnalyticsInput>(*spec))
}
