//! Live verification harness: probes every registered tool's endpoint and
//! reports which ones answer.
//!
//! Only read-only (GET) endpoints are called. Mutating endpoints are listed as
//! skipped so a verification run never changes upstream state. Pacing comes
//! from the gateway's own rate limiter.

pub mod report;

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{Value, json};
use smartlead_async::{Gateway, PRIMARY, Params};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::ToolError;
use crate::registry::ToolRegistry;
use crate::tool::{Category, Tool};
use crate::validation::DATE_FORMAT;

pub use report::{CategoryCounts, ProbeStatus, ReportSummary, ToolResult, VerificationReport};

/// Id used for a placeholder when no sample was discovered
pub const DEFAULT_SAMPLE_ID: u64 = 1;

/// Days covered by the date range given to analytics probes
const ANALYTICS_LOOKBACK_DAYS: i64 = 30;

/// Real ids used to fill path placeholders during probing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleIds {
    pub campaign_id: u64,
    pub email_account_id: u64,
    pub client_id: u64,
}

impl Default for SampleIds {
    fn default() -> Self {
        Self {
            campaign_id: DEFAULT_SAMPLE_ID,
            email_account_id: DEFAULT_SAMPLE_ID,
            client_id: DEFAULT_SAMPLE_ID,
        }
    }
}

impl SampleIds {
    /// Value for a path placeholder
    #[must_use]
    pub fn for_placeholder(&self, name: &str) -> u64 {
        match name {
            "campaign_id" => self.campaign_id,
            "email_account_id" => self.email_account_id,
            "client_id" => self.client_id,
            _ => DEFAULT_SAMPLE_ID,
        }
    }
}

/// Runs a verification pass over a registry.
pub struct Verifier {
    gateway: Arc<Gateway>,
    registry: Arc<ToolRegistry>,
    samples: SampleIds,
}

impl Verifier {
    #[must_use]
    pub fn new(gateway: Arc<Gateway>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            gateway,
            registry,
            samples: SampleIds::default(),
        }
    }

    /// Use these ids instead of discovering them.
    #[must_use]
    pub const fn with_samples(mut self, samples: SampleIds) -> Self {
        self.samples = samples;
        self
    }

    #[must_use]
    pub const fn samples(&self) -> &SampleIds {
        &self.samples
    }

    /// Reads the first campaign, email account and client ids from the account.
    ///
    /// A failed lookup is logged and leaves the current id in place.
    pub async fn discover_samples(&mut self) -> SampleIds {
        if let Some(id) = self.first_id("/campaigns").await {
            self.samples.campaign_id = id;
        }
        if let Some(id) = self.first_id("/email-accounts/").await {
            self.samples.email_account_id = id;
        }
        if let Some(id) = self.first_id("/client/").await {
            self.samples.client_id = id;
        }
        info!(
            campaign_id = self.samples.campaign_id,
            email_account_id = self.samples.email_account_id,
            client_id = self.samples.client_id,
            "sample ids"
        );
        self.samples
    }

    async fn first_id(&self, path: &str) -> Option<u64> {
        match self.gateway.get(PRIMARY, path, Params::new()).await {
            Ok(body) => {
                let id = first_id(&body);
                if id.is_none() {
                    warn!(path, "no sample id found, using default");
                }
                id
            }
            Err(e) => {
                warn!(path, error = %e, "sample id lookup failed, using default");
                None
            }
        }
    }

    /// Probes every registered tool, by category then name.
    pub async fn run(&self) -> VerificationReport {
        let started = Instant::now();
        let mut results = Vec::with_capacity(self.registry.len());
        for category in Category::ALL {
            for tool in self.registry.in_category(category) {
                results.push(self.probe(tool.as_ref()).await);
            }
        }
        let report = VerificationReport::from_results(
            results,
            elapsed_ms(started),
            Utc::now(),
        );
        info!(
            total = report.summary.total_tools,
            passed = report.summary.passed,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            "verification finished"
        );
        report
    }

    async fn probe(&self, tool: &dyn Tool) -> ToolResult {
        let spec = tool.spec();
        let mut result = ToolResult {
            tool: spec.name.to_string(),
            category: spec.category,
            status: ProbeStatus::Skipped,
            response_time_ms: 0,
            method: spec.endpoint.method,
            path: spec.endpoint.path.to_string(),
            error: None,
        };
        if !spec.endpoint.method.is_read_only() {
            return result;
        }

        let params = self.probe_params(tool);
        let started = Instant::now();
        let outcome = self.gateway.call_endpoint(&spec.endpoint, params).await;
        result.response_time_ms = elapsed_ms(started);
        match outcome {
            Ok(_) => result.status = ProbeStatus::Pass,
            Err(e) => {
                warn!(tool = spec.name, error = %e, "probe failed");
                result.status = ProbeStatus::Fail;
                result.error = Some(ToolError::from(e).normalized());
            }
        }
        result
    }

    fn probe_params(&self, tool: &dyn Tool) -> Params {
        let spec = tool.spec();
        let mut params = Params::new();
        for name in spec.endpoint.placeholders() {
            params.insert(name.to_string(), json!(self.samples.for_placeholder(name)));
        }
        if spec.category == Category::Analytics {
            let end = Utc::now().date_naive();
            let start = end - ChronoDuration::days(ANALYTICS_LOOKBACK_DAYS);
            params.insert("start_date".into(), json!(start.format(DATE_FORMAT).to_string()));
            params.insert("end_date".into(), json!(end.format(DATE_FORMAT).to_string()));
        }
        params
    }
}

/// First `id` of a list payload: a bare array, or a `data`/`results` array.
fn first_id(body: &Value) -> Option<u64> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(obj) => ["data", "results"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_array))?,
        _ => return None,
    };
    items.first()?.get("id")?.as_u64()
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_id_reads_common_list_shapes() {
        assert_eq!(first_id(&json!([{"id": 7}, {"id": 8}])), Some(7));
        assert_eq!(first_id(&json!({"data": [{"id": 3}]})), Some(3));
        assert_eq!(first_id(&json!({"results": []})), None);
        assert_eq!(first_id(&json!({"id": 1})), None);
        assert_eq!(first_id(&json!("nope")), None);
    }

    #[test]
    fn placeholders_fall_back_to_default() {
        let s = SampleIds {
            campaign_id: 42,
            email_account_id: 9,
            client_id: 5,
        };
        assert_eq!(s.for_placeholder("campaign_id"), 42);
        assert_eq!(s.for_placeholder("email_account_id"), 9);
        assert_eq!(s.for_placeholder("lead_id"), DEFAULT_SAMPLE_ID);
    }
}
