//! Verification report model and its JSON/Markdown renderings.

use anyhow::{Context, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartlead_async::Method;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::NormalizedError;
use crate::tool::Category;

/// JSON report file name
pub const JSON_REPORT: &str = "verification-report.json";
/// Markdown report file name
pub const MARKDOWN_REPORT: &str = "verification-report.md";

/// Average response time above which optimization is recommended
const SLOW_AVERAGE_MS: u64 = 1000;

/// Outcome of probing one tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// Endpoint answered successfully
    Pass,
    /// Endpoint call failed
    Fail,
    /// Mutating endpoint, not called
    Skipped,
}

impl ProbeStatus {
    /// Marker used in the Markdown table
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Pass => "✅ PASS",
            Self::Fail => "❌ FAIL",
            Self::Skipped => "⏭️ SKIPPED",
        }
    }
}

/// Result of probing one tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool: String,
    pub category: Category,
    pub status: ProbeStatus,
    /// Zero for skipped tools
    pub response_time_ms: u64,
    pub method: Method,
    /// Path template
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<NormalizedError>,
}

/// Totals over one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_tools: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Percentage of probed (non-skipped) tools that passed
    pub success_rate: f64,
    /// Mean response time over probed tools
    pub average_response_time_ms: u64,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
    pub generated_at: DateTime<Utc>,
}

/// Per-category counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Full verification report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub summary: ReportSummary,
    pub results: Vec<ToolResult>,
    pub tools_by_category: BTreeMap<Category, CategoryCounts>,
    pub failed_tools: Vec<String>,
    pub recommendations: Vec<String>,
}

impl VerificationReport {
    /// Builds the report from probe results.
    #[must_use]
    pub fn from_results(
        results: Vec<ToolResult>,
        duration_ms: u64,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut tools_by_category: BTreeMap<Category, CategoryCounts> = BTreeMap::new();
        for r in &results {
            let counts = tools_by_category.entry(r.category).or_default();
            counts.total += 1;
            match r.status {
                ProbeStatus::Pass => counts.passed += 1,
                ProbeStatus::Fail => counts.failed += 1,
                ProbeStatus::Skipped => counts.skipped += 1,
            }
        }

        let passed = results.iter().filter(|r| r.status == ProbeStatus::Pass).count();
        let failed = results.iter().filter(|r| r.status == ProbeStatus::Fail).count();
        let skipped = results.len() - passed - failed;
        let probed = passed + failed;

        let success_rate = if probed == 0 {
            0.0
        } else {
            (passed as f64 / probed as f64 * 1000.0).round() / 10.0
        };
        let average_response_time_ms = if probed == 0 {
            0
        } else {
            results
                .iter()
                .filter(|r| r.status != ProbeStatus::Skipped)
                .map(|r| r.response_time_ms)
                .sum::<u64>()
                / probed as u64
        };

        let failed_tools = results
            .iter()
            .filter(|r| r.status == ProbeStatus::Fail)
            .map(|r| r.tool.clone())
            .collect();

        let summary = ReportSummary {
            total_tools: results.len(),
            passed,
            failed,
            skipped,
            success_rate,
            average_response_time_ms,
            duration_ms,
            generated_at,
        };
        let recommendations = recommendations(&summary, probed);

        Self {
            summary,
            results,
            tools_by_category,
            failed_tools,
            recommendations,
        }
    }

    /// Markdown rendering.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let s = &self.summary;
        let mut md = String::new();
        let _ = writeln!(md, "# SmartLead Tool Verification Report\n");
        let _ = writeln!(md, "Generated: {}\n", s.generated_at.to_rfc3339());

        let _ = writeln!(md, "## Executive Summary\n");
        let _ = writeln!(md, "- **Total tools**: {}", s.total_tools);
        let _ = writeln!(md, "- **Passed**: {}", s.passed);
        let _ = writeln!(md, "- **Failed**: {}", s.failed);
        let _ = writeln!(md, "- **Skipped** (mutating): {}", s.skipped);
        let _ = writeln!(md, "- **Success Rate**: {:.1}%", s.success_rate);
        let _ = writeln!(md, "- **Average response time**: {}ms", s.average_response_time_ms);
        let _ = writeln!(md, "- **Duration**: {}ms\n", s.duration_ms);

        let _ = writeln!(md, "## Tools by Category\n");
        let _ = writeln!(md, "| Category | Total | Passed | Failed | Skipped |");
        let _ = writeln!(md, "|---|---|---|---|---|");
        for (category, c) in &self.tools_by_category {
            let _ = writeln!(
                md,
                "| {category} | {} | {} | {} | {} |",
                c.total, c.passed, c.failed, c.skipped
            );
        }
        md.push('\n');

        if !self.failed_tools.is_empty() {
            let _ = writeln!(md, "## Failed Tools\n");
            for r in self.results.iter().filter(|r| r.status == ProbeStatus::Fail) {
                let reason = r.error.as_ref().map_or("unknown error", |e| e.message.as_str());
                let _ = writeln!(md, "- `{}` ({} {}): {reason}", r.tool, r.method, r.path);
            }
            md.push('\n');
        }

        let _ = writeln!(md, "## Recommendations\n");
        for rec in &self.recommendations {
            let _ = writeln!(md, "- {rec}");
        }
        md.push('\n');

        let _ = writeln!(md, "## Detailed Results\n");
        let _ = writeln!(md, "| Tool | Status | Response Time | Endpoint |");
        let _ = writeln!(md, "|---|---|---|---|");
        for r in &self.results {
            let _ = writeln!(
                md,
                "| {} | {} | {}ms | {} {} |",
                r.tool,
                r.status.marker(),
                r.response_time_ms,
                r.method,
                r.path
            );
        }
        md
    }

    /// Writes the JSON and Markdown reports into `dir`, creating it if needed.
    ///
    /// Returns the two paths written.
    pub fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        let json_path = dir.join(JSON_REPORT);
        write_atomic(&json_path, &json)?;

        let md_path = dir.join(MARKDOWN_REPORT);
        write_atomic(&md_path, &self.to_markdown())?;

        Ok((json_path, md_path))
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let af = AtomicFile::new(path, AllowOverwrite);
    af.write(|f| f.write_all(contents.as_bytes()))
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

fn recommendations(summary: &ReportSummary, probed: usize) -> Vec<String> {
    let mut out = Vec::new();
    if summary.failed > 0 {
        out.push(format!(
            "{} tools failed - review endpoint mappings",
            summary.failed
        ));
    }
    if summary.average_response_time_ms > SLOW_AVERAGE_MS {
        out.push(format!(
            "Average response time is {}ms - consider optimization",
            summary.average_response_time_ms
        ));
    }
    if probed > 0 {
        let verdict = if summary.success_rate >= 95.0 {
            "Excellent API coverage! All major tools are functional."
        } else if summary.success_rate >= 80.0 {
            "Good API coverage with some tools needing attention."
        } else {
            "API coverage needs improvement - review failed tools."
        };
        out.push(verdict.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartlead_async::ErrorKind;

    fn result(tool: &str, category: Category, status: ProbeStatus, ms: u64) -> ToolResult {
        ToolResult {
            tool: tool.into(),
            category,
            status,
            response_time_ms: ms,
            method: Method::Get,
            path: "/x".into(),
            error: (status == ProbeStatus::Fail).then(|| NormalizedError {
                kind: ErrorKind::RequestRejected,
                message: "Not found".into(),
                status: Some(404),
                field: None,
                cause: None,
            }),
        }
    }

    fn sample() -> VerificationReport {
        VerificationReport::from_results(
            vec![
                result("smartlead_a", Category::Campaigns, ProbeStatus::Pass, 100),
                result("smartlead_b", Category::Campaigns, ProbeStatus::Fail, 300),
                result("smartlead_c", Category::Leads, ProbeStatus::Pass, 200),
                result("smartlead_d", Category::Leads, ProbeStatus::Skipped, 0),
            ],
            1234,
            Utc::now(),
        )
    }

    #[test]
    fn summary_counts_only_probed_tools() {
        let r = sample();
        assert_eq!(r.summary.total_tools, 4);
        assert_eq!(r.summary.passed, 2);
        assert_eq!(r.summary.failed, 1);
        assert_eq!(r.summary.skipped, 1);
        assert!((r.summary.success_rate - 66.7).abs() < 1e-9);
        assert_eq!(r.summary.average_response_time_ms, 200);
        assert_eq!(r.failed_tools, vec!["smartlead_b".to_string()]);
        assert_eq!(r.tools_by_category[&Category::Leads].skipped, 1);
    }

    #[test]
    fn recommendations_follow_thresholds() {
        let r = sample();
        assert_eq!(
            r.recommendations,
            vec![
                "1 tools failed - review endpoint mappings".to_string(),
                "API coverage needs improvement - review failed tools.".to_string(),
            ]
        );

        let slow = VerificationReport::from_results(
            vec![result("smartlead_a", Category::Campaigns, ProbeStatus::Pass, 1500)],
            1500,
            Utc::now(),
        );
        assert_eq!(
            slow.recommendations,
            vec![
                "Average response time is 1500ms - consider optimization".to_string(),
                "Excellent API coverage! All major tools are functional.".to_string(),
            ]
        );
    }

    #[test]
    fn markdown_has_every_section() {
        let md = sample().to_markdown();
        for heading in [
            "## Executive Summary",
            "## Tools by Category",
            "## Failed Tools",
            "## Recommendations",
            "## Detailed Results",
        ] {
            assert!(md.contains(heading), "missing {heading}");
        }
        assert!(md.contains("| smartlead_b | ❌ FAIL | 300ms | GET /x |"));
        assert!(md.contains("Not found"));
    }

    #[test]
    fn write_to_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let (json, md) = sample().write_to(&out).unwrap();
        let parsed: VerificationReport =
            serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
        assert_eq!(parsed.summary.passed, 2);
        assert!(std::fs::read_to_string(md).unwrap().starts_with("# SmartLead"));
    }
}
