//! Output formatters for compliance reports.
//!
//! Provides two output modes:
//! - **Markdown** (default): human-readable report with fix diffs
//! - **JSON** (`--format json`): machine-readable structured output

pub mod banner;
pub mod json;
pub mod markdown;

use compliance_engine::types::ComplianceReport;

pub trait ReportFormatter {
    fn format_report(&self, report: &ComplianceReport) -> String;

    /// Several reports in input order.
    fn format_reports(&self, reports: &[ComplianceReport]) -> String {
        reports
            .iter()
            .map(|r| self.format_report(r))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
