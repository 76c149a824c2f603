use compliance_core::config::BannerRule;
use compliance_engine::types::{ComplianceReport, Coverage, Finding, Score};
use serde::Serialize;

use crate::banner::select_banners;
use crate::ReportFormatter;

pub struct JsonFormatter {
    banners: Vec<BannerRule>,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(compliance_core::config::EngineConfig::default().banners)
    }
}

impl JsonFormatter {
    pub fn new(banners: Vec<BannerRule>) -> Self {
        Self { banners }
    }

    fn document<'a>(&self, report: &'a ComplianceReport) -> JsonReport<'a> {
        JsonReport {
            artifact_id: &report.artifact_id,
            score: report.score,
            coverage: report.coverage,
            incomplete: report.incomplete,
            banners: select_banners(&report.findings, &self.banners),
            findings: &report.findings,
            passed_rule_ids: &report.passed_rule_ids,
        }
    }
}

/// Wire shape of one report: the report fields plus its banners.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    artifact_id: &'a str,
    score: Score,
    coverage: Coverage,
    incomplete: bool,
    banners: Vec<String>,
    findings: &'a [Finding],
    passed_rule_ids: &'a [String],
}

impl ReportFormatter for JsonFormatter {
    fn format_report(&self, report: &ComplianceReport) -> String {
        serde_json::to_string_pretty(&self.document(report)).unwrap_or_default()
    }

    /// A single report stays an object; several become an array.
    fn format_reports(&self, reports: &[ComplianceReport]) -> String {
        if let [only] = reports {
            return self.format_report(only);
        }
        let docs: Vec<JsonReport<'_>> = reports.iter().map(|r| self.document(r)).collect();
        serde_json::to_string_pretty(&docs).unwrap_or_default()
    }
}
