use compliance_core::config::BannerRule;
use compliance_core::types::Severity;
use compliance_engine::types::{ComplianceReport, Finding};

use crate::banner::select_banners;
use crate::ReportFormatter;

pub struct MarkdownFormatter {
    banners: Vec<BannerRule>,
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new(compliance_core::config::EngineConfig::default().banners)
    }
}

impl MarkdownFormatter {
    pub fn new(banners: Vec<BannerRule>) -> Self {
        Self { banners }
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format_report(&self, report: &ComplianceReport) -> String {
        let mut out = String::new();

        let banners = select_banners(&report.findings, &self.banners);
        for banner in &banners {
            out.push_str(&format!("> **{}**\n", banner));
        }
        if !banners.is_empty() {
            out.push('\n');
        }

        out.push_str("## Compliance Report\n\n");
        out.push_str(&format!("**Artifact:** `{}`\n", report.artifact_id));
        if report.incomplete {
            out.push_str("\n_Run cancelled: some rules were not evaluated and the results are incomplete._\n");
        }

        for severity in Severity::ALL {
            let findings: Vec<&Finding> = report.findings_with(severity).collect();
            if findings.is_empty() {
                if always_shown(severity) {
                    out.push_str(&format!("\n### {}\n\nNone\n", section_title(severity)));
                }
                continue;
            }
            out.push_str(&format!("\n### {}\n", section_title(severity)));
            for finding in findings {
                out.push('\n');
                out.push_str(&format_finding(finding));
            }
        }

        out.push_str("\n### Passed\n\n");
        if report.passed_rule_ids.is_empty() {
            out.push_str("None\n");
        }
        for id in &report.passed_rule_ids {
            out.push_str(&format!("- `{}`\n", id));
        }

        out.push_str(&format!("\n---\n{}\n", footer(report)));
        out
    }
}

fn section_title(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical Violations",
        Severity::Recommendation => "Recommendations",
        Severity::Suggestion => "Suggestions",
        Severity::Indeterminate => "Indeterminate",
    }
}

/// Sections rendered even when they hold no findings.
fn always_shown(severity: Severity) -> bool {
    matches!(severity, Severity::Critical | Severity::Recommendation)
}

/// `Compliance score: 88.9% (9/9 rules evaluated)`
pub fn footer(report: &ComplianceReport) -> String {
    format!(
        "Compliance score: {} ({} rules evaluated)",
        report.score, report.coverage
    )
}

fn format_finding(f: &Finding) -> String {
    let mut out = format!(
        "#### `{}` ({}, {})\n\n{}\n\n",
        f.rule_id, f.level, f.category, f.message
    );
    out.push_str(&format!("- **Location:** `{}`\n", f.location));
    if !f.evidence.is_empty() {
        out.push_str(&format!("- **Evidence:** {}\n", inline_code(&f.evidence)));
    }
    if let Some(reason) = &f.reason {
        out.push_str(&format!("- **Not evaluated:** {}\n", reason));
    }
    if let Some(note) = &f.fix_note {
        out.push_str(&format!("- **Fix:** {}\n", note));
    }
    if let Some(diff) = &f.diff {
        out.push_str("\n```diff\n");
        out.push_str(diff);
        if !diff.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("```\n");
    }
    out
}

/// Wrap `text` in a code span long enough to hold any backticks it contains.
fn inline_code(text: &str) -> String {
    let text = text.trim_end_matches('\n');
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let fence = "`".repeat(longest + 1);
    let pad = if text.starts_with('`') || text.ends_with('`') { " " } else { "" };
    format!("{fence}{pad}{text}{pad}{fence}")
}
