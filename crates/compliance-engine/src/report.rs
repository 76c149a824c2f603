//! Assembles a [`ComplianceReport`] from an analysis run.

use compliance_core::artifact::Artifact;
use compliance_core::catalog::RuleCatalog;
use compliance_core::rule::Rule;
use compliance_core::types::{Evidence, Location, OutcomeStatus, Severity};

use crate::diff::DiffGenerator;
use crate::score::{coverage, score};
use crate::severity::classify;
use crate::types::{Analysis, ComplianceReport, Finding};

/// Turn outcomes into findings, score the run and attach fix diffs.
///
/// Outcomes are expected in evaluation order; findings keep that order within
/// each severity.
pub fn build_report(
    artifact: &Artifact,
    catalog: &RuleCatalog,
    analysis: &Analysis,
    diffs: &DiffGenerator,
) -> ComplianceReport {
    let mut findings = Vec::new();
    let mut passed_rule_ids = Vec::new();

    for outcome in &analysis.outcomes {
        if outcome.is_passed() {
            passed_rule_ids.push(outcome.rule_id.clone());
            continue;
        }
        let Some(rule) = catalog.get(&outcome.rule_id) else {
            tracing::warn!(rule = %outcome.rule_id, "outcome for a rule outside the catalog");
            continue;
        };
        let Some(severity) = classify(rule, &outcome.status) else {
            continue;
        };
        findings.push(make_finding(artifact, rule, severity, &outcome.status, diffs));
    }

    findings.sort_by_key(|f| f.severity.rank());

    ComplianceReport {
        artifact_id: artifact.id().to_string(),
        score: score(&analysis.outcomes),
        coverage: coverage(&analysis.outcomes),
        incomplete: analysis.cancelled,
        findings,
        passed_rule_ids,
    }
}

fn make_finding(
    artifact: &Artifact,
    rule: &Rule,
    severity: Severity,
    status: &OutcomeStatus,
    diffs: &DiffGenerator,
) -> Finding {
    let mut finding = Finding {
        rule_id: rule.id.clone(),
        severity,
        category: rule.category.clone(),
        level: rule.level,
        message: rule.description.clone(),
        location: Location::file(artifact.id()),
        evidence: String::new(),
        reason: None,
        diff: None,
        fix_note: None,
    };

    match status {
        OutcomeStatus::Failed { evidence, location } => {
            finding.location = location.clone();
            finding.evidence = evidence.snippet.clone();
            if let Some(template) = &rule.fix_template {
                attach_fix(&mut finding, artifact, evidence, template, diffs);
            }
        }
        OutcomeStatus::Indeterminate { reason } => {
            finding.reason = Some(reason.clone());
        }
        OutcomeStatus::Passed | OutcomeStatus::NotApplicable => {}
    }
    finding
}

fn attach_fix(
    finding: &mut Finding,
    artifact: &Artifact,
    evidence: &Evidence,
    template: &str,
    diffs: &DiffGenerator,
) {
    match diffs.diff(artifact.content(), evidence, template, artifact.id()) {
        Ok(diff) if diff.is_empty() => {}
        Ok(diff) => finding.diff = Some(diff),
        Err(e) => {
            tracing::warn!(rule = %finding.rule_id, error = %e, "fix not rendered");
            finding.fix_note = Some(format!("Suggested fix `{}` ({})", template, e));
        }
    }
}
