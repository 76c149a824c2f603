// End-to-end checks of the documented example runs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use compliance_core::artifact::Artifact;
use compliance_core::catalog::RuleCatalog;
use compliance_core::error::PredicateError;
use compliance_core::loader::{parse_catalog, CatalogFormat};
use compliance_core::predicate::{CancelToken, EvalContext, PredicateRegistry};
use compliance_core::rule::{Applicability, Rule};
use compliance_core::types::{Level, Severity, Verdict};
use compliance_engine::analyzer::Analyzer;
use compliance_engine::diff::DiffGenerator;
use compliance_engine::engine::ComplianceEngine;
use compliance_engine::types::{Coverage, Score};

use crate::common::html_catalog;

fn passing(id: &str, category: &str) -> Rule {
    let pass = |_: &Artifact, _: &EvalContext| -> Result<Verdict, PredicateError> {
        Ok(Verdict::Pass)
    };
    Rule::new(id, Level::Should, category, format!("{} holds", id), Arc::new(pass))
}

#[tokio::test]
async fn uppercase_tag_scores_88_9() {
    let artifact = Arc::new(Artifact::new("index.html", "<DIV>Hi</DIV>", "html"));
    let report = ComplianceEngine::default()
        .check(artifact, &html_catalog(), &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.findings.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.rule_id, "lowercase-tags");
    assert_eq!(finding.severity, Severity::Critical);
    assert_eq!(finding.evidence, "<DIV");
    assert_eq!(finding.location.line, Some(1));
    assert_eq!(finding.location.column, Some(1));
    let diff = finding.diff.as_deref().unwrap();
    assert!(diff.starts_with("--- a/index.html\n+++ b/index.html\n@@ -1 +1 @@\n"), "{}", diff);
    assert!(diff.contains("-<DIV>Hi</DIV>\n"));
    assert!(diff.contains("+<div>Hi</DIV>\n"));

    assert_eq!(report.score, Score::Percent(88.9));
    assert_eq!(report.coverage, Coverage { evaluated: 9, total: 9 });
    assert_eq!(report.passed_rule_ids.len(), 8);
    assert!(!report.incomplete);
}

#[tokio::test]
async fn not_applicable_rules_leave_the_denominator() {
    let mut rules: Vec<Rule> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|id| passing(id, "Markup"))
        .collect();
    for id in ["sql-1", "sql-2", "sql-3"] {
        rules.push(passing(id, "Database").with_applicability(Applicability::parse("sql")));
    }
    let catalog = RuleCatalog::from_rules("mixed", rules).unwrap();
    let artifact = Arc::new(Artifact::new("page.html", "<p>ok</p>", "html"));

    let report = ComplianceEngine::default()
        .check(artifact, &catalog, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.score, Score::Percent(100.0));
    assert_eq!(report.coverage, Coverage { evaluated: 5, total: 5 });
    assert_eq!(report.passed_rule_ids, vec!["a", "b", "c", "d", "e"]);
    assert!(report.findings.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn shell_predicate_timeout_is_per_rule() {
    let catalog_json = r#"[
      { "id": "slow-external", "level": "MUST", "category": "Security",
        "predicate_ref": "command:sleep 30" }
    ]"#;
    let slow = parse_catalog(
        catalog_json,
        CatalogFormat::Json,
        "external.json",
        &PredicateRegistry::new(),
    )
    .unwrap();
    let fast = RuleCatalog::from_rules(
        "fast",
        (0..9).map(|i| passing(&format!("fast-{}", i), "Markup")).collect(),
    )
    .unwrap();
    let catalog = RuleCatalog::merge(&fast, &slow);
    let engine = ComplianceEngine::new(
        Analyzer::new(Duration::from_millis(300), 4),
        DiffGenerator::default(),
    );

    let started = Instant::now();
    let report = engine
        .check(
            Arc::new(Artifact::new("index.html", "<p/>", "html")),
            &catalog,
            &CancelToken::new(),
        )
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(report.coverage, Coverage { evaluated: 9, total: 10 });
    assert!(!report.incomplete);
    assert_eq!(report.score, Score::Percent(100.0));
    assert_eq!(report.findings.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.rule_id, "slow-external");
    assert_eq!(finding.severity, Severity::Indeterminate);
    assert_eq!(finding.reason.as_deref(), Some("timeout"));
}

#[tokio::test]
async fn cancelled_run_is_incomplete() {
    let hang = |_: &Artifact, ctx: &EvalContext| -> Result<Verdict, PredicateError> {
        while !ctx.is_cancelled() {
            std::thread::sleep(Duration::from_millis(5));
        }
        Err(PredicateError::new("stopped"))
    };
    let catalog = RuleCatalog::from_rules(
        "c",
        vec![
            passing("quick", "Markup"),
            Rule::new("hang", Level::Must, "Markup", "never finishes", Arc::new(hang)),
        ],
    )
    .unwrap();
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let report = ComplianceEngine::default()
        .check(
            Arc::new(Artifact::new("a.html", "", "html")),
            &catalog,
            &cancel,
        )
        .await
        .unwrap();

    assert!(report.incomplete);
    assert_eq!(report.coverage, Coverage { evaluated: 1, total: 2 });
    assert_eq!(report.findings[0].reason.as_deref(), Some("cancelled"));
}
