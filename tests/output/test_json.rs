// JSON reports rendered from real analysis runs.

use std::sync::Arc;

use compliance_core::artifact::Artifact;
use compliance_core::predicate::CancelToken;
use compliance_engine::engine::ComplianceEngine;
use compliance_output::json::JsonFormatter;
use compliance_output::ReportFormatter;
use serde_json::Value;

use crate::common::html_catalog;

#[tokio::test]
async fn json_report_fields() {
    let report = ComplianceEngine::default()
        .check(
            Arc::new(Artifact::new("index.html", "<DIV>Hi</DIV>\n", "html")),
            &html_catalog(),
            &CancelToken::new(),
        )
        .await
        .unwrap();
    let v: Value = serde_json::from_str(&JsonFormatter::default().format_report(&report)).unwrap();

    assert_eq!(v["artifactId"], "index.html");
    assert_eq!(v["score"], 88.9);
    assert_eq!(v["coverage"]["evaluated"], 9);
    assert_eq!(v["coverage"]["total"], 9);
    assert_eq!(v["incomplete"], false);
    assert_eq!(v["banners"].as_array().unwrap().len(), 0);
    assert_eq!(v["passedRuleIds"].as_array().unwrap().len(), 8);

    let finding = &v["findings"][0];
    assert_eq!(finding["ruleId"], "lowercase-tags");
    assert_eq!(finding["severity"], "critical");
    assert_eq!(finding["level"], "MUST");
    assert_eq!(finding["category"], "Markup");
    assert_eq!(finding["location"]["path"], "index.html");
    assert_eq!(finding["location"]["line"], 1);
    assert_eq!(finding["evidence"], "<DIV");
    assert!(finding["diff"].as_str().unwrap().contains("+<div>Hi</DIV>"));
}

#[tokio::test]
async fn json_round_trips_into_report() {
    let report = ComplianceEngine::default()
        .check(
            Arc::new(Artifact::new("x.html", "<script>1</script>", "html")),
            &html_catalog(),
            &CancelToken::new(),
        )
        .await
        .unwrap();
    let text = serde_json::to_string(&report).unwrap();
    let back: compliance_engine::types::ComplianceReport = serde_json::from_str(&text).unwrap();
    assert_eq!(back, report);
}
