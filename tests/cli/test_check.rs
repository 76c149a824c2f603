// Tests for `compliance-check` output and flag handling.

use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

use crate::common::{compliance_bin, write_file, HTML_CATALOG_JSON};

#[test]
fn markdown_report_on_stdout() {
    let dir = TempDir::new().unwrap();
    let catalog = write_file(dir.path(), "html.json", HTML_CATALOG_JSON);
    let page = write_file(dir.path(), "index.html", "<DIV>Hi</DIV>\n");

    let output = Command::new(compliance_bin())
        .arg(&page)
        .arg("--catalog")
        .arg(&catalog)
        .current_dir(dir.path())
        .output()
        .expect("Failed to run compliance-check");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Compliance Report"), "stdout:\n{}", stdout);
    assert!(stdout.contains("### Critical Violations"));
    assert!(stdout.contains("Compliance score: 88.9% (9/9 rules evaluated)"));
}

#[test]
fn json_format_for_several_artifacts() {
    let dir = TempDir::new().unwrap();
    let catalog = write_file(dir.path(), "html.json", HTML_CATALOG_JSON);
    let a = write_file(dir.path(), "a.html", "<p>fine</p>\n");
    let b = write_file(dir.path(), "b.html", "<script>x()</script>\n");

    let output = Command::new(compliance_bin())
        .args([&a, &b])
        .args(["--format", "json", "--catalog"])
        .arg(&catalog)
        .current_dir(dir.path())
        .output()
        .unwrap();

    let reports: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0]["artifactId"].as_str().unwrap().ends_with("a.html"));
    assert_eq!(reports[0]["score"], 100.0);
    assert_eq!(reports[1]["banners"][0], "⚠️ SECURITY WARNING");
}

#[test]
fn catalogs_merge_in_flag_order() {
    let dir = TempDir::new().unwrap();
    let base = write_file(
        dir.path(),
        "base.json",
        r#"[{ "id": "no-todo", "level": "MUST", "category": "Style",
              "description": "base", "predicate_ref": "regex:TODO" }]"#,
    );
    let relaxed = write_file(
        dir.path(),
        "relaxed.yaml",
        "- id: no-todo\n  level: MAY\n  category: Style\n  description: relaxed\n  predicate_ref: 'regex:TODO'\n",
    );
    let notes = write_file(dir.path(), "notes.md", "TODO: write docs\n");

    let output = Command::new(compliance_bin())
        .arg(&notes)
        .args(["--format", "json", "--catalog"])
        .arg(&base)
        .arg("--catalog")
        .arg(&relaxed)
        .current_dir(dir.path())
        .output()
        .unwrap();

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["findings"][0]["severity"], "suggestion");
    assert_eq!(report["findings"][0]["message"], "relaxed");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn domain_flag_overrides_extension() {
    let dir = TempDir::new().unwrap();
    let catalog = write_file(
        dir.path(),
        "sql.json",
        r#"[{ "id": "no-select-star", "level": "SHOULD", "category": "Database",
              "applicability_tag": "sql", "predicate_ref": "regex:(?i)select\\s+\\*" }]"#,
    );
    let query = write_file(dir.path(), "query.txt", "SELECT * FROM users;\n");

    let inferred = Command::new(compliance_bin())
        .arg(&query)
        .args(["--format", "json", "--catalog"])
        .arg(&catalog)
        .output()
        .unwrap();
    let report: Value = serde_json::from_slice(&inferred.stdout).unwrap();
    assert_eq!(report["score"], "N/A");

    let forced = Command::new(compliance_bin())
        .arg(&query)
        .args(["--format", "json", "--domain", "sql", "--catalog"])
        .arg(&catalog)
        .output()
        .unwrap();
    let report: Value = serde_json::from_slice(&forced.stdout).unwrap();
    assert_eq!(report["score"], 0.0);
    assert_eq!(report["findings"][0]["ruleId"], "no-select-star");
}

#[test]
fn config_file_sets_banners_and_threshold() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        ".compliance/config.json",
        r#"{ "fail_on": "recommendation",
             "banners": [{ "category": "Database", "text": "DB REVIEW" }] }"#,
    );
    let catalog = write_file(
        dir.path(),
        "sql.json",
        r#"[{ "id": "no-select-star", "level": "SHOULD", "category": "Database",
              "predicate_ref": "regex:(?i)select\\s+\\*" }]"#,
    );
    let query = write_file(dir.path(), "q.sql", "select * from t;\n");

    let output = Command::new(compliance_bin())
        .arg(&query)
        .arg("--catalog")
        .arg(&catalog)
        .current_dir(dir.path())
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("> **DB REVIEW**"), "stdout:\n{}", stdout);
    assert_eq!(output.status.code(), Some(1));
}
