// Tests for CLI exit code behavior.

use std::process::{Command, Output};

use tempfile::TempDir;

use crate::common::{compliance_bin, write_file, HTML_CATALOG_JSON};

fn run(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(compliance_bin())
        .args(args)
        .current_dir(dir.path())
        .output()
        .expect("Failed to run compliance-check")
}

fn project(page: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "html.json", HTML_CATALOG_JSON);
    write_file(dir.path(), "index.html", page);
    dir
}

#[test]
/// Exit code 0 when nothing fails.
fn test_exit_code_0_clean() {
    let dir = project("<p>fine</p>\n");
    let out = run(&dir, &["index.html", "--catalog", "html.json"]);
    assert_eq!(out.status.code(), Some(0));
}

#[test]
/// Exit code 1 when a MUST rule fails.
fn test_exit_code_1_critical() {
    let dir = project("<DIV>Hi</DIV>\n");
    let out = run(&dir, &["index.html", "--catalog", "html.json"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
/// Recommendations only fail the run with `--fail-on recommendation`.
fn test_fail_on_threshold() {
    let dir = project("<p><font>x</font></p>\n");
    let default = run(&dir, &["index.html", "--catalog", "html.json"]);
    assert_eq!(default.status.code(), Some(0));
    let strict = run(
        &dir,
        &["index.html", "--catalog", "html.json", "--fail-on", "recommendation"],
    );
    assert_eq!(strict.status.code(), Some(1));
}

#[test]
/// Exit code 2 on catalog errors, before any report is printed.
fn test_exit_code_2_bad_catalog() {
    let dir = project("<p>fine</p>\n");
    write_file(
        dir.path(),
        "dup.json",
        r#"[{ "id": "R1", "level": "MUST", "predicate_ref": "regex:a" },
            { "id": "R1", "level": "MUST", "predicate_ref": "regex:b" }]"#,
    );
    let out = run(&dir, &["index.html", "--catalog", "dup.json"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("duplicate rule id 'R1'"), "stderr: {}", stderr);
}

#[test]
/// Exit code 2 for a missing artifact or catalog.
fn test_exit_code_2_missing_files() {
    let dir = project("<p>fine</p>\n");
    let out = run(&dir, &["missing.html", "--catalog", "html.json"]);
    assert_eq!(out.status.code(), Some(2));
    let out = run(&dir, &["index.html", "--catalog", "missing.json"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
/// Exit code 2 for usage errors.
fn test_exit_code_2_usage() {
    let dir = project("<p>fine</p>\n");
    let out = run(&dir, &["index.html"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
/// An empty merged catalog is fatal.
fn test_exit_code_2_empty_catalog() {
    let dir = project("<p>fine</p>\n");
    write_file(dir.path(), "empty.json", "[]");
    let out = run(&dir, &["index.html", "--catalog", "empty.json"]);
    assert_eq!(out.status.code(), Some(2));
}
