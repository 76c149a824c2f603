// Composing catalogs: later catalogs override earlier ones.

use compliance_core::catalog::RuleCatalog;
use compliance_core::error::CatalogError;
use compliance_core::loader::{parse_catalog, CatalogFormat};
use compliance_core::predicate::PredicateRegistry;
use compliance_core::types::Level;

fn parse(text: &str, name: &str) -> Result<RuleCatalog, CatalogError> {
    parse_catalog(text, CatalogFormat::Json, name, &PredicateRegistry::new())
}

#[test]
fn same_id_across_catalogs_overrides() {
    let base = parse(
        r#"[
          { "id": "R1", "level": "MUST", "category": "Style",
            "description": "base version", "predicate_ref": "regex:a" },
          { "id": "R2", "level": "MAY", "predicate_ref": "regex:b" }
        ]"#,
        "base.json",
    )
    .unwrap();
    let project = parse(
        r#"[
          { "id": "R3", "level": "SHOULD", "predicate_ref": "regex:c" },
          { "id": "R1", "level": "SHOULD", "category": "Style",
            "description": "project version", "predicate_ref": "regex:z" }
        ]"#,
        "project.json",
    )
    .unwrap();

    let merged = RuleCatalog::merge(&base, &project);

    assert_eq!(merged.ids(), vec!["R1", "R2", "R3"]);
    let r1 = merged.get("R1").unwrap();
    assert_eq!(r1.description, "project version");
    assert_eq!(r1.level, Level::Should);
}

#[test]
fn duplicate_inside_either_source_is_an_error() {
    let dup = r#"[
      { "id": "R1", "level": "MUST", "predicate_ref": "regex:a" },
      { "id": "R1", "level": "MUST", "predicate_ref": "regex:b" }
    ]"#;
    assert!(matches!(
        parse(dup, "dup.json"),
        Err(CatalogError::DuplicateRuleId { .. })
    ));
}

#[test]
fn merge_all_folds_left_to_right() {
    let a = parse(r#"[{ "id": "R", "level": "MUST", "description": "a", "predicate_ref": "regex:a" }]"#, "a").unwrap();
    let b = parse(r#"[{ "id": "R", "level": "MUST", "description": "b", "predicate_ref": "regex:b" }]"#, "b").unwrap();
    let c = parse(r#"[{ "id": "R", "level": "MUST", "description": "c", "predicate_ref": "regex:c" }]"#, "c").unwrap();

    let merged = RuleCatalog::merge_all([&a, &b, &c]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged.get("R").unwrap().description, "c");

    let reversed = RuleCatalog::merge_all([&c, &b, &a]);
    assert_eq!(reversed.get("R").unwrap().description, "a");
}

#[test]
fn merge_leaves_inputs_untouched() {
    let a = parse(r#"[{ "id": "R", "level": "MUST", "description": "a", "predicate_ref": "regex:a" }]"#, "a").unwrap();
    let b = parse(r#"[{ "id": "R", "level": "MAY", "description": "b", "predicate_ref": "regex:b" }]"#, "b").unwrap();
    let _ = RuleCatalog::merge(&a, &b);
    assert_eq!(a.get("R").unwrap().description, "a");
    assert_eq!(b.get("R").unwrap().description, "b");
}
