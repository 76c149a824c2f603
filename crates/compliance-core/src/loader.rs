//! Catalog file loading.
//!
//! A catalog file is JSON (or YAML for `.yaml`/`.yml`) holding either a bare
//! list of rule records or an object with a `rules` list:
//!
//! ```json
//! { "name": "html-basics", "rules": [
//!   { "id": "lowercase-tags", "level": "MUST", "category": "Markup",
//!     "description": "Element names must be lowercase",
//!     "applicability_tag": "html", "predicate_ref": "regex:<([A-Z]+)>",
//!     "fix_template": "<${1:lower}>" }
//! ]}
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::RuleCatalog;
use crate::error::CatalogError;
use crate::predicate::PredicateRegistry;
use crate::rule::{Applicability, Rule};
use crate::types::Level;

/// One rule as written in a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: String,
    pub level: Level,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_applicability")]
    pub applicability_tag: String,
    pub predicate_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_template: Option<String>,
    #[serde(default)]
    pub escalate: bool,
}

fn default_applicability() -> String {
    "*".to_string()
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    name: Option<String>,
    rules: Vec<RuleRecord>,
}

impl RuleRecord {
    pub fn into_rule(self, registry: &PredicateRegistry) -> Result<Rule, CatalogError> {
        let predicate = registry.resolve(&self.id, &self.predicate_ref)?;
        let mut rule = Rule::new(self.id, self.level, self.category, self.description, predicate)
            .with_applicability(Applicability::parse(&self.applicability_tag))
            .escalated(self.escalate);
        if let Some(t) = self.fix_template {
            rule = rule.with_fix_template(t);
        }
        Ok(rule)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => CatalogFormat::Yaml,
            _ => CatalogFormat::Json,
        }
    }
}

/// Load a raw catalog from disk.
pub fn load_catalog(path: &Path, registry: &PredicateRegistry) -> Result<RuleCatalog, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source_name = path.to_string_lossy();
    parse_catalog(&text, CatalogFormat::from_path(path), &source_name, registry)
}

/// Parse a raw catalog from text. Duplicate ids within `text` are an error.
pub fn parse_catalog(
    text: &str,
    format: CatalogFormat,
    source_name: &str,
    registry: &PredicateRegistry,
) -> Result<RuleCatalog, CatalogError> {
    let parse_err = |message: String| CatalogError::Parse {
        source_name: source_name.to_string(),
        message,
    };

    let value: serde_json::Value = match format {
        CatalogFormat::Json => serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?,
        CatalogFormat::Yaml => serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?,
    };

    let records: Vec<RuleRecord> = if value.is_array() {
        serde_json::from_value(value).map_err(|e| parse_err(e.to_string()))?
    } else {
        let doc: CatalogDocument =
            serde_json::from_value(value).map_err(|e| parse_err(e.to_string()))?;
        if let Some(name) = &doc.name {
            tracing::debug!(catalog = %name, source = source_name, "loading named catalog");
        }
        doc.rules
    };

    let mut seen = HashSet::new();
    for (index, record) in records.iter().enumerate() {
        if record.id.trim().is_empty() {
            return Err(CatalogError::MissingField {
                source_name: source_name.to_string(),
                index,
                field: "id",
            });
        }
        if record.predicate_ref.trim().is_empty() {
            return Err(CatalogError::MissingField {
                source_name: source_name.to_string(),
                index,
                field: "predicate_ref",
            });
        }
        if !seen.insert(record.id.as_str()) {
            return Err(CatalogError::DuplicateRuleId {
                id: record.id.clone(),
                source_name: source_name.to_string(),
            });
        }
    }

    let rules = records
        .into_iter()
        .map(|r| r.into_rule(registry))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(source = source_name, rules = rules.len(), "catalog loaded");
    RuleCatalog::from_rules(source_name, rules)
}
