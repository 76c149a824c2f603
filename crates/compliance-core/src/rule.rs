use std::collections::BTreeSet;
use std::sync::Arc;

use crate::predicate::Predicate;
use crate::types::Level;

/// Which artifacts a rule applies to, by domain tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    Any,
    Domains(BTreeSet<String>),
}

impl Applicability {
    /// Parse an `applicability_tag`: `*` (or empty) for any domain, otherwise a
    /// comma-separated list of tags. Matching is case-insensitive.
    pub fn parse(tag: &str) -> Self {
        let tags: BTreeSet<String> = tag
            .split(',')
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() || tags.contains("*") {
            Applicability::Any
        } else {
            Applicability::Domains(tags)
        }
    }

    pub fn matches(&self, domain_tag: &str) -> bool {
        match self {
            Applicability::Any => true,
            Applicability::Domains(tags) => tags.contains(&domain_tag.to_ascii_lowercase()),
        }
    }
}

impl std::fmt::Display for Applicability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Applicability::Any => f.write_str("*"),
            Applicability::Domains(tags) => {
                let joined: Vec<&str> = tags.iter().map(String::as_str).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

/// One checkable requirement.
///
/// Held behind `Arc` inside a [`RuleCatalog`](crate::catalog::RuleCatalog) and
/// never modified once built; merging catalogs swaps whole rules.
#[derive(Clone)]
pub struct Rule {
    pub id: String,
    pub level: Level,
    pub category: String,
    pub description: String,
    pub applicability: Applicability,
    pub predicate: Arc<dyn Predicate>,
    /// Replacement snippet for the offending text, with `${N}`-style tokens.
    pub fix_template: Option<String>,
    /// Forces a Critical severity on failure regardless of level.
    pub escalate: bool,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        level: Level,
        category: impl Into<String>,
        description: impl Into<String>,
        predicate: Arc<dyn Predicate>,
    ) -> Self {
        Self {
            id: id.into(),
            level,
            category: category.into(),
            description: description.into(),
            applicability: Applicability::Any,
            predicate,
            fix_template: None,
            escalate: false,
        }
    }

    pub fn with_applicability(mut self, applicability: Applicability) -> Self {
        self.applicability = applicability;
        self
    }

    pub fn with_fix_template(mut self, template: impl Into<String>) -> Self {
        self.fix_template = Some(template.into());
        self
    }

    pub fn escalated(mut self, escalate: bool) -> Self {
        self.escalate = escalate;
        self
    }

    pub fn applies_to(&self, domain_tag: &str) -> bool {
        self.applicability.matches(domain_tag)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("level", &self.level)
            .field("category", &self.category)
            .field("description", &self.description)
            .field("applicability", &self.applicability)
            .field("fix_template", &self.fix_template)
            .field("escalate", &self.escalate)
            .finish_non_exhaustive()
    }
}
