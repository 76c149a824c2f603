//! Ordered, deduplicated rule collections.
//!
//! A raw catalog comes from one load operation and must not repeat an id.
//! Composition goes through [`RuleCatalog::merge`]: the later catalog wins on
//! id collisions, and the overriding rule takes the original rule's slot.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CatalogError;
use crate::rule::Rule;

#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: Vec<Arc<Rule>>,
    index: HashMap<String, usize>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a raw catalog from one source. Duplicate ids are a malformed source.
    pub fn from_rules(source_name: &str, rules: Vec<Rule>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for rule in rules {
            if catalog.index.contains_key(&rule.id) {
                return Err(CatalogError::DuplicateRuleId {
                    id: rule.id,
                    source_name: source_name.to_string(),
                });
            }
            catalog.index.insert(rule.id.clone(), catalog.rules.len());
            catalog.rules.push(Arc::new(rule));
        }
        Ok(catalog)
    }

    /// All rules of `a`, then those of `b`. A rule of `b` whose id already
    /// exists in `a` replaces it in place.
    pub fn merge(a: &RuleCatalog, b: &RuleCatalog) -> RuleCatalog {
        let mut merged = a.clone();
        for rule in &b.rules {
            match merged.index.get(&rule.id) {
                Some(&pos) => merged.rules[pos] = Arc::clone(rule),
                None => {
                    merged.index.insert(rule.id.clone(), merged.rules.len());
                    merged.rules.push(Arc::clone(rule));
                }
            }
        }
        merged
    }

    /// Fold catalogs left to right with [`merge`](Self::merge).
    pub fn merge_all<'a>(catalogs: impl IntoIterator<Item = &'a RuleCatalog>) -> RuleCatalog {
        catalogs
            .into_iter()
            .fold(RuleCatalog::new(), |acc, c| RuleCatalog::merge(&acc, c))
    }

    /// Rules whose applicability accepts `domain_tag`, in catalog order.
    pub fn applicable_to(&self, domain_tag: &str) -> Vec<Arc<Rule>> {
        self.rules
            .iter()
            .filter(|r| r.applies_to(domain_tag))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Rule>> {
        self.index.get(id).map(|&pos| &self.rules[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
