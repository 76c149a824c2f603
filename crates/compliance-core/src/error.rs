//! Error taxonomy.
//!
//! Only [`CatalogError`] and [`FatalError`] stop a run. [`PredicateError`] and
//! [`RenderError`] are recovered per rule or per finding and end up as data in
//! the report.

use std::path::PathBuf;

/// A catalog could not be loaded. Fatal; raised before any analysis.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("duplicate rule id '{id}' in catalog {source_name}")]
    DuplicateRuleId { id: String, source_name: String },

    #[error("rule at position {index} in catalog {source_name} is missing required field '{field}'")]
    MissingField {
        source_name: String,
        index: usize,
        field: &'static str,
    },

    #[error("rule '{rule_id}' references unknown predicate '{predicate_ref}'")]
    UnknownPredicate {
        rule_id: String,
        predicate_ref: String,
    },

    #[error("rule '{rule_id}' has an invalid predicate: {message}")]
    InvalidPredicate { rule_id: String, message: String },
}

/// The whole run cannot proceed.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error("failed to read artifact {path}: {source}")]
    ArtifactUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rule catalog is empty")]
    EmptyCatalog,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// A predicate could not decide. Recovered as an Indeterminate outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PredicateError {
    pub message: String,
}

impl PredicateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PredicateError {
    fn from(e: std::io::Error) -> Self {
        PredicateError::new(e.to_string())
    }
}

/// A fix template could not be turned into a diff. The finding is kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("fix template references unresolved token '{0}'")]
    UnresolvedToken(String),

    #[error("fix template uses unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("fix template is malformed at byte {0}")]
    MalformedTemplate(usize),

    #[error("evidence has no span to replace")]
    MissingSpan,

    #[error("evidence span {start}..{end} is outside the artifact")]
    SpanOutOfBounds { start: usize, end: usize },

    #[error("diff does not apply: {0}")]
    PatchMismatch(String),
}
