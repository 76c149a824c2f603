use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Compliance level of a rule, in RFC 2119 terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "MUST", alias = "must")]
    Must,
    #[serde(rename = "SHOULD", alias = "should")]
    Should,
    #[serde(rename = "MAY", alias = "may")]
    May,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Must => "MUST",
            Level::Should => "SHOULD",
            Level::May => "MAY",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Recommendation,
    Suggestion,
    Indeterminate,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::Recommendation,
        Severity::Suggestion,
        Severity::Indeterminate,
    ];

    /// Position in report order (lower = listed first).
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Recommendation => 1,
            Severity::Suggestion => 2,
            Severity::Indeterminate => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Recommendation => "Recommendation",
            Severity::Suggestion => "Suggestion",
            Severity::Indeterminate => "Indeterminate",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a predicate saw when it failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// The offending text.
    pub snippet: String,
    /// Byte range of the offending text inside the artifact content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Range<usize>>,
    /// Capture groups by name or index ("0" is the whole match).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub captures: BTreeMap<String, String>,
}

impl Evidence {
    pub fn new(snippet: impl Into<String>) -> Self {
        Self {
            snippet: snippet.into(),
            span: None,
            captures: BTreeMap::new(),
        }
    }

    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_capture(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.captures.insert(key.into(), value.into());
        self
    }
}

/// Where in an artifact a finding points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Location {
    /// A location covering the whole artifact.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line: None,
            column: None,
        }
    }

    /// Resolve a byte offset in `content` to a 1-based line and column.
    /// Offsets past the end clamp to the last position.
    pub fn at_offset(path: impl Into<String>, content: &str, offset: usize) -> Self {
        let mut offset = offset.min(content.len());
        while !content.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &content[..offset];
        let line = before.matches('\n').count() as u32 + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() as u32 + 1;
        Self {
            path: path.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => write!(f, "{}:{}:{}", self.path, line, col),
            (Some(line), None) => write!(f, "{}:{}", self.path, line),
            _ => f.write_str(&self.path),
        }
    }
}

/// Result of a single predicate invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(Evidence),
    NotApplicable,
}

/// Terminal state of one rule in one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Passed,
    Failed { evidence: Evidence, location: Location },
    NotApplicable,
    Indeterminate { reason: String },
}

/// Per-rule evaluation result. Never mutated after the analyzer emits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub rule_id: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl Outcome {
    pub fn new(rule_id: impl Into<String>, status: OutcomeStatus) -> Self {
        Self {
            rule_id: rule_id.into(),
            status,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self.status, OutcomeStatus::NotApplicable)
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self.status, OutcomeStatus::Indeterminate { .. })
    }
}
