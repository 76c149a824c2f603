use compliance_core::types::{Level, Location, Outcome, Severity};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Raw analyzer output for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// One outcome per catalog rule, in evaluation order.
    pub outcomes: Vec<Outcome>,
    /// The caller cancelled the run before every rule finished.
    pub cancelled: bool,
}

/// Compliance percentage, or `N/A` when no rule was actually exercised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Percent(f64),
    NotAvailable,
}

impl Score {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Score::Percent(p) => Some(*p),
            Score::NotAvailable => None,
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Score::Percent(p) => write!(f, "{:.1}%", p),
            Score::NotAvailable => f.write_str("N/A"),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Score::Percent(p) => serializer.serialize_f64(*p),
            Score::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(p) => Ok(Score::Percent(p)),
            Raw::Text(t) if t == "N/A" => Ok(Score::NotAvailable),
            Raw::Text(t) => Err(serde::de::Error::custom(format!("invalid score: {}", t))),
        }
    }
}

/// How many applicable rules were actually decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    /// Passed + Failed.
    pub evaluated: usize,
    /// Every rule except NotApplicable.
    pub total: usize,
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        self.evaluated == self.total
    }

    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| self.evaluated as f64 / self.total as f64)
    }
}

impl std::fmt::Display for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.evaluated, self.total)
    }
}

/// A reportable Failed or Indeterminate outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub category: String,
    pub level: Level,
    pub message: String,
    pub location: Location,
    pub evidence: String,
    /// Why the rule could not be decided (Indeterminate only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub diff: Option<String>,
    /// Set when a fix template exists but could not be rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_note: Option<String>,
}

/// Final result of one analysis run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub artifact_id: String,
    pub score: Score,
    pub coverage: Coverage,
    pub incomplete: bool,
    /// Ordered Critical, Recommendation, Suggestion, Indeterminate.
    pub findings: Vec<Finding>,
    pub passed_rule_ids: Vec<String>,
}

impl ComplianceReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn findings_with(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    pub fn has_critical(&self) -> bool {
        self.count(Severity::Critical) > 0
    }
}
