//! Deterministic mapping from (rule level, outcome) to report severity.
//!
//! | outcome       | MUST     | SHOULD         | MAY        |
//! |---------------|----------|----------------|------------|
//! | Failed        | Critical | Recommendation | Suggestion |
//! | Indeterminate | Indeterminate (any level)                |
//! | Passed / NotApplicable | no finding                      |
//!
//! `Rule::escalate` lifts any Failed outcome to Critical. There is no other
//! escalation path.

use compliance_core::rule::Rule;
use compliance_core::types::{Level, OutcomeStatus, Severity};

/// Severity of a failed rule at `level`, before escalation.
pub fn severity_for_level(level: Level) -> Severity {
    match level {
        Level::Must => Severity::Critical,
        Level::Should => Severity::Recommendation,
        Level::May => Severity::Suggestion,
    }
}

/// Severity of the finding an outcome produces, or `None` when it produces none.
pub fn classify(rule: &Rule, status: &OutcomeStatus) -> Option<Severity> {
    match status {
        OutcomeStatus::Passed | OutcomeStatus::NotApplicable => None,
        OutcomeStatus::Indeterminate { .. } => Some(Severity::Indeterminate),
        OutcomeStatus::Failed { .. } if rule.escalate => Some(Severity::Critical),
        OutcomeStatus::Failed { .. } => Some(severity_for_level(rule.level)),
    }
}
