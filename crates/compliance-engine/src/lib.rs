//! Rule analysis and reporting for compliance-check.
//!
//! - `analyzer`: concurrent, deadline-bounded rule evaluation
//! - `severity`: (level, outcome) -> severity
//! - `score`: compliance score and coverage
//! - `fix_template` / `diff`: suggested fixes as unified diffs
//! - `report`: outcomes -> `ComplianceReport`
//! - `engine`: the above wired together, per artifact or in bulk

pub mod analyzer;
pub mod diff;
pub mod engine;
pub mod fix_template;
pub mod report;
pub mod score;
pub mod severity;
pub mod types;
