use compliance_core::types::Outcome;

use crate::types::{Coverage, Score};

/// `100 * passed / (passed + failed)`, rounded to one decimal place.
///
/// NotApplicable and Indeterminate outcomes count on neither side. When no
/// rule passed or failed the score is `N/A`.
pub fn score(outcomes: &[Outcome]) -> Score {
    let passed = outcomes.iter().filter(|o| o.is_passed()).count();
    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    let decided = passed + failed;
    if decided == 0 {
        return Score::NotAvailable;
    }
    let raw = 100.0 * passed as f64 / decided as f64;
    Score::Percent((raw * 10.0).round() / 10.0)
}

/// Decided rules over applicable rules.
pub fn coverage(outcomes: &[Outcome]) -> Coverage {
    Coverage {
        evaluated: outcomes
            .iter()
            .filter(|o| o.is_passed() || o.is_failed())
            .count(),
        total: outcomes.iter().filter(|o| !o.is_not_applicable()).count(),
    }
}
