//! Report banners keyed on finding categories.

use compliance_core::config::BannerRule;
use compliance_engine::types::Finding;

/// Banner texts for the categories present in `findings`.
///
/// Categories match case-insensitively. Each banner appears at most once and
/// banners keep the order of `rules`, whatever the order of the findings.
/// Indeterminate findings count: a Security rule that could not be checked
/// still warrants the Security banner.
pub fn select_banners(findings: &[Finding], rules: &[BannerRule]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for rule in rules {
        let present = findings
            .iter()
            .any(|f| f.category.eq_ignore_ascii_case(&rule.category));
        if present && !out.contains(&rule.text) {
            out.push(rule.text.clone());
        }
    }
    out
}
