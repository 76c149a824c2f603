//! Unified diffs for suggested fixes.

use compliance_core::error::RenderError;
use compliance_core::types::Evidence;
use similar::TextDiff;

use crate::fix_template::apply_fix;

/// Renders suggested fixes as unified diffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffGenerator {
    /// Context lines around changes
    pub context_lines: usize,
}

impl Default for DiffGenerator {
    fn default() -> Self {
        Self { context_lines: 3 }
    }
}

impl DiffGenerator {
    pub fn new(context_lines: usize) -> Self {
        Self { context_lines }
    }

    /// Diff `original` against the text produced by splicing the resolved
    /// `fix_template` into the evidence span. Empty when the fix changes nothing.
    pub fn diff(
        &self,
        original: &str,
        evidence: &Evidence,
        fix_template: &str,
        label: &str,
    ) -> Result<String, RenderError> {
        let fixed = apply_fix(original, evidence, fix_template)?;
        Ok(self.unified_diff(original, &fixed, label))
    }

    /// Generate unified diff output with `a/` and `b/` headers.
    pub fn unified_diff(&self, old: &str, new: &str, label: &str) -> String {
        let label = label.trim_start_matches('/');
        let old_header = format!("a/{}", label);
        let new_header = format!("b/{}", label);
        TextDiff::from_lines(old, new)
            .unified_diff()
            .context_radius(self.context_lines)
            .header(&old_header, &new_header)
            .to_string()
    }
}

/// Apply a unified diff produced by [`DiffGenerator`] to `original`.
pub fn apply_patch(original: &str, patch: &str) -> Result<String, RenderError> {
    let old_lines: Vec<&str> = original.split_inclusive('\n').collect();
    let mut out = String::with_capacity(original.len());
    let mut cursor = 0usize;
    let mut in_hunk = false;
    let mut lines = patch.split_inclusive('\n').peekable();

    while let Some(line) = lines.next() {
        if line.starts_with("@@") {
            let target = hunk_old_start(line)?;
            if target < cursor || target > old_lines.len() {
                return Err(RenderError::PatchMismatch(format!(
                    "hunk starts at line {} but patch is at line {}",
                    target + 1,
                    cursor + 1
                )));
            }
            for l in &old_lines[cursor..target] {
                out.push_str(l);
            }
            cursor = target;
            in_hunk = true;
            continue;
        }
        if !in_hunk {
            // File headers.
            continue;
        }

        let (tag, body) = line.split_at(line.chars().next().map_or(0, char::len_utf8));
        let no_newline = lines.peek().is_some_and(|next| next.starts_with('\\'));
        let body = if no_newline {
            lines.next();
            body.strip_suffix('\n').unwrap_or(body)
        } else {
            body
        };

        match tag {
            " " | "-" => {
                let current = old_lines.get(cursor).copied().unwrap_or_default();
                if current != body {
                    return Err(RenderError::PatchMismatch(format!(
                        "line {} is {:?}, patch expects {:?}",
                        cursor + 1,
                        current,
                        body
                    )));
                }
                if tag == " " {
                    out.push_str(body);
                }
                cursor += 1;
            }
            "+" => out.push_str(body),
            _ => {
                return Err(RenderError::PatchMismatch(format!(
                    "unexpected patch line {:?}",
                    line
                )))
            }
        }
    }

    for l in &old_lines[cursor.min(old_lines.len())..] {
        out.push_str(l);
    }
    Ok(out)
}

/// Zero-based index of the first old line a hunk header touches.
fn hunk_old_start(header: &str) -> Result<usize, RenderError> {
    let malformed = || RenderError::PatchMismatch(format!("bad hunk header {:?}", header.trim_end()));
    let range = header
        .strip_prefix("@@ -")
        .and_then(|rest| rest.split_whitespace().next())
        .ok_or_else(malformed)?;
    let (start, len) = match range.split_once(',') {
        Some((s, l)) => (s, l),
        None => (range, "1"),
    };
    let start: usize = start.parse().map_err(|_| malformed())?;
    let len: usize = len.parse().map_err(|_| malformed())?;
    // An empty old range names the line after which the insertion happens.
    Ok(if len == 0 { start } else { start.saturating_sub(1) })
}
