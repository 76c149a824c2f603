//! Fix template resolution.
//!
//! Templates are literal text with tokens drawn from the failure evidence:
//! - `$N` / `${N}`: numbered capture group (`0` is the whole match)
//! - `${name}`: named capture group
//! - `${key:filter}`: capture passed through `lower`, `upper` or `trim`
//! - `$$`: a literal `$`

use compliance_core::error::RenderError;
use compliance_core::types::Evidence;

/// Resolve every token of `template` against `evidence`.
pub fn render_template(template: &str, evidence: &Evidence) -> Result<String, RenderError> {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        out.push_str(&template[literal_start..i]);
        let token_start = i;

        match bytes.get(i + 1) {
            Some(b'$') => {
                out.push('$');
                i += 2;
            }
            Some(b'{') => {
                let close = template[i + 2..]
                    .find('}')
                    .map(|p| i + 2 + p)
                    .ok_or(RenderError::MalformedTemplate(token_start))?;
                let inner = &template[i + 2..close];
                let (key, filter) = match inner.split_once(':') {
                    Some((k, f)) => (k, Some(f)),
                    None => (inner, None),
                };
                if !is_valid_key(key) {
                    return Err(RenderError::MalformedTemplate(token_start));
                }
                let value = lookup(evidence, key)?;
                out.push_str(&apply_filter(value, filter)?);
                i = close + 1;
            }
            Some(c) if c.is_ascii_digit() => {
                let digits_end = template[i + 1..]
                    .find(|c: char| !c.is_ascii_digit())
                    .map_or(template.len(), |p| i + 1 + p);
                let key = &template[i + 1..digits_end];
                out.push_str(lookup(evidence, key)?);
                i = digits_end;
            }
            _ => return Err(RenderError::MalformedTemplate(token_start)),
        }
        literal_start = i;
    }

    out.push_str(&template[literal_start..]);
    Ok(out)
}

/// Replace the evidence span of `original` with the rendered template.
pub fn apply_fix(original: &str, evidence: &Evidence, template: &str) -> Result<String, RenderError> {
    let span = evidence.span.clone().ok_or(RenderError::MissingSpan)?;
    if span.start > span.end
        || span.end > original.len()
        || !original.is_char_boundary(span.start)
        || !original.is_char_boundary(span.end)
    {
        return Err(RenderError::SpanOutOfBounds {
            start: span.start,
            end: span.end,
        });
    }
    let replacement = render_template(template, evidence)?;
    let mut fixed = String::with_capacity(original.len() + replacement.len());
    fixed.push_str(&original[..span.start]);
    fixed.push_str(&replacement);
    fixed.push_str(&original[span.end..]);
    Ok(fixed)
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn lookup<'a>(evidence: &'a Evidence, key: &str) -> Result<&'a str, RenderError> {
    if let Some(v) = evidence.captures.get(key) {
        return Ok(v);
    }
    if key == "0" && evidence.span.is_some() {
        return Ok(&evidence.snippet);
    }
    Err(RenderError::UnresolvedToken(key.to_string()))
}

fn apply_filter(value: &str, filter: Option<&str>) -> Result<String, RenderError> {
    match filter {
        None => Ok(value.to_string()),
        Some("lower") => Ok(value.to_lowercase()),
        Some("upper") => Ok(value.to_uppercase()),
        Some("trim") => Ok(value.trim().to_string()),
        Some(other) => Err(RenderError::UnknownFilter(other.to_string())),
    }
}
