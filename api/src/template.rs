//! `{placeholder}` templates for base URLs and paths.
//!
//! Literal `base_url` and `path` definitions may reference settings by name:
//! `"https://h.test/v{version}"` or `"users/{id}"`.

use crate::error::Error;
use crate::settings::Settings;

/// Extracts placeholder names in the order they appear.
///
/// Braces that do not enclose an identifier are left alone.
pub fn placeholders(template: &str) -> Vec<&str> {
    segments(template)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Substitutes every placeholder with the matching setting rendered as text.
///
/// ## Errors
///
/// Fails with a definition error when a placeholder names a setting that is
/// not declared.
pub fn interpolate(template: &str, settings: &Settings) -> Result<String, Error> {
    let mut output = String::with_capacity(template.len());
    for segment in segments(template) {
        match segment {
            Segment::Literal(text) => output.push_str(text),
            Segment::Placeholder(name) => output.push_str(&settings.text(name)?),
        }
    }
    Ok(output)
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let name = &after[..close];
        if is_placeholder(name) {
            if open > 0 {
                segments.push(Segment::Literal(&rest[..open]));
            }
            segments.push(Segment::Placeholder(name));
        } else {
            segments.push(Segment::Literal(&rest[..open + close + 2]));
        }
        rest = &after[close + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

fn is_placeholder(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
