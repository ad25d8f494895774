//! Base URL and path resolution.

use serde_json::Value;
use url::Url;

use crate::error::{DefinitionError, Error};
use crate::schema::DefinitionKey;

use super::Context;

/// Resolves the absolute URL of the called operation.
///
/// The most specific `base_url` is taken as the start, then every `path`
/// segment is appended from the root down, separated by a single `/`. A
/// segment that is itself an absolute URL replaces everything before it.
///
/// ## Errors
///
/// - [`DefinitionError::MissingUri`] if nothing was defined
/// - [`DefinitionError::InvalidPath`] for a segment that is not text
/// - [`DefinitionError::InvalidUri`] if the result does not parse
pub fn resolve(cx: &Context<'_>) -> Result<Url, Error> {
    cx.track("uri", || {
        let schema = cx.schema_name();
        let mut uri = match cx.evaluate_last(DefinitionKey::BaseUrl)? {
            Some(value) => segment(schema, value)?,
            None => None,
        };
        for (_, value) in cx.evaluate(DefinitionKey::Path)? {
            if let Some(segment) = segment(schema, value)? {
                uri = Some(join(uri, segment));
            }
        }

        let uri = uri
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| DefinitionError::MissingUri {
                schema: schema.to_string(),
            })?;
        Url::parse(&uri).map_err(|source| {
            DefinitionError::InvalidUri {
                schema: schema.to_string(),
                uri,
                source,
            }
            .into()
        })
    })
}

fn segment(schema: &str, value: Value) -> Result<Option<String>, Error> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) if text.is_empty() => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        other => Err(DefinitionError::InvalidPath {
            schema: schema.to_string(),
            value: other.to_string(),
        }
        .into()),
    }
}

fn is_absolute(segment: &str) -> bool {
    segment.contains("://") && Url::parse(segment).is_ok()
}

fn join(base: Option<String>, segment: String) -> String {
    match base {
        Some(base) if !is_absolute(&segment) => {
            format!("{}/{}", base.trim_end_matches('/'), segment.trim_start_matches('/'))
        }
        _ => segment,
    }
}
