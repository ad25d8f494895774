//! Header resolution.

use serde_json::Value;

use crate::error::{DefinitionError, Error};
use crate::headers::{HeaderValue, Headers};
use crate::schema::DefinitionKey;

use super::Context;

/// Merges every `headers` definition from the root down.
///
/// Later keys replace earlier ones regardless of case, and headers whose
/// final value is `null`, empty or an empty list are dropped.
pub fn resolve(cx: &Context<'_>) -> Result<Headers, Error> {
    cx.track("headers", || {
        let mut headers = Headers::new();
        for (node, value) in cx.evaluate(DefinitionKey::Headers)? {
            headers.merge(to_headers(node.full_name(), &value)?);
        }
        headers.prune();
        Ok(headers)
    })
}

/// Converts a definition value into headers, keeping blank values so that
/// they can override (and later prune) inherited ones.
pub(crate) fn to_headers(schema: &str, value: &Value) -> Result<Headers, Error> {
    let invalid = |message: String| DefinitionError::InvalidHeaders {
        schema: schema.to_string(),
        message,
    };
    match value {
        Value::Null => Ok(Headers::new()),
        Value::Object(map) => {
            let mut headers = Headers::new();
            for (name, value) in map {
                let value = HeaderValue::from_value(value)
                    .map_err(|message| invalid(format!("header '{name}': {message}")))?
                    .unwrap_or_else(|| HeaderValue::Single(String::new()));
                headers.insert(name.clone(), value);
            }
            Ok(headers)
        }
        other => Err(invalid(format!("expected a mapping, got {other}")).into()),
    }
}
