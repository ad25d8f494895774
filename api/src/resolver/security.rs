//! Security schema resolution.

use serde_json::{Map, Value};

use crate::error::{DefinitionError, Error};
use crate::headers::Headers;
use crate::schema::DefinitionKey;

use super::headers::to_headers;
use super::query::deep_merge;
use super::Context;

const PARTS: [&str; 3] = ["headers", "query", "body"];

/// Headers, query parameters and body fields contributed by `security`
/// definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Security {
    pub headers: Headers,
    pub query: Map<String, Value>,
    pub body: Map<String, Value>,
}

impl Security {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.query.is_empty() && self.body.is_empty()
    }

    fn merge(&mut self, schema: &str, parts: Map<String, Value>) -> Result<(), Error> {
        for (part, content) in parts {
            match (part.as_str(), content) {
                ("headers", content) => self.headers.merge(to_headers(schema, &content)?),
                ("query", Value::Object(content)) => deep_merge(&mut self.query, content),
                ("body", Value::Object(content)) => deep_merge(&mut self.body, content),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Accumulates every `security` definition from the root down.
///
/// Each definition may be a schema, a list of schemas or `null`, which drops
/// everything accumulated so far. Headers are merged in definition order
/// with case-insensitive names, query and body parts are deep merged.
///
/// ## Errors
///
/// [`DefinitionError::InvalidSecurity`] for a part outside of `headers`,
/// `query` and `body`, or for a part that is not a mapping.
pub fn resolve(cx: &Context<'_>) -> Result<Security, Error> {
    cx.track("security", || {
        let mut security = Security::default();
        for (node, value) in cx.evaluate(DefinitionKey::Security)? {
            let schema = node.full_name();
            match value {
                Value::Null => security = Security::default(),
                Value::Array(items) => {
                    for item in items {
                        security.merge(schema, normalize(schema, item)?)?;
                    }
                }
                value => security.merge(schema, normalize(schema, value)?)?,
            }
        }
        Ok(security)
    })
}

fn normalize(schema: &str, value: Value) -> Result<Map<String, Value>, Error> {
    let invalid = |message: String| -> Error {
        DefinitionError::InvalidSecurity {
            schema: schema.to_string(),
            message,
        }
        .into()
    };
    let Value::Object(map) = value else {
        return Err(invalid(format!("expected a mapping, got {value}")));
    };
    for (part, content) in &map {
        if !PARTS.contains(&part.as_str()) {
            return Err(invalid(format!(
                "unknown part '{part}', expected one of headers, query, body"
            )));
        }
        if !content.is_object() {
            return Err(invalid(format!("part '{part}' must be a mapping, got {content}")));
        }
    }
    Ok(map)
}
