//! Query resolution.

use serde_json::{Map, Value};

use crate::error::{DefinitionError, Error};
use crate::schema::DefinitionKey;

use super::Context;

/// Deep merges every `query` definition from the root down.
pub fn resolve(cx: &Context<'_>) -> Result<Map<String, Value>, Error> {
    cx.track("query", || {
        let mut query = Map::new();
        for (node, value) in cx.evaluate(DefinitionKey::Query)? {
            match value {
                Value::Null => {}
                Value::Object(map) => deep_merge(&mut query, map),
                other => {
                    return Err(DefinitionError::InvalidQuery {
                        schema: node.full_name().to_string(),
                        message: format!("expected a mapping, got {other}"),
                    }
                    .into())
                }
            }
        }
        Ok(query)
    })
}

/// Merges `right` into `left` key by key.
///
/// Nested mappings are merged recursively; when either side is not a
/// mapping the right value replaces the left one.
pub fn deep_merge(left: &mut Map<String, Value>, right: Map<String, Value>) {
    for (key, value) in right {
        match value {
            Value::Object(incoming) => match left.get_mut(&key) {
                Some(Value::Object(existing)) => deep_merge(existing, incoming),
                _ => {
                    left.insert(key, Value::Object(incoming));
                }
            },
            value => {
                left.insert(key, value);
            }
        }
    }
}
