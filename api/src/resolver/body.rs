//! Body resolution.

use serde_json::Value;

use crate::error::Error;
use crate::schema::DefinitionKey;

use super::Context;

/// Resolves the most specific `body` definition; bodies are never merged.
pub fn resolve(cx: &Context<'_>) -> Result<Value, Error> {
    cx.track("body", || {
        Ok(cx.evaluate_last(DefinitionKey::Body)?.unwrap_or(Value::Null))
    })
}
