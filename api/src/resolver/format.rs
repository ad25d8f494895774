//! Body format resolution.

use std::str::FromStr;

use serde_json::Value;

use crate::error::{DefinitionError, Error};
use crate::format::Format;
use crate::schema::DefinitionKey;

use super::Context;

/// Resolves the most specific `format` definition, json by default.
pub fn resolve(cx: &Context<'_>) -> Result<Format, Error> {
    cx.track("format", || {
        let value = match cx.evaluate_last(DefinitionKey::Format)? {
            None | Some(Value::Null) => return Ok(Format::default()),
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
        };
        Format::from_str(&value).map_err(|_| {
            DefinitionError::InvalidFormat {
                schema: cx.schema_name().to_string(),
                value,
            }
            .into()
        })
    })
}
