//! HTTP method resolution.

use serde_json::Value;

use crate::error::{DefinitionError, Error};
use crate::method::RestMethod;
use crate::schema::DefinitionKey;

use super::Context;

/// Resolves the most specific `http_method` definition.
///
/// Any case of a known verb is accepted.
pub fn resolve(cx: &Context<'_>) -> Result<RestMethod, Error> {
    cx.track("http_method", || {
        let schema = cx.schema_name();
        let value = match cx.evaluate_last(DefinitionKey::HttpMethod)? {
            None | Some(Value::Null) => {
                return Err(DefinitionError::MissingHttpMethod {
                    schema: schema.to_string(),
                }
                .into())
            }
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
        };
        RestMethod::parse_loose(&value).ok_or_else(|| {
            DefinitionError::InvalidHttpMethod {
                schema: schema.to_string(),
                value,
            }
            .into()
        })
    })
}
