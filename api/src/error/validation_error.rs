//! Settings validator failures.

use serde_json::{Map, Value};
use thiserror::Error;

/// A validator declared on a schema node rejected the constructed settings.
///
/// Carries the validator key, the schema it was declared for, and a snapshot
/// of the option values that were being validated.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Validation '{key}' failed for {schema} with options {}", render_options(.options))]
pub struct ValidationError {
    /// The validator key.
    pub key: String,
    /// The schema node whose settings were rejected.
    pub schema: String,
    /// Option values at the time of validation.
    pub options: Map<String, Value>,
}

fn render_options(options: &Map<String, Value>) -> String {
    Value::Object(options.clone()).to_string()
}
