//! Body and query encoders.
//!
//! The resolvers hand over plain `serde_json` values; these functions turn
//! them into wire-ready strings for each [`Format`]. Multipart bodies are
//! built as a `reqwest` form instead, which owns the boundary and escaping.

use reqwest::blocking::multipart::{Form, Part};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::ConnectionError;
use crate::format::Format;

/// An encoded payload together with its Content-Type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// The Content-Type header value.
    pub content_type: String,
    /// The encoded body.
    pub body: String,
}

/// Encodes a resolved body in the given format.
///
/// ## Errors
///
/// Returns [`ConnectionError::Encode`] when the value cannot be represented
/// in the format, e.g. a scalar sent as a form. [`Format::Multipart`] is
/// always rejected; use [`multipart`].
pub fn encode(value: &Value, format: Format) -> Result<Encoded, ConnectionError> {
    let body = match format {
        Format::Json => {
            serde_json::to_string(value).map_err(|e| ConnectionError::encode(format, e))?
        }
        Format::Yaml => {
            serde_yaml::to_string(value).map_err(|e| ConnectionError::encode(format, e))?
        }
        Format::Form => match value {
            Value::Object(map) => encode_query(map),
            other => {
                return Err(ConnectionError::encode(
                    format,
                    format!("expected a mapping, got {other}"),
                ))
            }
        },
        Format::Text => match value {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        },
        Format::Multipart => {
            return Err(ConnectionError::encode(
                format,
                "multipart bodies are sent as forms, not encoded text",
            ))
        }
    };

    Ok(Encoded {
        content_type: format.content_type().to_string(),
        body,
    })
}

/// Encodes a query mapping with bracketed keys for nesting.
///
/// `{"user": {"name": "x"}, "ids": [1, 2]}` becomes
/// `user[name]=x&ids[]=1&ids[]=2`.
pub fn encode_query(query: &Map<String, Value>) -> String {
    let mut pairs = Vec::new();
    for (key, value) in query {
        flatten(key.clone(), value, &mut pairs);
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn flatten(key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (child, nested) in map {
                flatten(format!("{key}[{child}]"), nested, pairs);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten(format!("{key}[]"), item, pairs);
            }
        }
        Value::Null => pairs.push((key, String::new())),
        Value::String(text) => pairs.push((key, text.clone())),
        other => pairs.push((key, other.to_string())),
    }
}

/// Builds a multipart form from a mapping of part names to values.
///
/// Strings become text parts, `null` an empty text part, anything else a
/// JSON part.
///
/// ## Errors
///
/// Returns [`ConnectionError::Encode`] when `value` is not a mapping.
pub fn multipart(value: &Value) -> Result<Form, ConnectionError> {
    let Value::Object(parts) = value else {
        return Err(ConnectionError::encode(
            Format::Multipart,
            format!("expected a mapping of parts, got {value}"),
        ));
    };

    let mut form = Form::new();
    for (name, part) in parts {
        form = match part {
            Value::String(text) => form.text(name.clone(), text.clone()),
            Value::Null => form.text(name.clone(), String::new()),
            other => {
                let part = Part::text(other.to_string())
                    .mime_str(Format::Json.content_type())
                    .map_err(|e| ConnectionError::encode(Format::Multipart, e))?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json() {
        let encoded = encode(&json!({"name": "Tom"}), Format::Json).unwrap();
        assert_eq!(encoded.body, r#"{"name":"Tom"}"#);
        assert_eq!(encoded.content_type, "application/json");
    }

    #[test]
    fn test_yaml() {
        let encoded = encode(&json!({"name": "Tom"}), Format::Yaml).unwrap();
        assert_eq!(encoded.body.trim(), "name: Tom");
    }

    #[test]
    fn test_form_nested() {
        let encoded = encode(
            &json!({"user": {"name": "Tom Cat"}, "ids": [1, 2]}),
            Format::Form,
        )
        .unwrap();
        assert_eq!(
            encoded.body,
            "ids%5B%5D=1&ids%5B%5D=2&user%5Bname%5D=Tom+Cat"
        );
    }

    #[test]
    fn test_form_rejects_scalar() {
        let err = encode(&json!("plain"), Format::Form).unwrap_err();
        assert!(err.is_encoding());
    }

    #[test]
    fn test_text() {
        assert_eq!(encode(&json!("hi"), Format::Text).unwrap().body, "hi");
        assert_eq!(encode(&json!(12), Format::Text).unwrap().body, "12");
    }

    #[test]
    fn test_multipart_is_not_text() {
        let err = encode(&json!({"title": "Kitty"}), Format::Multipart).unwrap_err();
        assert!(err.is_encoding());
    }

    #[test]
    fn test_multipart_form() {
        let form = multipart(&json!({"title": "Kitty", "meta": {"age": 2}, "note": null})).unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn test_multipart_rejects_scalar() {
        let err = multipart(&json!("Kitty")).unwrap_err();
        assert!(err.is_encoding());
    }

    #[test]
    fn test_query_null_value() {
        let Value::Object(query) = json!({"flag": null}) else {
            unreachable!()
        };
        assert_eq!(encode_query(&query), "flag=");
    }
}
