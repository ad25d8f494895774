//! Errors synthesized from remote responses.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::request::RawResponse;

/// The server answered with a status declared with `raise: true`.
///
/// `data` holds the value produced by the status coercer.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Response with status {status} from {schema} is declared as an error: {data}")]
pub struct ResponseError {
    /// The operation that was called.
    pub schema: String,
    /// Option values of the operation settings.
    pub settings: Map<String, Value>,
    /// The HTTP status received.
    pub status: u16,
    /// The coerced response.
    pub data: Value,
}

/// The server answered with a status no node in the chain declares.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "Unexpected response with status {} from {schema} for settings {}",
    status_of(.response),
    render_settings(.settings)
)]
pub struct UnexpectedResponseError {
    /// The operation that was called.
    pub schema: String,
    /// Option values of the operation settings.
    pub settings: Map<String, Value>,
    /// The raw response as returned by the connection.
    pub response: RawResponse,
}

fn status_of(response: &RawResponse) -> u16 {
    response.status
}

fn render_settings(settings: &Map<String, Value>) -> String {
    Value::Object(settings.clone()).to_string()
}

impl UnexpectedResponseError {
    /// Returns the HTTP status received.
    pub fn status(&self) -> u16 {
        self.response.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_error_display() {
        let err = ResponseError {
            schema: "Cats.fetch".to_string(),
            settings: Map::new(),
            status: 404,
            data: json!({"error": "not found"}),
        };
        assert_eq!(
            err.to_string(),
            r#"Response with status 404 from Cats.fetch is declared as an error: {"error":"not found"}"#
        );
    }

    #[test]
    fn test_unexpected_response_display() {
        let err = UnexpectedResponseError {
            schema: "Cats.fetch".to_string(),
            settings: json!({"id": 7}).as_object().cloned().unwrap(),
            response: RawResponse::new(500, "boom"),
        };
        assert_eq!(err.status(), 500);
        assert_eq!(
            err.to_string(),
            r#"Unexpected response with status 500 from Cats.fetch for settings {"id":7}"#
        );
    }
}
