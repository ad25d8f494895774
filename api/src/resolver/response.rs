//! Response coercion.

use serde_json::Value;

use crate::error::{Error, ResponseError, UnexpectedResponseError};
use crate::request::RawResponse;

use super::Context;

/// Coerces `response` with the most specific handler for its status.
///
/// ## Errors
///
/// - [`UnexpectedResponseError`] if no node in the lineage declares the status
/// - [`ResponseError`] wrapping the coerced value if the handler raises
/// - whatever the coercer itself fails with
pub fn resolve(cx: &Context<'_>, response: RawResponse) -> Result<Value, Error> {
    cx.track("response", || {
        let status = response.status;
        let handler = cx
            .lineage()
            .rev()
            .find_map(|node| node.definitions().response(status));
        let Some(handler) = handler else {
            return Err(UnexpectedResponseError {
                schema: cx.schema_name().to_string(),
                settings: cx.settings.options().clone(),
                response,
            }
            .into());
        };

        let data = (handler.coercer)(cx.settings, &response)?;
        if handler.raise {
            return Err(ResponseError {
                schema: cx.schema_name().to_string(),
                settings: cx.settings.options().clone(),
                status,
                data,
            }
            .into());
        }
        Ok(data)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::testing::{logged, settings, two_levels};
    use crate::schema::ResponseOptions;
    use serde_json::json;

    fn schema() -> (std::sync::Arc<crate::schema::Schema>, crate::schema::NodeId) {
        two_levels(
            |root| {
                root.response(500, ResponseOptions::raising(), |_, r| Ok(r.text().into_owned()))
                    .response(200, ResponseOptions::default(), |_, _| Ok("root"));
                Ok(())
            },
            |op| {
                op.response(200, ResponseOptions::default(), |_, r| r.json::<Value>().map_err(Error::from))
                    .response(404, ResponseOptions::raising(), |_, r| Ok(json!({"missing": r.text()})));
                Ok(())
            },
        )
    }

    #[test]
    fn test_registered_status_returns_coerced_value() {
        let (schema, op) = schema();
        let settings = settings(&schema, op, json!({}));
        let value = resolve(
            &Context::new(&schema, op, &settings),
            RawResponse::new(200, r#"{"id": 1}"#),
        )
        .unwrap();
        assert_eq!(value, json!({"id": 1}));
    }

    #[test]
    fn test_raising_status_wraps_coerced_value() {
        let (schema, op) = schema();
        let settings = settings(&schema, op, json!({"trace": "t1"}));
        let err = resolve(&Context::new(&schema, op, &settings), RawResponse::new(404, "cat"))
            .unwrap_err();
        let Error::Response(err) = err else {
            panic!("expected a response error");
        };
        assert_eq!(err.status, 404);
        assert_eq!(err.data, json!({"missing": "cat"}));
        assert_eq!(err.schema, "Test.op");
        assert_eq!(err.settings.get("trace"), Some(&json!("t1")));
    }

    #[test]
    fn test_inherited_status() {
        let (schema, op) = schema();
        let settings = settings(&schema, op, json!({}));
        let err = resolve(&Context::new(&schema, op, &settings), RawResponse::new(500, "boom"))
            .unwrap_err();
        assert!(matches!(err, Error::Response(ResponseError { status: 500, ref data, .. }) if data == "boom"));
    }

    #[test]
    fn test_unregistered_status_carries_raw_response() {
        let (schema, op) = schema();
        let (settings, logger) = logged(&schema, op, json!({}));
        let err = resolve(&Context::new(&schema, op, &settings), RawResponse::new(418, "teapot"))
            .unwrap_err();
        let Error::UnexpectedResponse(err) = err else {
            panic!("expected an unexpected response error");
        };
        assert_eq!(err.status(), 418);
        assert_eq!(err.response.text(), "teapot");
        assert!(logger.lines()[0].starts_with("ERROR response:"));
    }

    #[test]
    fn test_coercer_failure_propagates() {
        let (schema, op) = schema();
        let settings = settings(&schema, op, json!({}));
        let err = resolve(&Context::new(&schema, op, &settings), RawResponse::new(200, "not json"))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Connection);
    }
}
