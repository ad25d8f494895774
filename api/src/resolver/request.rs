//! Assembly of the full request environment.

use serde_json::Value;

use crate::error::Error;
use crate::request::Request;

use super::query::deep_merge;
use super::Context;

/// Resolves every request fragment and applies the security schema on top.
///
/// Security headers, query parameters and body fields win over the plain
/// definitions.
pub fn resolve(cx: &Context<'_>) -> Result<Request, Error> {
    let url = super::uri(cx)?;
    let method = super::http_method(cx)?;
    let format = super::format(cx)?;
    let mut headers = super::headers(cx)?;
    let mut query = super::query(cx)?;
    let mut body = super::body(cx)?;
    let security = super::security(cx)?;

    cx.track("request", || {
        headers.merge(security.headers);
        headers.prune();
        deep_merge(&mut query, security.query);
        if !security.body.is_empty() {
            if let Value::Object(existing) = &mut body {
                deep_merge(existing, security.body);
            } else {
                body = Value::Object(security.body);
            }
        }
        Ok(Request {
            schema: cx.schema_name().to_string(),
            method,
            url,
            format,
            headers,
            query,
            body,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use crate::method::RestMethod;
    use crate::resolver::testing::{settings, two_levels};
    use crate::security::{basic_auth, token_auth, TokenAuth};
    use crate::settings::OptionDef;
    use serde_json::json;

    #[test]
    fn test_full_request() {
        let (schema, op) = two_levels(
            |root| {
                root.option("user", OptionDef::string())?
                    .option("password", OptionDef::string())?
                    .base_url("https://h.test")
                    .headers(json!({"Accept": "application/json", "Authorization": "none"}))
                    .query(json!({"page": {"size": 10}}))
                    .security_with(|s| Ok(basic_auth(&s.text("user")?, &s.text("password")?)));
                Ok(())
            },
            |op| {
                op.path("cats")
                    .http_method(RestMethod::Post)
                    .format(Format::Form)
                    .query(json!({"page": {"number": 2}}))
                    .body(json!({"name": "Tom"}));
                Ok(())
            },
        );
        let settings = settings(&schema, op, json!({"user": "ann", "password": "pw"}));
        let request = resolve(&Context::new(&schema, op, &settings)).unwrap();

        assert_eq!(request.schema, "Test.op");
        assert_eq!(request.method, RestMethod::Post);
        assert_eq!(request.url.as_str(), "https://h.test/cats");
        assert_eq!(request.format, Format::Form);
        assert_eq!(request.headers.first("Accept"), Some("application/json"));
        assert_eq!(request.headers.first("authorization"), Some("Basic YW5uOnB3"));
        assert_eq!(Value::Object(request.query), json!({"page": {"size": 10, "number": 2}}));
        assert_eq!(request.body, json!({"name": "Tom"}));
    }

    #[test]
    fn test_security_query_and_body() {
        let (schema, op) = two_levels(
            |root| {
                root.base_url("https://h.test")
                    .http_method(RestMethod::Get)
                    .query(json!({"access_token": "plain"}))
                    .security(json!([
                        token_auth("t0k", TokenAuth::query()),
                        {"body": {"client_id": "c1"}}
                    ]));
                Ok(())
            },
            |_| Ok(()),
        );
        let settings = settings(&schema, op, json!({}));
        let request = resolve(&Context::new(&schema, op, &settings)).unwrap();
        assert_eq!(request.query.get("access_token"), Some(&json!("t0k")));
        assert_eq!(request.body, json!({"client_id": "c1"}));
    }

    #[test]
    fn test_security_header_overrides_plain_header_of_other_case() {
        let (schema, op) = two_levels(
            |root| {
                root.base_url("https://h.test")
                    .http_method(RestMethod::Get)
                    .headers(json!({"x-api-key": "plain"}))
                    .security(json!({"headers": {"authorization": "root"}}));
                Ok(())
            },
            |op| {
                op.security(json!({"headers": {"Authorization": "leaf", "X-API-KEY": "secret"}}));
                Ok(())
            },
        );
        let settings = settings(&schema, op, json!({}));
        let request = resolve(&Context::new(&schema, op, &settings)).unwrap();
        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.headers.first("authorization"), Some("leaf"));
        assert_eq!(request.headers.first("x-api-key"), Some("secret"));
    }

    #[test]
    fn test_first_failing_fragment_is_returned() {
        let (schema, op) = two_levels(
            |root| {
                root.base_url("https://h.test");
                Ok(())
            },
            |_| Ok(()),
        );
        let settings = settings(&schema, op, json!({}));
        let err = resolve(&Context::new(&schema, op, &settings)).unwrap_err();
        assert_eq!(err.to_string(), "HTTP method is not defined for Test.op");
    }
}
