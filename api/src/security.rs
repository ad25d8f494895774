//! Helpers producing security schemas for `security_with` definitions.
//!
//! A security schema is a mapping restricted to `headers`, `query` and
//! `body` parts, each itself a mapping. The security resolver merges every
//! schema in the chain and validates the result.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

/// Where a credential is placed in the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    /// In a header.
    #[default]
    Headers,
    /// In a query parameter.
    Query,
}

/// Options for [`token_auth`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenAuth {
    /// Scheme prepended to the token in the Authorization header,
    /// e.g. `Bearer`.
    pub prefix: Option<String>,
    /// Where to put the token.
    pub using: Placement,
}

impl TokenAuth {
    /// A bearer token in the Authorization header.
    pub fn bearer() -> Self {
        Self {
            prefix: Some("Bearer".to_string()),
            using: Placement::Headers,
        }
    }

    /// An `access_token` query parameter.
    pub fn query() -> Self {
        Self {
            prefix: None,
            using: Placement::Query,
        }
    }
}

/// HTTP basic authentication: `Authorization: Basic base64(user:password)`.
///
/// ## Examples
///
/// ```rust
/// use scoped_api::security::basic_auth;
/// use serde_json::json;
///
/// assert_eq!(
///     basic_auth("foo", "bar"),
///     json!({"headers": {"Authorization": "Basic Zm9vOmJhcg=="}})
/// );
/// ```
pub fn basic_auth(user: &str, password: &str) -> Value {
    let credentials = STANDARD.encode(format!("{user}:{password}"));
    json!({"headers": {"Authorization": format!("Basic {credentials}")}})
}

/// Token authentication in the Authorization header or the `access_token`
/// query parameter.
pub fn token_auth(token: &str, options: TokenAuth) -> Value {
    match options.using {
        Placement::Headers => {
            let value = match options.prefix.as_deref() {
                Some(prefix) if !prefix.is_empty() => format!("{prefix} {token}"),
                _ => token.to_string(),
            };
            json!({"headers": {"Authorization": value}})
        }
        Placement::Query => json!({"query": {"access_token": token}}),
    }
}

/// An arbitrary key/value credential in a header or query parameter.
pub fn key_auth(key: &str, value: &str, using: Placement) -> Value {
    let part = match using {
        Placement::Headers => "headers",
        Placement::Query => "query",
    };
    json!({ part: { key: value } })
}
