//! The resolved request environment and the raw response tuple.

use std::borrow::Cow;

use bytes::Bytes;
use reqwest::blocking::multipart::Form;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use url::Url;

use crate::error::ConnectionError;
use crate::format::Format;
use crate::formatter::{self, Encoded};
use crate::headers::{HeaderValue, Headers};
use crate::method::RestMethod;

/// Everything needed to send one operation call.
///
/// Built fresh for every call by the request resolver. Middleware receive it
/// by value and may rewrite any field before passing it on.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Name of the operation this request was resolved for.
    pub schema: String,
    /// HTTP method.
    pub method: RestMethod,
    /// Absolute URL, without the resolved query.
    pub url: Url,
    /// Body format.
    pub format: Format,
    /// Merged headers.
    pub headers: Headers,
    /// Merged query.
    pub query: Map<String, Value>,
    /// Body before serialization; `Value::Null` means no body.
    pub body: Value,
}

impl Request {
    /// Returns the URL with the resolved query appended to any query the URL
    /// already carries.
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            let encoded = formatter::encode_query(&self.query);
            let combined = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
                _ => encoded,
            };
            url.set_query(Some(&combined));
        }
        url
    }

    /// Encodes the body according to [`Request::format`].
    ///
    /// Returns `None` when there is no body to send. Multipart bodies are
    /// rejected here; they go through [`Request::multipart_form`].
    pub fn encoded_body(&self) -> Result<Option<Encoded>, ConnectionError> {
        if self.body.is_null() {
            return Ok(None);
        }
        formatter::encode(&self.body, self.format).map(Some)
    }

    /// Builds the multipart form for a body, or `None` when there is none.
    pub fn multipart_form(&self) -> Result<Option<Form>, ConnectionError> {
        if self.body.is_null() {
            return Ok(None);
        }
        formatter::multipart(&self.body).map(Some)
    }
}

/// A response as returned by a connection: status, headers and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// Raw body.
    pub body: Bytes,
}

impl RawResponse {
    /// Creates a response without headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Parses the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Represents the whole response as `{status, headers, body}`.
    ///
    /// This is what a `response` declared without a coercer returns.
    pub fn to_value(&self) -> Value {
        json!({
            "status": self.status,
            "headers": self.headers,
            "body": self.text(),
        })
    }
}
