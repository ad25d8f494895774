//! Default blocking HTTP transport built on `reqwest`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue as WireValue, CONTENT_TYPE};
use tracing::{instrument, Span};

use crate::error::{ConnectionError, Error};
use crate::format::Format;
use crate::headers::Headers;
use crate::request::{RawResponse, Request};

use super::Connection;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for configuring an [`HttpConnection`].
#[derive(Debug)]
pub struct HttpConnectionBuilder {
    timeout: Duration,
    default_headers: HeaderMap,
    user_agent: Option<String>,
}

impl Default for HttpConnectionBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: HeaderMap::new(),
            user_agent: None,
        }
    }
}

impl HttpConnectionBuilder {
    /// Sets the request timeout.
    ///
    /// ## Examples
    ///
    /// ```rust,ignore
    /// use std::time::Duration;
    ///
    /// let connection = HttpConnection::builder()
    ///     .timeout(Duration::from_secs(60))
    ///     .build()?;
    /// ```
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every request unless the request sets it.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, Error> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| ConnectionError::Connection(format!("invalid header name: {e}")))?;
        let value = WireValue::try_from(value.as_ref())
            .map_err(|e| ConnectionError::Connection(format!("invalid header value: {e}")))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the [`HttpConnection`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpConnection, Error> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build().map_err(ConnectionError::Request)?;
        Ok(HttpConnection { client })
    }
}

/// Blocking HTTP connection used when a client does not configure its own.
///
/// Encodes the body according to the request format and appends the
/// resolved query to the URL.
#[derive(Debug, Clone)]
pub struct HttpConnection {
    client: reqwest::blocking::Client,
}

impl HttpConnection {
    /// Creates a new builder for configuring a connection.
    pub fn builder() -> HttpConnectionBuilder {
        HttpConnectionBuilder::default()
    }

    /// Creates a connection with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }
}

impl Connection for HttpConnection {
    #[instrument(
        name = "http_connection",
        skip(self, request),
        fields(
            http.method = %request.method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
        )
    )]
    fn call(&self, request: Request) -> Result<RawResponse, Error> {
        let url = request.full_url();
        Span::current().record("http.url", url.as_str());

        let mut builder = self.client.request(request.method.to_reqwest(), url);
        for (name, value) in request.headers.iter() {
            for item in value.iter() {
                builder = builder.header(name, item);
            }
        }
        if request.format == Format::Multipart {
            if let Some(form) = request.multipart_form()? {
                builder = builder.multipart(form);
            }
        } else if let Some(encoded) = request.encoded_body()? {
            if !request.headers.contains_key(CONTENT_TYPE.as_str()) {
                builder = builder.header(CONTENT_TYPE, encoded.content_type);
            }
            builder = builder.body(encoded.body);
        }

        let response = builder.send().map_err(ConnectionError::Request)?;
        let status = response.status().as_u16();
        Span::current().record("http.status_code", status);

        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        let body = response.bytes().map_err(ConnectionError::Request)?;
        tracing::debug!(status, bytes = body.len(), "received response");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

impl Default for HttpConnection {
    fn default() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}
