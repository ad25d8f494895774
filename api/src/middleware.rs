//! Request/response middleware composed around a connection.
//!
//! Middleware wrap the connection like an onion. The resolved list is folded
//! over the connection so its *first* entry wraps the connection directly and
//! its last entry sees the request first. With the resolver's ordering this
//! means operation-level middleware handle the request last and the response
//! first.

use std::fmt;
use std::sync::Arc;

use crate::connection::Connection;
use crate::error::Error;
use crate::request::{RawResponse, Request};

/// Transforms a request on its way out and the response on its way back.
///
/// ## Examples
///
/// ```rust,ignore
/// use scoped_api::{Connection, Error, Middleware, RawResponse, Request};
///
/// struct Tracing;
///
/// impl Middleware for Tracing {
///     fn call(&self, mut request: Request, next: &dyn Connection) -> Result<RawResponse, Error> {
///         request.headers.insert("X-Request-Id", "42");
///         let response = next.call(request)?;
///         Ok(response.with_header("X-Seen", "1"))
///     }
/// }
/// ```
pub trait Middleware: Send + Sync {
    /// Handles `request`, delegating to `next` for the rest of the stack.
    fn call(&self, request: Request, next: &dyn Connection) -> Result<RawResponse, Error>;

    /// Name used in logs and diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl fmt::Debug for dyn Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Middleware({})", self.name())
    }
}

type Handler = dyn Fn(Request, &dyn Connection) -> Result<RawResponse, Error> + Send + Sync;

/// Middleware built from a closure.
pub struct FnMiddleware {
    name: String,
    handler: Box<Handler>,
}

/// Creates a named middleware from a closure.
///
/// ## Examples
///
/// ```rust
/// use scoped_api::middleware::from_fn;
/// use scoped_api::Connection;
///
/// let tag = from_fn("tag", |mut request, next| {
///     request.headers.insert("X-Tag", "1");
///     next.call(request)
/// });
/// ```
pub fn from_fn<F>(name: impl Into<String>, handler: F) -> Arc<dyn Middleware>
where
    F: Fn(Request, &dyn Connection) -> Result<RawResponse, Error> + Send + Sync + 'static,
{
    Arc::new(FnMiddleware {
        name: name.into(),
        handler: Box::new(handler),
    })
}

impl Middleware for FnMiddleware {
    fn call(&self, request: Request, next: &dyn Connection) -> Result<RawResponse, Error> {
        (self.handler)(request, next)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct Layer {
    middleware: Arc<dyn Middleware>,
    inner: Arc<dyn Connection>,
}

impl Connection for Layer {
    fn call(&self, request: Request) -> Result<RawResponse, Error> {
        tracing::trace!(middleware = self.middleware.name(), "entering middleware");
        self.middleware.call(request, self.inner.as_ref())
    }
}

/// Wraps `connection` with every middleware, the first entry innermost.
pub fn stack(connection: Arc<dyn Connection>, middleware: &[Arc<dyn Middleware>]) -> Arc<dyn Connection> {
    middleware.iter().fold(connection, |inner, middleware| {
        Arc::new(Layer {
            middleware: Arc::clone(middleware),
            inner,
        })
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::connection;
    use crate::format::Format;
    use crate::headers::Headers;
    use crate::method::RestMethod;
    use serde_json::{Map, Value};
    use url::Url;

    fn request() -> Request {
        Request {
            schema: "Cats.fetch".to_string(),
            method: RestMethod::Get,
            url: Url::parse("https://cats.test/cats").unwrap(),
            format: Format::Json,
            headers: Headers::new(),
            query: Map::new(),
            body: Value::Null,
        }
    }

    fn recorder(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Arc<dyn Middleware> {
        from_fn(name, move |request, next| {
            log.lock().unwrap().push(format!("{name}:request"));
            let response = next.call(request)?;
            log.lock().unwrap().push(format!("{name}:response"));
            Ok(response)
        })
    }

    #[test]
    fn test_first_entry_is_closest_to_connection() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let transport_log = Arc::clone(&log);
        let connection = connection::from_fn(move |_request| {
            transport_log.lock().unwrap().push("connection".to_string());
            Ok(RawResponse::new(200, ""))
        });
        let resolved = vec![
            recorder("baz", Arc::clone(&log)),
            recorder("bar", Arc::clone(&log)),
            recorder("foo", Arc::clone(&log)),
        ];

        stack(connection, &resolved).call(request()).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "foo:request",
                "bar:request",
                "baz:request",
                "connection",
                "baz:response",
                "bar:response",
                "foo:response",
            ]
        );
    }

    #[test]
    fn test_middleware_rewrites_request_and_response() {
        let connection = connection::from_fn(|request| {
            let token = request.headers.first("X-Token").unwrap_or_default().to_string();
            Ok(RawResponse::new(200, token))
        });
        let auth = from_fn("auth", |mut request, next| {
            request.headers.insert("X-Token", "secret");
            next.call(request)
        });
        let upcase = from_fn("upcase", |request, next| {
            let mut response = next.call(request)?;
            let upper = response.text().to_uppercase();
            response.body = upper.into();
            Ok(response)
        });

        let response = stack(connection, &[auth, upcase]).call(request()).unwrap();
        assert_eq!(response.text(), "SECRET");
    }

    #[test]
    fn test_empty_stack_is_the_connection() {
        let connection = connection::from_fn(|_request| Ok(RawResponse::new(204, "")));
        assert_eq!(stack(connection, &[]).call(request()).unwrap().status, 204);
    }

    #[test]
    fn test_names() {
        let named = from_fn("retry", |request, next| next.call(request));
        assert_eq!(named.name(), "retry");
        assert_eq!(format!("{named:?}"), "Middleware(retry)");
    }
}
