//! The transport a resolved request is finally handed to.

mod http;

pub use http::{HttpConnection, HttpConnectionBuilder};

use std::sync::Arc;

use crate::error::Error;
use crate::request::{RawResponse, Request};

/// Sends a resolved request and returns the raw response.
///
/// Implementations are synchronous and return transport failures unchanged.
/// Any `Fn(Request) -> Result<RawResponse, Error>` closure is a connection,
/// which is handy for stubbing.
pub trait Connection: Send + Sync {
    /// Performs the request.
    fn call(&self, request: Request) -> Result<RawResponse, Error>;
}

impl<F> Connection for F
where
    F: Fn(Request) -> Result<RawResponse, Error> + Send + Sync,
{
    fn call(&self, request: Request) -> Result<RawResponse, Error> {
        self(request)
    }
}

/// Turns a closure into a shared connection.
///
/// ## Examples
///
/// ```rust
/// use scoped_api::{connection, RawResponse};
///
/// let stub = connection::from_fn(|request| {
///     Ok(RawResponse::new(200, request.url.to_string()))
/// });
/// ```
pub fn from_fn<F>(f: F) -> Arc<dyn Connection>
where
    F: Fn(Request) -> Result<RawResponse, Error> + Send + Sync + 'static,
{
    Arc::new(f)
}
