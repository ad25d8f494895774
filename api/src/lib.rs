//! Declarative, layered definitions for REST API clients.
//!
//! The `scoped_api` crate describes a remote API as a tree of scopes and
//! operations. Every node declares settings options and request fragments
//! (base URL, path, method, format, security, headers, query, body,
//! middleware, responses). Calling an operation resolves those fragments
//! along the node's lineage into a single request, sends it through the
//! middleware stack and coerces the response by status code.
//!
//! ## Features
//!
//! - **Settings inheritance**: options declared on a scope are available to
//!   everything below it, validators accumulate
//! - **Layered resolution**: most specific wins for method, format and body;
//!   headers and queries merge; middleware and security accumulate
//! - **Pluggable transport**: any [`Connection`], a blocking `reqwest`
//!   [`HttpConnection`] by default
//! - **Layered error handling**: one error kind per failure mode
//!
//! ## Example
//!
//! ```rust
//! use scoped_api::{connection, security, Client, OptionDef, RawResponse, ResponseOptions, RestMethod, Schema};
//! use serde_json::{json, Value};
//!
//! let schema = Schema::define("Crm", |root| {
//!     root.option("user", OptionDef::string())?
//!         .option("password", OptionDef::string())?
//!         .base_url("https://h.test/v{version}")
//!         .security_with(|s| Ok(security::basic_auth(&s.text("user")?, &s.text("password")?)));
//!     root.scope("crm", |crm| {
//!         crm.option("version", OptionDef::integer())?;
//!         crm.scope("users", |users| {
//!             users.path("users");
//!             users.operation("fetch", |fetch| {
//!                 fetch
//!                     .option("id", OptionDef::integer())?
//!                     .path("{id}")
//!                     .http_method(RestMethod::Get)
//!                     .response(200, ResponseOptions::default(), |_, r| Ok(r.text().into_owned()));
//!                 Ok(())
//!             })?;
//!             Ok(())
//!         })?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//!
//! let client = Client::builder(schema)
//!     .connection(connection::from_fn(|request| Ok(RawResponse::new(200, request.url.to_string()))))
//!     .build(json!({"user": "ann", "password": "pw"}))?;
//!
//! let url = client
//!     .scope("crm", json!({"version": 4}))?
//!     .scope("users", Value::Null)?
//!     .call("fetch", json!({"id": 7}))?;
//! assert_eq!(url, json!("https://h.test/v4/users/7"));
//! # Ok::<(), scoped_api::Error>(())
//! ```

pub mod client;
pub mod connection;
pub mod container;
pub mod error;
pub mod format;
pub mod formatter;
pub mod headers;
pub mod logger;
pub mod method;
pub mod middleware;
pub mod names;
pub mod request;
pub mod resolver;
pub mod schema;
pub mod security;
pub mod settings;
pub mod template;

// Re-exports for convenience
pub use client::{Client, ClientBuilder};
pub use connection::{Connection, HttpConnection, HttpConnectionBuilder};
pub use container::{Builder, Container, OperationContainer, ScopeContainer};
pub use error::{
    ConnectionError, DefinitionError, Error, ErrorKind, KeyError, NameError, ResponseError, TypeError,
    UnexpectedResponseError, ValidationError,
};
pub use format::Format;
pub use headers::{HeaderValue, Headers};
pub use logger::{Logger, TracingLogger};
pub use method::RestMethod;
pub use middleware::Middleware;
pub use names::Name;
pub use request::{RawResponse, Request};
pub use schema::{
    DefinitionKey, NodeBuilder, NodeId, NodeKind, OperationBuilder, ResponseOptions, Schema, SchemaBuilder,
    ScopeBuilder,
};
pub use security::{Placement, TokenAuth};
pub use settings::{OptionDef, OptionType, Settings, SettingsClass};
