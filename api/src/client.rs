//! Client entry point.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde_json::Value;

use crate::connection::{Connection, HttpConnection};
use crate::container::{Builder, ScopeContainer};
use crate::error::Error;
use crate::logger::Logger;
use crate::schema::{NodeId, Schema};

/// Builder for configuring a [`Client`].
///
/// ## Examples
///
/// ```rust,ignore
/// use scoped_api::{Client, TracingLogger};
/// use serde_json::json;
///
/// let client = Client::builder(schema)
///     .logger(TracingLogger::shared())
///     .build(json!({"token": "secret"}))?;
/// ```
pub struct ClientBuilder {
    schema: Arc<Schema>,
    connection: Option<Arc<dyn Connection>>,
    logger: Option<Arc<dyn Logger>>,
}

impl ClientBuilder {
    /// Sets the connection every call goes through.
    ///
    /// Defaults to an [`HttpConnection`] with default settings.
    pub fn connection(mut self, connection: Arc<dyn Connection>) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Sets the logger resolvers and validators report to.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Builds the root scope with `options`.
    ///
    /// ## Errors
    ///
    /// Returns an error if the default connection cannot be created or the
    /// options are rejected by the root settings.
    pub fn build(self, options: Value) -> Result<Client, Error> {
        let connection = match self.connection {
            Some(connection) => connection,
            None => Arc::new(HttpConnection::new()?),
        };
        let builder = Builder::new(self.schema, NodeId::ROOT, None, connection, self.logger);
        let settings = builder.settings(options)?;
        let root = ScopeContainer::new(
            Arc::clone(builder.schema()),
            NodeId::ROOT,
            settings,
            Arc::clone(builder.connection()),
        );
        tracing::debug!(client = %root.name(), "client built");
        Ok(Client { root })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("schema", &self.schema.name())
            .field("connection", &self.connection.is_some())
            .field("logger", &self.logger)
            .finish()
    }
}

/// A client for one schema: the built root scope.
///
/// Dereferences to [`ScopeContainer`], so scopes and operations are reached
/// directly from the client.
#[derive(Debug, Clone)]
pub struct Client {
    root: ScopeContainer,
}

impl Client {
    /// Creates a new builder for a client of `schema`.
    pub fn builder(schema: Arc<Schema>) -> ClientBuilder {
        ClientBuilder {
            schema,
            connection: None,
            logger: None,
        }
    }

    /// Builds a client with the default connection and no logger.
    ///
    /// ## Errors
    ///
    /// See [`ClientBuilder::build`].
    pub fn new(schema: Arc<Schema>, options: Value) -> Result<Self, Error> {
        Self::builder(schema).build(options)
    }

    /// The root scope.
    pub fn root(&self) -> &ScopeContainer {
        &self.root
    }
}

impl Deref for Client {
    type Target = ScopeContainer;

    fn deref(&self) -> &Self::Target {
        &self.root
    }
}
