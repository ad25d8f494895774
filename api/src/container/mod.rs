//! Builders and containers: the runtime face of a schema.
//!
//! A [`Builder`] binds a schema node to the settings of its parent container.
//! Building it with options constructs the node settings and returns a
//! [`Container`]: a [`ScopeContainer`] to navigate further, or an
//! [`OperationContainer`] to call.

mod operation;
mod scope;

pub use operation::OperationContainer;
pub use scope::ScopeContainer;

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::connection::Connection;
use crate::error::Error;
use crate::logger::Logger;
use crate::schema::{NodeId, NodeKind, Schema};
use crate::settings::Settings;

/// A schema node waiting for options.
#[derive(Clone)]
pub struct Builder {
    schema: Arc<Schema>,
    node: NodeId,
    parent: Option<Arc<Settings>>,
    connection: Arc<dyn Connection>,
    logger: Option<Arc<dyn Logger>>,
}

impl Builder {
    pub(crate) fn new(
        schema: Arc<Schema>,
        node: NodeId,
        parent: Option<Arc<Settings>>,
        connection: Arc<dyn Connection>,
        logger: Option<Arc<dyn Logger>>,
    ) -> Self {
        Self {
            schema,
            node,
            parent,
            connection,
            logger,
        }
    }

    /// The name the node was declared with.
    pub fn name(&self) -> &str {
        self.schema.node(self.node).name()
    }

    /// Dotted name of the node.
    pub fn full_name(&self) -> &str {
        self.schema.node(self.node).full_name()
    }

    /// `true` if building yields an operation.
    pub fn is_leaf(&self) -> bool {
        self.schema.node(self.node).is_leaf()
    }

    /// Constructs the node settings from the parent settings and `options`.
    ///
    /// ## Errors
    ///
    /// Whatever settings construction fails with: a
    /// [`TypeError`](crate::error::TypeError),
    /// [`KeyError`](crate::error::KeyError) or
    /// [`ValidationError`](crate::error::ValidationError). No container is
    /// returned in that case.
    pub fn build(&self, options: Value) -> Result<Container, Error> {
        let settings = self.settings(options)?;
        let schema = Arc::clone(&self.schema);
        let connection = Arc::clone(&self.connection);
        Ok(match self.schema.node(self.node).kind() {
            NodeKind::Scope => Container::Scope(ScopeContainer::new(schema, self.node, settings, connection)),
            NodeKind::Operation => {
                Container::Operation(OperationContainer::new(schema, self.node, settings, connection))
            }
        })
    }

    pub(crate) fn settings(&self, options: Value) -> Result<Arc<Settings>, Error> {
        let node = self.schema.node(self.node);
        let empty = Map::new();
        let parent = self.parent.as_deref().map_or(&empty, Settings::options);
        let settings = Settings::construct(
            node.settings(),
            node.full_name(),
            parent,
            options,
            self.logger.clone(),
        )?;
        Ok(Arc::new(settings))
    }

    pub(crate) fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub(crate) fn node(&self) -> NodeId {
        self.node
    }

    pub(crate) fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("node", &self.full_name())
            .field("leaf", &self.is_leaf())
            .finish()
    }
}

/// A built node.
#[derive(Debug, Clone)]
pub enum Container {
    Scope(ScopeContainer),
    Operation(OperationContainer),
}

impl Container {
    /// Settings the container was built with.
    pub fn settings(&self) -> &Arc<Settings> {
        match self {
            Self::Scope(scope) => scope.settings(),
            Self::Operation(operation) => operation.settings(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Operation(_))
    }

    pub fn into_scope(self) -> Option<ScopeContainer> {
        match self {
            Self::Scope(scope) => Some(scope),
            Self::Operation(_) => None,
        }
    }

    pub fn into_operation(self) -> Option<OperationContainer> {
        match self {
            Self::Operation(operation) => Some(operation),
            Self::Scope(_) => None,
        }
    }
}
