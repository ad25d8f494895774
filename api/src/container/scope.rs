use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::connection::Connection;
use crate::error::{Error, KeyError};
use crate::logger::Logger;
use crate::schema::{NodeId, NodeKind, Schema};
use crate::settings::Settings;

use super::{Builder, OperationContainer};

/// A built scope: settings plus builders for its children.
///
/// ## Examples
///
/// ```rust,ignore
/// let users = client.scope("crm", json!({"version": 4}))?.scope("users", Value::Null)?;
/// let user = users.call("fetch", json!({"id": 7}))?;
/// ```
#[derive(Clone)]
pub struct ScopeContainer {
    schema: Arc<Schema>,
    node: NodeId,
    settings: Arc<Settings>,
    connection: Arc<dyn Connection>,
}

impl ScopeContainer {
    pub(crate) fn new(
        schema: Arc<Schema>,
        node: NodeId,
        settings: Arc<Settings>,
        connection: Arc<dyn Connection>,
    ) -> Self {
        Self {
            schema,
            node,
            settings,
            connection,
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Dotted name of the scope.
    pub fn name(&self) -> &str {
        self.schema.node(self.node).full_name()
    }

    /// Builders of the nested scopes, by name.
    pub fn scopes(&self) -> BTreeMap<String, Builder> {
        self.children(NodeKind::Scope)
    }

    /// Builders of the operations of this scope, by name.
    pub fn operations(&self) -> BTreeMap<String, Builder> {
        self.children(NodeKind::Operation)
    }

    /// Returns the builder of a child scope or operation.
    ///
    /// ## Errors
    ///
    /// [`KeyError::UnknownMember`] if the scope has no child named `name`.
    pub fn member(&self, name: &str) -> Result<Builder, Error> {
        self.schema
            .child(self.node, name)
            .map(|id| self.builder(id))
            .ok_or_else(|| self.unknown(name))
    }

    /// Builds the child scope `name` with `options`.
    pub fn scope(&self, name: &str, options: Value) -> Result<ScopeContainer, Error> {
        let builder = self.member_of(name, NodeKind::Scope)?;
        let settings = builder.settings(options)?;
        Ok(ScopeContainer::new(
            Arc::clone(&self.schema),
            builder.node(),
            settings,
            Arc::clone(builder.connection()),
        ))
    }

    /// Builds the operation `name` with `options` without calling it.
    pub fn operation(&self, name: &str, options: Value) -> Result<OperationContainer, Error> {
        let builder = self.member_of(name, NodeKind::Operation)?;
        let settings = builder.settings(options)?;
        Ok(OperationContainer::new(
            Arc::clone(builder.schema()),
            builder.node(),
            settings,
            Arc::clone(builder.connection()),
        ))
    }

    /// Builds the operation `name` with `options` and calls it.
    pub fn call(&self, name: &str, options: Value) -> Result<Value, Error> {
        self.operation(name, options)?.call(Value::Null)
    }

    /// Replaces the logger used by this scope and everything built from it
    /// afterwards.
    pub fn set_logger(&self, logger: Option<Arc<dyn Logger>>) {
        self.settings.set_logger(logger);
    }

    fn children(&self, kind: NodeKind) -> BTreeMap<String, Builder> {
        self.schema
            .node(self.node)
            .children()
            .filter(|(_, id)| self.schema.node(*id).kind() == kind)
            .map(|(name, id)| (name.to_string(), self.builder(id)))
            .collect()
    }

    fn member_of(&self, name: &str, kind: NodeKind) -> Result<Builder, Error> {
        match self.schema.child(self.node, name) {
            Some(id) if self.schema.node(id).kind() == kind => Ok(self.builder(id)),
            _ => Err(self.unknown(name)),
        }
    }

    fn builder(&self, id: NodeId) -> Builder {
        Builder::new(
            Arc::clone(&self.schema),
            id,
            Some(Arc::clone(&self.settings)),
            Arc::clone(&self.connection),
            self.settings.logger(),
        )
    }

    fn unknown(&self, name: &str) -> Error {
        KeyError::UnknownMember {
            name: name.to_string(),
            scope: self.name().to_string(),
        }
        .into()
    }
}

impl fmt::Debug for ScopeContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeContainer")
            .field("scope", &self.name())
            .field("settings", &self.settings.options())
            .finish()
    }
}
