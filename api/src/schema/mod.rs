//! The immutable schema tree of scopes and operations.
//!
//! A [`Schema`] is an arena of [`Node`]s built once through the
//! [`SchemaBuilder`] DSL and shared read-only by every client built from it.
//! Node ids are indices into the arena; the root is always [`NodeId::ROOT`].
//!
//! ## Examples
//!
//! ```rust
//! use scoped_api::{OptionDef, RestMethod, Schema};
//!
//! let schema = Schema::define("Cats", |root| {
//!     root.option("token", OptionDef::string())?
//!         .base_url("https://cats.test/api");
//!     root.scope("cats", |cats| {
//!         cats.path("cats");
//!         cats.operation("fetch", |fetch| {
//!             fetch.option("id", OptionDef::integer())?
//!                 .path("{id}")
//!                 .http_method(RestMethod::Get);
//!             Ok(())
//!         })?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert_eq!(schema.root().name(), "Cats");
//! ```

mod builder;
mod definitions;

pub use builder::{Leaf, NodeBuilder, OperationBuilder, Scope, ScopeBuilder, SchemaBuilder};
pub use definitions::{
    Coercer, DefinitionKey, Definitions, MiddlewareThunk, ResponseHandler, ResponseOptions, Thunk,
};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use strum::Display;

use crate::error::Error;
use crate::settings::SettingsClass;

/// Index of a node inside its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root scope of every schema.
    pub const ROOT: NodeId = NodeId(0);
}

/// Whether a node groups children or describes one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    Scope,
    Operation,
}

/// One scope or operation of a schema.
#[derive(Debug)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) definitions: Definitions,
    pub(crate) children: BTreeMap<String, NodeId>,
    pub(crate) default_operation: Option<NodeId>,
    pub(crate) settings: Arc<SettingsClass>,
    pub(crate) lineage: Vec<NodeId>,
}

impl Node {
    /// The name the node was declared with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted path from the schema name, e.g. `Cats.crm.users.fetch`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// `true` for operations.
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Operation
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Named children in name order. The default operation is not a child.
    pub fn children(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn default_operation(&self) -> Option<NodeId> {
        self.default_operation
    }

    /// Flattened declarations of this node and every node it inherits from.
    pub fn settings(&self) -> &Arc<SettingsClass> {
        &self.settings
    }
}

/// A frozen tree of scopes and operations.
pub struct Schema {
    name: String,
    nodes: Vec<Node>,
}

impl Schema {
    /// Defines a schema by running `build` against its root scope.
    ///
    /// ## Errors
    ///
    /// Returns the first error raised while defining: a [`NameError`] for an
    /// invalid or reserved name, or a [`TypeError`] for a name used both as a
    /// scope and an operation.
    ///
    /// [`NameError`]: crate::error::NameError
    /// [`TypeError`]: crate::error::TypeError
    pub fn define<F>(name: impl Into<String>, build: F) -> Result<Arc<Schema>, Error>
    where
        F: FnOnce(&mut ScopeBuilder<'_>) -> Result<(), Error>,
    {
        let mut builder = SchemaBuilder::new(name);
        build(&mut builder.root())?;
        Ok(builder.build())
    }

    pub(crate) fn from_nodes(name: String, nodes: Vec<Node>) -> Self {
        Self { name, nodes }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Returns the node for `id`, or `None` if `id` belongs to another schema.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Ids held inside the crate always come from this schema.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Nodes whose definitions apply to `id`, root first and `id` last.
    ///
    /// A named operation inherits from its scope's default operation, so the
    /// default operation appears right before it.
    pub(crate) fn lineage(&self, id: NodeId) -> impl DoubleEndedIterator<Item = &Node> {
        self.node(id).lineage.iter().map(move |id| self.node(*id))
    }

    /// Looks up a named child of a scope.
    pub(crate) fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent).children.get(name).copied()
    }

    /// Finds a node by its dotted path below the root, e.g. `crm.users.fetch`.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(NodeId::ROOT, |id, segment| self.child(id, segment))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field(
                "nodes",
                &self.nodes.iter().map(|n| n.full_name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NameError, TypeError};
    use crate::settings::OptionDef;

    fn schema() -> Arc<Schema> {
        Schema::define("Cats", |root| {
            root.option("token", OptionDef::string())?;
            root.scope("crm", |crm| {
                crm.option("version", OptionDef::integer())?;
                crm.default_operation(|op| {
                    op.option("verbose", OptionDef::boolean().default(false))?;
                    Ok(())
                })?;
                crm.operation("fetch", |fetch| {
                    fetch.option("id", OptionDef::integer())?;
                    Ok(())
                })?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn test_full_names() {
        let schema = schema();
        let fetch = schema.find("crm.fetch").unwrap();
        assert_eq!(schema.node(fetch).full_name(), "Cats.crm.fetch");
        assert!(schema.node(fetch).is_leaf());
        assert_eq!(schema.root().full_name(), "Cats");
        assert!(schema.find("crm.missing").is_none());
    }

    #[test]
    fn test_lineage_includes_default_operation() {
        let schema = schema();
        let fetch = schema.find("crm.fetch").unwrap();
        let names: Vec<_> = schema.lineage(fetch).map(Node::full_name).collect();
        assert_eq!(names, vec!["Cats", "Cats.crm", "Cats.crm.default", "Cats.crm.fetch"]);
    }

    #[test]
    fn test_settings_are_flattened_down_the_tree() {
        let schema = schema();
        let fetch = schema.find("crm.fetch").unwrap();
        let names: Vec<_> = schema
            .node(fetch)
            .settings()
            .options()
            .map(|o| o.name().to_string())
            .collect();
        assert_eq!(names, vec!["token", "version", "verbose", "id"]);

        let crm = schema.find("crm").unwrap();
        assert_eq!(schema.node(crm).settings().options().count(), 2);
    }

    #[test]
    fn test_default_operation_is_not_a_child() {
        let schema = schema();
        let crm = schema.find("crm").unwrap();
        let children: Vec<_> = schema.node(crm).children().map(|(name, _)| name).collect();
        assert_eq!(children, vec!["fetch"]);
        assert!(schema.node(crm).default_operation().is_some());
    }

    #[test]
    fn test_operation_then_scope_with_same_name() {
        let err = Schema::define("Cats", |root| {
            root.operation("x", |_| Ok(()))?;
            root.scope("x", |_| Ok(()))?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Type(TypeError::NameConflict { existing: "operation", requested: "scope", .. })
        ));
    }

    #[test]
    fn test_scope_then_operation_with_same_name() {
        let err = Schema::define("Cats", |root| {
            root.scope("x", |_| Ok(()))?;
            root.operation("x", |_| Ok(()))?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Type(TypeError::NameConflict { existing: "scope", requested: "operation", .. })
        ));
    }

    #[test]
    fn test_scope_is_reopened() {
        let schema = Schema::define("Cats", |root| {
            root.scope("x", |x| {
                x.operation("a", |_| Ok(()))?;
                Ok(())
            })?;
            root.scope("x", |x| {
                x.operation("b", |_| Ok(()))?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
        let x = schema.find("x").unwrap();
        assert_eq!(schema.node(x).children().count(), 2);
    }

    #[test]
    fn test_get_rejects_foreign_ids() {
        let big = schema();
        let fetch = big.find("crm.fetch").unwrap();
        let small = Schema::define("Dogs", |_| Ok(())).unwrap();
        assert!(small.get(fetch).is_none());
        assert_eq!(big.get(fetch).map(Node::full_name), Some("Cats.crm.fetch"));
    }

    #[test]
    fn test_reserved_scope_name() {
        let err = Schema::define("Cats", |root| {
            root.scope("settings", |_| Ok(()))?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Name(NameError::Reserved { .. })));
    }
}
