//! Type-state DSL for defining a schema.
//!
//! [`NodeBuilder`] is parameterized by a marker: [`Scope`] builders can nest
//! scopes and operations, [`Leaf`] builders cannot. Both share every
//! definition method. Literal definition methods store a constant (base URLs
//! and paths interpolate `{option}` placeholders); the `_with` variants take a
//! closure evaluated against the settings of the called node.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{DefinitionError, Error, TypeError};
use crate::format::Format;
use crate::method::RestMethod;
use crate::middleware::Middleware;
use crate::names;
use crate::request::RawResponse;
use crate::settings::{OptionDef, Settings, SettingsClass};
use crate::template;

use super::definitions::{self, DefinitionKey, Definitions, ResponseHandler, ResponseOptions};
use super::{Node, NodeId, NodeKind, Schema};

/// Marker for builders of scope nodes.
#[derive(Debug)]
pub enum Scope {}

/// Marker for builders of operation nodes.
#[derive(Debug)]
pub enum Leaf {}

/// Builder of a scope node.
pub type ScopeBuilder<'a> = NodeBuilder<'a, Scope>;

/// Builder of an operation node.
pub type OperationBuilder<'a> = NodeBuilder<'a, Leaf>;

/// A node while the schema is still being defined.
#[derive(Debug)]
struct Draft {
    name: String,
    kind: NodeKind,
    parent: Option<NodeId>,
    definitions: Definitions,
    children: BTreeMap<String, NodeId>,
    default_operation: Option<NodeId>,
    settings: SettingsClass,
}

impl Draft {
    fn new(name: String, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            name,
            kind,
            parent,
            definitions: Definitions::default(),
            children: BTreeMap::new(),
            default_operation: None,
            settings: SettingsClass::default(),
        }
    }
}

/// Collects node definitions and freezes them into a [`Schema`].
///
/// ## Examples
///
/// ```rust
/// use scoped_api::{RestMethod, SchemaBuilder};
///
/// let mut builder = SchemaBuilder::new("Cats");
/// builder
///     .root()
///     .base_url("https://cats.test")
///     .operation("list", |list| {
///         list.path("cats").http_method(RestMethod::Get);
///         Ok(())
///     })
///     .unwrap();
/// let schema = builder.build();
/// assert!(schema.find("list").is_some());
/// ```
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    drafts: Vec<Draft>,
}

impl SchemaBuilder {
    /// Starts a schema whose root scope is named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            drafts: vec![Draft::new(name.clone(), NodeKind::Scope, None)],
            name,
        }
    }

    /// Returns the builder of the root scope.
    pub fn root(&mut self) -> ScopeBuilder<'_> {
        NodeBuilder::new(&mut self.drafts, NodeId::ROOT)
    }

    /// Freezes the definitions.
    ///
    /// Settings declarations are flattened per node: every node sees the
    /// options of its ancestors, and named operations additionally inherit
    /// from their scope's default operation.
    pub fn build(self) -> Arc<Schema> {
        let mut classes: Vec<Option<Arc<SettingsClass>>> = vec![None; self.drafts.len()];
        for index in 0..self.drafts.len() {
            flatten(&self.drafts, NodeId(index), &mut classes);
        }
        let lineages: Vec<Vec<NodeId>> = (0..self.drafts.len())
            .map(|index| lineage(&self.drafts, NodeId(index)))
            .collect();
        let full_names: Vec<String> = (0..self.drafts.len())
            .map(|index| full_name(&self.drafts, NodeId(index)))
            .collect();

        let nodes = self
            .drafts
            .into_iter()
            .zip(classes)
            .zip(lineages.into_iter().zip(full_names))
            .map(|((draft, settings), (lineage, full_name))| Node {
                name: draft.name,
                full_name,
                kind: draft.kind,
                parent: draft.parent,
                definitions: draft.definitions,
                children: draft.children,
                default_operation: draft.default_operation,
                settings: settings.unwrap_or_default(),
                lineage,
            })
            .collect();

        let schema = Schema::from_nodes(self.name, nodes);
        tracing::debug!(schema = %schema.name(), nodes = schema.len(), "schema built");
        Arc::new(schema)
    }
}

/// The node a draft inherits definitions and settings from.
fn base_of(drafts: &[Draft], id: NodeId) -> Option<NodeId> {
    let draft = &drafts[id.0];
    let parent = draft.parent?;
    match drafts[parent.0].default_operation {
        Some(default) if draft.kind == NodeKind::Operation && default != id => Some(default),
        _ => Some(parent),
    }
}

fn flatten(drafts: &[Draft], id: NodeId, classes: &mut [Option<Arc<SettingsClass>>]) -> Arc<SettingsClass> {
    if let Some(class) = &classes[id.0] {
        return Arc::clone(class);
    }
    let own = &drafts[id.0].settings;
    let class = match base_of(drafts, id) {
        Some(base) => {
            let base = flatten(drafts, base, classes);
            SettingsClass::inherit(&base, own)
        }
        None => own.clone(),
    };
    let class = Arc::new(class);
    classes[id.0] = Some(Arc::clone(&class));
    class
}

fn lineage(drafts: &[Draft], id: NodeId) -> Vec<NodeId> {
    let mut chain = vec![id];
    let mut current = id;
    while let Some(base) = base_of(drafts, current) {
        chain.push(base);
        current = base;
    }
    chain.reverse();
    chain
}

fn full_name(drafts: &[Draft], id: NodeId) -> String {
    let draft = &drafts[id.0];
    match draft.parent {
        Some(parent) => format!("{}.{}", full_name(drafts, parent), draft.name),
        None => draft.name.clone(),
    }
}

/// Defines one node of a schema.
///
/// Definition methods can be chained; each call replaces the node's earlier
/// definition for the same key, except `response`, which accumulates per
/// status code.
pub struct NodeBuilder<'a, K> {
    drafts: &'a mut Vec<Draft>,
    id: NodeId,
    _kind: PhantomData<K>,
}

impl<'a, K> NodeBuilder<'a, K> {
    fn new(drafts: &'a mut Vec<Draft>, id: NodeId) -> Self {
        Self {
            drafts,
            id,
            _kind: PhantomData,
        }
    }

    /// Id the node will have in the built schema.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Dotted name of the node being defined.
    pub fn full_name(&self) -> String {
        full_name(&self.drafts[..], self.id)
    }

    fn draft(&mut self) -> &mut Draft {
        &mut self.drafts[self.id.0]
    }

    fn define(&mut self, key: DefinitionKey, thunk: definitions::Thunk) -> &mut Self {
        self.draft().definitions.set(key, thunk);
        self
    }

    /// Declares a settings option.
    ///
    /// ## Errors
    ///
    /// Returns a [`NameError`](crate::error::NameError) for an invalid or
    /// reserved option name or alias.
    pub fn option(&mut self, name: &str, def: OptionDef) -> Result<&mut Self, Error> {
        self.draft().settings.declare_option(name, def)?;
        Ok(self)
    }

    /// Declares a memoized attribute derived from the other settings.
    pub fn computed<F, V>(&mut self, name: &str, body: F) -> Result<&mut Self, Error>
    where
        F: Fn(&Settings) -> Result<V, Error> + Send + Sync + 'static,
        V: Serialize,
    {
        let key = name.to_string();
        self.draft().settings.declare_computed(name, move |settings: &Settings| {
            let value = body(settings)?;
            serde_json::to_value(value).map_err(|e| {
                DefinitionError::Unserializable {
                    key: key.clone(),
                    schema: settings.schema().to_string(),
                    message: e.to_string(),
                }
                .into()
            })
        })?;
        Ok(self)
    }

    /// Declares a validator; `key` names it in the resulting error.
    pub fn validate<F>(&mut self, key: &str, body: F) -> Result<&mut Self, Error>
    where
        F: Fn(&Settings) -> Result<bool, Error> + Send + Sync + 'static,
    {
        self.draft().settings.declare_validator(key, body)?;
        Ok(self)
    }

    /// Sets the base URL; `{option}` placeholders are interpolated.
    pub fn base_url(&mut self, template: &str) -> &mut Self {
        self.define(DefinitionKey::BaseUrl, interpolated(template))
    }

    pub fn base_url_with<F, V>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Settings) -> Result<V, Error> + Send + Sync + 'static,
        V: Serialize,
    {
        self.define(DefinitionKey::BaseUrl, definitions::thunk(DefinitionKey::BaseUrl, f))
    }

    /// Sets the path segment of this node; `{option}` placeholders are
    /// interpolated.
    ///
    /// Segments are joined from the root down. An absolute URL replaces
    /// everything defined above it.
    pub fn path(&mut self, template: &str) -> &mut Self {
        self.define(DefinitionKey::Path, interpolated(template))
    }

    pub fn path_with<F, V>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Settings) -> Result<V, Error> + Send + Sync + 'static,
        V: Serialize,
    {
        self.define(DefinitionKey::Path, definitions::thunk(DefinitionKey::Path, f))
    }

    pub fn http_method(&mut self, method: RestMethod) -> &mut Self {
        self.define(DefinitionKey::HttpMethod, definitions::constant(Value::String(method.to_string())))
    }

    /// Computes the HTTP method; any case of a known verb is accepted.
    pub fn http_method_with<F, V>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Settings) -> Result<V, Error> + Send + Sync + 'static,
        V: Serialize,
    {
        self.define(DefinitionKey::HttpMethod, definitions::thunk(DefinitionKey::HttpMethod, f))
    }

    pub fn format(&mut self, format: Format) -> &mut Self {
        self.define(DefinitionKey::Format, definitions::constant(Value::String(format.to_string())))
    }

    pub fn format_with<F, V>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Settings) -> Result<V, Error> + Send + Sync + 'static,
        V: Serialize,
    {
        self.define(DefinitionKey::Format, definitions::thunk(DefinitionKey::Format, f))
    }

    /// Sets a security schema such as the ones built by [`crate::security`].
    pub fn security(&mut self, schema: impl Into<Value>) -> &mut Self {
        self.define(DefinitionKey::Security, definitions::constant(schema.into()))
    }

    /// Computes the security schema; `null` drops what ancestors defined.
    ///
    /// ## Examples
    ///
    /// ```rust,ignore
    /// root.security_with(|s| Ok(security::basic_auth(&s.text("user")?, &s.text("password")?)));
    /// ```
    pub fn security_with<F, V>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Settings) -> Result<V, Error> + Send + Sync + 'static,
        V: Serialize,
    {
        self.define(DefinitionKey::Security, definitions::thunk(DefinitionKey::Security, f))
    }

    pub fn headers(&mut self, headers: impl Into<Value>) -> &mut Self {
        self.define(DefinitionKey::Headers, definitions::constant(headers.into()))
    }

    pub fn headers_with<F, V>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Settings) -> Result<V, Error> + Send + Sync + 'static,
        V: Serialize,
    {
        self.define(DefinitionKey::Headers, definitions::thunk(DefinitionKey::Headers, f))
    }

    pub fn query(&mut self, query: impl Into<Value>) -> &mut Self {
        self.define(DefinitionKey::Query, definitions::constant(query.into()))
    }

    pub fn query_with<F, V>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Settings) -> Result<V, Error> + Send + Sync + 'static,
        V: Serialize,
    {
        self.define(DefinitionKey::Query, definitions::thunk(DefinitionKey::Query, f))
    }

    pub fn body(&mut self, body: impl Into<Value>) -> &mut Self {
        self.define(DefinitionKey::Body, definitions::constant(body.into()))
    }

    pub fn body_with<F, V>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Settings) -> Result<V, Error> + Send + Sync + 'static,
        V: Serialize,
    {
        self.define(DefinitionKey::Body, definitions::thunk(DefinitionKey::Body, f))
    }

    /// Registers middleware for this node and everything below it.
    pub fn middleware<I>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        let middleware: Vec<_> = middleware.into_iter().collect();
        self.middleware_with(move |_| Ok(Some(middleware.clone())))
    }

    /// Computes the middleware of this node; `None` clears every middleware
    /// registered by ancestors.
    pub fn middleware_with<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Settings) -> Result<Option<Vec<Arc<dyn Middleware>>>, Error> + Send + Sync + 'static,
    {
        self.draft().definitions.middleware = Some(Arc::new(f));
        self
    }

    /// Drops every middleware registered by ancestors.
    pub fn clear_middleware(&mut self) -> &mut Self {
        self.middleware_with(|_| Ok(None))
    }

    /// Declares how to coerce a response with `status`.
    ///
    /// ## Examples
    ///
    /// ```rust,ignore
    /// fetch.response(200, ResponseOptions::default(), |_, r| r.json::<Cat>().map_err(Into::into));
    /// fetch.response(404, ResponseOptions::raising(), |_, r| Ok(r.text().into_owned()));
    /// ```
    pub fn response<F, V>(&mut self, status: u16, options: ResponseOptions, coercer: F) -> &mut Self
    where
        F: Fn(&Settings, &RawResponse) -> Result<V, Error> + Send + Sync + 'static,
        V: Serialize,
    {
        self.responses(&[status], options, coercer)
    }

    /// Declares one coercer for several statuses.
    pub fn responses<F, V>(&mut self, statuses: &[u16], options: ResponseOptions, coercer: F) -> &mut Self
    where
        F: Fn(&Settings, &RawResponse) -> Result<V, Error> + Send + Sync + 'static,
        V: Serialize,
    {
        self.register(statuses, options, definitions::coercer(coercer))
    }

    /// Declares statuses returned as `{status, headers, body}`.
    pub fn response_raw(&mut self, statuses: &[u16], options: ResponseOptions) -> &mut Self {
        let coercer = definitions::coercer(|_, response: &RawResponse| Ok(response.to_value()));
        self.register(statuses, options, coercer)
    }

    fn register(&mut self, statuses: &[u16], options: ResponseOptions, coercer: definitions::Coercer) -> &mut Self {
        let responses = &mut self.draft().definitions.responses;
        for status in statuses {
            responses.insert(
                *status,
                ResponseHandler {
                    coercer: Arc::clone(&coercer),
                    raise: options.raise,
                },
            );
        }
        self
    }
}

impl<'a> NodeBuilder<'a, Scope> {
    /// Creates or reopens a nested scope and runs `build` in it.
    ///
    /// ## Errors
    ///
    /// Fails with a [`TypeError::NameConflict`] if `name` is already an
    /// operation of this scope, or with the first error raised by `build`.
    pub fn scope<F>(&mut self, name: &str, build: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut ScopeBuilder<'_>) -> Result<(), Error>,
    {
        let id = self.child(name, NodeKind::Scope)?;
        build(&mut NodeBuilder::new(&mut *self.drafts, id))?;
        Ok(self)
    }

    /// Creates or reopens an operation and runs `build` in it.
    ///
    /// ## Errors
    ///
    /// Fails with a [`TypeError::NameConflict`] if `name` is already a scope
    /// of this scope, or with the first error raised by `build`.
    pub fn operation<F>(&mut self, name: &str, build: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut OperationBuilder<'_>) -> Result<(), Error>,
    {
        let id = self.child(name, NodeKind::Operation)?;
        build(&mut NodeBuilder::new(&mut *self.drafts, id))?;
        Ok(self)
    }

    /// Defines the unnamed operation every named operation of this scope
    /// inherits settings and definitions from. It cannot be called itself.
    pub fn default_operation<F>(&mut self, build: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut OperationBuilder<'_>) -> Result<(), Error>,
    {
        let id = match self.draft().default_operation {
            Some(id) => id,
            None => {
                let id = NodeId(self.drafts.len());
                self.drafts
                    .push(Draft::new("default".to_string(), NodeKind::Operation, Some(self.id)));
                self.draft().default_operation = Some(id);
                id
            }
        };
        build(&mut NodeBuilder::new(&mut *self.drafts, id))?;
        Ok(self)
    }

    fn child(&mut self, name: &str, kind: NodeKind) -> Result<NodeId, Error> {
        names::validate(name)?;
        if let Some(&id) = self.draft().children.get(name) {
            let existing = self.drafts[id.0].kind;
            if existing != kind {
                return Err(TypeError::NameConflict {
                    name: name.to_string(),
                    scope: self.full_name(),
                    existing: kind_name(existing),
                    requested: kind_name(kind),
                }
                .into());
            }
            return Ok(id);
        }
        let id = NodeId(self.drafts.len());
        self.drafts.push(Draft::new(name.to_string(), kind, Some(self.id)));
        self.draft().children.insert(name.to_string(), id);
        Ok(id)
    }
}

fn kind_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Scope => "scope",
        NodeKind::Operation => "operation",
    }
}

fn interpolated(template: &str) -> definitions::Thunk {
    let template = template.to_string();
    Arc::new(move |settings: &Settings| -> Result<Value, Error> {
        Ok(Value::String(template::interpolate(&template, settings)?))
    })
}
