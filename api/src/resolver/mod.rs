//! Resolution of layered definitions into a single request.
//!
//! Every resolver walks the lineage of the called node, root first, evaluates
//! the closures stored under its [`DefinitionKey`] against the node settings
//! and combines the results with a key-specific policy:
//!
//! | key | policy |
//! |---|---|
//! | `base_url`, `http_method`, `format`, `body` | the most specific definition wins |
//! | `path` | segments joined from the root; an absolute URL restarts the join |
//! | `headers` | shallow merge, case-insensitive keys, blank values pruned |
//! | `query` | deep merge of nested mappings |
//! | `security` | accumulated (headers merged like `headers`, query and body deep merged), `null` resets |
//! | `middleware` | accumulated, `None` resets, reversed at the end |
//! | `responses` | the most specific handler for the received status |
//!
//! Results are reported to the settings logger at debug level and failures at
//! error level before they are returned.

mod body;
mod format;
mod headers;
mod http_method;
mod middleware;
mod query;
mod request;
mod response;
mod security;
mod uri;

pub use body::resolve as body;
pub use format::resolve as format;
pub use headers::resolve as headers;
pub use http_method::resolve as http_method;
pub use middleware::resolve as middleware;
pub use query::{deep_merge, resolve as query};
pub use request::resolve as request;
pub use response::resolve as response;
pub use security::{resolve as security, Security};
pub use uri::resolve as uri;

use std::fmt;

use serde_json::Value;

use crate::error::Error;
use crate::logger;
use crate::schema::{DefinitionKey, Node, NodeId, Schema};
use crate::settings::Settings;

/// The node being resolved and the settings to evaluate its closures with.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) node: NodeId,
    pub(crate) settings: &'a Settings,
}

impl<'a> Context<'a> {
    pub(crate) fn new(schema: &'a Schema, node: NodeId, settings: &'a Settings) -> Self {
        Self {
            schema,
            node,
            settings,
        }
    }

    /// Nodes whose definitions apply, root first.
    pub fn lineage(&self) -> impl DoubleEndedIterator<Item = &'a Node> {
        self.schema.lineage(self.node)
    }

    /// Evaluates every definition of `key` along the lineage, root first.
    pub(crate) fn evaluate(&self, key: DefinitionKey) -> Result<Vec<(&'a Node, Value)>, Error> {
        self.lineage()
            .filter_map(|node| node.definitions().get(key).map(|thunk| (node, thunk)))
            .map(|(node, thunk)| -> Result<_, Error> { Ok((node, thunk(self.settings)?)) })
            .collect()
    }

    /// Evaluates only the most specific definition of `key`.
    pub(crate) fn evaluate_last(&self, key: DefinitionKey) -> Result<Option<Value>, Error> {
        self.lineage()
            .rev()
            .find_map(|node| node.definitions().get(key))
            .map(|thunk| thunk(self.settings))
            .transpose()
    }

    /// Runs `resolve` and reports its outcome to the logger.
    pub(crate) fn track<T, F>(&self, key: &str, resolve: F) -> Result<T, Error>
    where
        T: fmt::Debug,
        F: FnOnce() -> Result<T, Error>,
    {
        let logger = self.settings.logger();
        let schema = self.schema.node(self.node).full_name();
        match resolve() {
            Ok(value) => {
                logger::debug(logger.as_ref(), key, || {
                    format!("resolved {key} from {schema} for {} to {value:?}", self.settings)
                });
                Ok(value)
            }
            Err(err) => {
                logger::error(logger.as_ref(), key, || {
                    format!("failed to resolve {key} from {schema} for {}: {err}", self.settings)
                });
                Err(err)
            }
        }
    }

    /// Full name of the resolved node.
    pub fn schema_name(&self) -> &'a str {
        self.schema.node(self.node).full_name()
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("node", &self.schema_name())
            .field("settings", &self.settings.options())
            .finish()
    }
}
