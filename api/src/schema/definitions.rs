//! Per-node definition closures.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use strum::Display;

use crate::error::{DefinitionError, Error};
use crate::middleware::Middleware;
use crate::request::RawResponse;
use crate::settings::{Evaluator, Settings};

/// Keys a node can define a request fragment under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DefinitionKey {
    BaseUrl,
    Path,
    HttpMethod,
    Format,
    Security,
    Headers,
    Query,
    Body,
    Middleware,
    Responses,
}

/// A definition closure evaluated against the settings of the called node.
pub type Thunk = Evaluator<Value>;

/// A middleware definition; `None` clears what ancestors registered.
pub type MiddlewareThunk = Evaluator<Option<Vec<Arc<dyn Middleware>>>>;

/// Turns a raw response into the value returned to the caller.
pub type Coercer = Arc<dyn Fn(&Settings, &RawResponse) -> Result<Value, Error> + Send + Sync>;

/// Options accepted by `response` declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseOptions {
    /// Raise a [`ResponseError`](crate::error::ResponseError) wrapping the
    /// coerced value instead of returning it.
    pub raise: bool,
}

impl ResponseOptions {
    /// Options for a status that should be raised as an error.
    pub fn raising() -> Self {
        Self { raise: true }
    }
}

/// A coercer registered for one status code.
#[derive(Clone)]
pub struct ResponseHandler {
    pub(crate) coercer: Coercer,
    pub(crate) raise: bool,
}

impl ResponseHandler {
    /// Returns `true` if a match raises instead of returning.
    pub fn raises(&self) -> bool {
        self.raise
    }
}

impl fmt::Debug for ResponseHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseHandler")
            .field("raise", &self.raise)
            .finish_non_exhaustive()
    }
}

/// Everything a single node defines, keyed by [`DefinitionKey`].
#[derive(Clone, Default)]
pub struct Definitions {
    pub(crate) values: BTreeMap<DefinitionKey, Thunk>,
    pub(crate) middleware: Option<MiddlewareThunk>,
    pub(crate) responses: BTreeMap<u16, ResponseHandler>,
}

impl Definitions {
    /// Returns the closure stored under `key`.
    pub fn get(&self, key: DefinitionKey) -> Option<&Thunk> {
        self.values.get(&key)
    }

    /// Returns `true` if the node defines `key`.
    pub fn defines(&self, key: DefinitionKey) -> bool {
        match key {
            DefinitionKey::Middleware => self.middleware.is_some(),
            DefinitionKey::Responses => !self.responses.is_empty(),
            key => self.values.contains_key(&key),
        }
    }

    /// Returns the middleware definition, if any.
    pub fn middleware(&self) -> Option<&MiddlewareThunk> {
        self.middleware.as_ref()
    }

    /// Returns the handler declared for `status`.
    pub fn response(&self, status: u16) -> Option<&ResponseHandler> {
        self.responses.get(&status)
    }

    /// Status codes declared on this node in ascending order.
    pub fn statuses(&self) -> impl Iterator<Item = u16> + '_ {
        self.responses.keys().copied()
    }

    pub(crate) fn set(&mut self, key: DefinitionKey, thunk: Thunk) {
        self.values.insert(key, thunk);
    }
}

impl fmt::Debug for Definitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definitions")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .field("middleware", &self.middleware.is_some())
            .field("responses", &self.responses.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Wraps a closure returning any serializable value into a [`Thunk`].
pub(crate) fn thunk<F, V>(key: DefinitionKey, f: F) -> Thunk
where
    F: Fn(&Settings) -> Result<V, Error> + Send + Sync + 'static,
    V: Serialize,
{
    Arc::new(move |settings: &Settings| -> Result<Value, Error> {
        let value = f(settings)?;
        to_value(key, settings, &value)
    })
}

/// A thunk returning the same value for every settings instance.
pub(crate) fn constant(value: Value) -> Thunk {
    Arc::new(move |_: &Settings| -> Result<Value, Error> { Ok(value.clone()) })
}

/// Wraps a response closure into a [`Coercer`].
pub(crate) fn coercer<F, V>(f: F) -> Coercer
where
    F: Fn(&Settings, &RawResponse) -> Result<V, Error> + Send + Sync + 'static,
    V: Serialize,
{
    Arc::new(move |settings: &Settings, response: &RawResponse| -> Result<Value, Error> {
        let value = f(settings, response)?;
        to_value(DefinitionKey::Responses, settings, &value)
    })
}

fn to_value<V: Serialize>(key: DefinitionKey, settings: &Settings, value: &V) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|e| {
        DefinitionError::Unserializable {
            key: key.to_string(),
            schema: settings.schema().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsClass;
    use serde_json::{json, Map};
    use std::collections::HashMap;

    fn settings() -> Settings {
        Settings::construct(
            &Arc::new(SettingsClass::default()),
            "Cats",
            &Map::new(),
            json!({"id": 7}),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_key_display() {
        assert_eq!(DefinitionKey::HttpMethod.to_string(), "http_method");
        assert_eq!(DefinitionKey::BaseUrl.to_string(), "base_url");
    }

    #[test]
    fn test_thunk_serializes_result() {
        let thunk = thunk(DefinitionKey::Query, |s: &Settings| {
            Ok(HashMap::from([("id", s.get("id")?)]))
        });
        assert_eq!(thunk(&settings()).unwrap(), json!({"id": 7}));
    }

    #[test]
    fn test_unserializable_value() {
        let thunk = thunk(DefinitionKey::Query, |_: &Settings| {
            Ok(HashMap::from([((1, 2), "tuple keys are not strings")]))
        });
        let err = thunk(&settings()).unwrap_err();
        assert!(matches!(
            err,
            Error::Definition(DefinitionError::Unserializable { ref key, .. }) if key == "query"
        ));
    }

    #[test]
    fn test_defines_tracks_every_kind() {
        let mut definitions = Definitions::default();
        assert!(!definitions.defines(DefinitionKey::Path));
        definitions.set(DefinitionKey::Path, constant(json!("users")));
        definitions.responses.insert(
            200,
            ResponseHandler {
                coercer: coercer(|_, r: &RawResponse| Ok(r.status)),
                raise: false,
            },
        );
        assert!(definitions.defines(DefinitionKey::Path));
        assert!(definitions.defines(DefinitionKey::Responses));
        assert!(!definitions.defines(DefinitionKey::Middleware));
        assert_eq!(definitions.statuses().collect::<Vec<_>>(), vec![200]);
    }
}
