use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{instrument, Span};

use crate::connection::Connection;
use crate::error::{DefinitionError, Error};
use crate::middleware::{self, Middleware};
use crate::request::Request;
use crate::resolver::{self, Context};
use crate::schema::{NodeId, Schema};
use crate::settings::Settings;

/// A built operation, ready to be called.
#[derive(Clone)]
pub struct OperationContainer {
    schema: Arc<Schema>,
    node: NodeId,
    settings: Arc<Settings>,
    connection: Arc<dyn Connection>,
}

impl OperationContainer {
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

    /// Dotted name of the operation.
    pub fn name(&self) -> &str {
        self.schema.node(self.node).full_name()
    }

    /// Resolves the request this operation would send, without sending it.
    ///
    /// ## Errors
    ///
    /// A [`DefinitionError`] if the definitions cannot be resolved.
    pub fn request(&self) -> Result<Request, Error> {
        let cx = Context::new(&self.schema, self.node, &self.settings);
        resolver::request(&cx).map_err(|err| definition_error(err, "request", self.name()))
    }

    /// Resolves the middleware this operation would run, innermost first.
    pub fn middleware(&self) -> Result<Vec<Arc<dyn Middleware>>, Error> {
        let cx = Context::new(&self.schema, self.node, &self.settings);
        resolver::middleware(&cx).map_err(|err| definition_error(err, "middleware", self.name()))
    }

    /// Resolves the request, sends it through the middleware stack and
    /// coerces the response.
    ///
    /// Non-null `options` are merged over the container's settings and
    /// validated again before anything is resolved.
    ///
    /// ## Errors
    ///
    /// - a [`TypeError`](crate::error::TypeError),
    ///   [`KeyError`](crate::error::KeyError) or
    ///   [`ValidationError`](crate::error::ValidationError) for invalid `options`
    /// - a [`DefinitionError`] for any other failure while resolving
    /// - errors returned by middleware or the connection, unchanged
    /// - a [`ResponseError`](crate::error::ResponseError) or
    ///   [`UnexpectedResponseError`](crate::error::UnexpectedResponseError)
    ///   depending on the declared responses
    #[instrument(
        name = "operation_call",
        skip(self, options),
        fields(
            operation = %self.name(),
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub fn call(&self, options: Value) -> Result<Value, Error> {
        let settings = self.with_options(options)?;
        let cx = Context::new(&self.schema, self.node, &settings);

        let request = resolver::request(&cx).map_err(|err| definition_error(err, "request", self.name()))?;
        let layers = resolver::middleware(&cx).map_err(|err| definition_error(err, "middleware", self.name()))?;

        let span = Span::current();
        span.record("http.method", tracing::field::display(request.method));
        span.record("http.url", request.url.as_str());
        tracing::debug!(middleware = layers.len(), "dispatching request");

        let chain = middleware::stack(Arc::clone(&self.connection), &layers);
        let response = chain.call(request)?;
        span.record("http.status_code", response.status);

        resolver::response(&cx, response)
    }

    fn with_options(&self, options: Value) -> Result<Arc<Settings>, Error> {
        if options.is_null() {
            return Ok(Arc::clone(&self.settings));
        }
        let node = self.schema.node(self.node);
        let settings = Settings::construct(
            node.settings(),
            node.full_name(),
            self.settings.options(),
            options,
            self.settings.logger(),
        )?;
        Ok(Arc::new(settings))
    }
}

/// Keeps input and definition errors, wraps everything else raised while
/// resolving.
fn definition_error(err: Error, key: &str, schema: &str) -> Error {
    match err {
        Error::Definition(_) => err,
        err if err.is_input_error() => err,
        err => DefinitionError::evaluation(key, schema, err).into(),
    }
}

impl fmt::Debug for OperationContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContainer")
            .field("operation", &self.name())
            .field("settings", &self.settings.options())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::connection;
    use crate::container::Builder;
    use crate::error::{ConnectionError, ErrorKind, KeyError};
    use crate::method::RestMethod;
    use crate::request::RawResponse;
    use crate::schema::ResponseOptions;
    use crate::settings::OptionDef;
    use serde_json::json;

    fn operation(connection: Arc<dyn Connection>) -> OperationContainer {
        let schema = Schema::define("Cats", |root| {
            root.option("id", OptionDef::integer())?
                .base_url("https://cats.test")
                .path("cats/{id}")
                .http_method(RestMethod::Get)
                .response(200, ResponseOptions::default(), |_, r| r.json::<Value>().map_err(Error::from));
            root.operation("fetch", |fetch| {
                fetch
                    .computed("shout", |s| Ok(s.text("id")?.repeat(2)))?
                    .headers_with(|s| Ok(json!({"X-Shout": s.get("shout")?})));
                Ok(())
            })?;
            root.operation("broken", |broken| {
                broken.query_with(|s| s.value::<Value>("missing"));
                Ok(())
            })?;
            root.operation("decode", |decode| {
                decode.body_with(|_| Ok(serde_json::from_str::<Value>("{")?));
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
        let root = Builder::new(schema, NodeId::ROOT, None, connection, None)
            .build(json!({"id": 1}))
            .unwrap()
            .into_scope()
            .unwrap();
        root.operation("fetch", Value::Null).unwrap()
    }

    fn echo() -> Arc<dyn Connection> {
        connection::from_fn(|request| {
            Ok(RawResponse::new(
                200,
                json!({"url": request.url.as_str(), "shout": request.headers.first("x-shout")}).to_string(),
            ))
        })
    }

    #[test]
    fn test_call_resolves_and_coerces() {
        let value = operation(echo()).call(Value::Null).unwrap();
        assert_eq!(value, json!({"url": "https://cats.test/cats/1", "shout": "11"}));
    }

    #[test]
    fn test_call_options_rederive_settings() {
        let op = operation(echo());
        let value = op.call(json!({"id": 42})).unwrap();
        assert_eq!(value["url"], json!("https://cats.test/cats/42"));
        assert_eq!(value["shout"], json!("4242"));
        assert_eq!(op.settings().get("id").unwrap(), json!(1));
    }

    #[test]
    fn test_invalid_call_options_are_input_errors() {
        let err = operation(echo()).call(json!({"id": "x"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn test_request_preview_does_not_send() {
        let sent = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&sent);
        let connection = connection::from_fn(move |_| {
            *counter.lock().unwrap() += 1;
            Ok(RawResponse::new(200, "{}"))
        });
        let request = operation(connection).request().unwrap();
        assert_eq!(request.url.as_str(), "https://cats.test/cats/1");
        assert_eq!(request.headers.first("X-Shout"), Some("11"));
        assert_eq!(*sent.lock().unwrap(), 0);
    }

    #[test]
    fn test_unknown_setting_is_a_definition_error() {
        let op = operation(echo());
        let root = Builder::new(Arc::clone(&op.schema), NodeId::ROOT, None, echo(), None)
            .build(json!({"id": 1}))
            .unwrap()
            .into_scope()
            .unwrap();
        let err = root.call("broken", Value::Null).unwrap_err();
        assert!(matches!(err, Error::Definition(DefinitionError::UnknownSetting { .. })));
    }

    #[test]
    fn test_foreign_errors_become_definition_errors() {
        let op = operation(echo());
        let root = Builder::new(Arc::clone(&op.schema), NodeId::ROOT, None, echo(), None)
            .build(json!({"id": 1}))
            .unwrap()
            .into_scope()
            .unwrap();
        let err = root.call("decode", Value::Null).unwrap_err();
        let Error::Definition(DefinitionError::Evaluation { key, source, .. }) = err else {
            panic!("expected an evaluation error");
        };
        assert_eq!(key, "request");
        assert_eq!(source.kind(), ErrorKind::Connection);
    }

    #[test]
    fn test_transport_errors_are_unchanged() {
        let connection = connection::from_fn(|_| Err(ConnectionError::Connection("refused".to_string()).into()));
        let err = operation(connection).call(Value::Null).unwrap_err();
        assert!(matches!(err, Error::Connection(ConnectionError::Connection(_))));
    }

    #[test]
    fn test_missing_option_on_call() {
        let schema = Schema::define("Cats", |root| {
            root.operation("fetch", |fetch| {
                fetch.option("id", OptionDef::integer())?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
        let root = Builder::new(schema, NodeId::ROOT, None, echo(), None)
            .build(Value::Null)
            .unwrap()
            .into_scope()
            .unwrap();
        let err = root.call("fetch", Value::Null).unwrap_err();
        assert!(matches!(err, Error::Key(KeyError::MissingOption { .. })));
    }
}
