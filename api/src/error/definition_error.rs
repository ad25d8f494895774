//! Errors in the client definition itself.

use thiserror::Error;

/// A resolver could not produce a value consistent with its definition key.
///
/// These errors point at a bug in the client definition, not at the options
/// a caller passed in. They are logged at error level before being returned.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// No node in the chain declares an HTTP method.
    #[error("HTTP method is not defined for {schema}")]
    MissingHttpMethod {
        /// The operation being resolved.
        schema: String,
    },

    /// The declared HTTP method is not a known verb.
    #[error("Unknown HTTP method {value} defined for {schema}")]
    InvalidHttpMethod {
        /// The operation being resolved.
        schema: String,
        /// The offending value.
        value: String,
    },

    /// The declared format is outside of json, yaml, form, text, multipart.
    #[error("Unknown format {value} defined for {schema}; expected one of json, yaml, form, text, multipart")]
    InvalidFormat {
        /// The operation being resolved.
        schema: String,
        /// The offending value.
        value: String,
    },

    /// No base URL or path was defined anywhere in the chain.
    #[error("Neither base_url nor path is defined for {schema}")]
    MissingUri {
        /// The operation being resolved.
        schema: String,
    },

    /// The joined base URL and path is not an absolute URL.
    #[error("Invalid URI '{uri}' resolved for {schema}: {source}")]
    InvalidUri {
        /// The operation being resolved.
        schema: String,
        /// The resolved string.
        uri: String,
        /// The parser failure.
        #[source]
        source: url::ParseError,
    },

    /// A path or base URL definition produced something that is not text.
    #[error("Invalid path segment {value} defined for {schema}")]
    InvalidPath {
        /// The node being resolved.
        schema: String,
        /// The offending value.
        value: String,
    },

    /// A headers definition produced something other than a mapping of
    /// strings or lists of strings.
    #[error("Invalid headers defined for {schema}: {message}")]
    InvalidHeaders {
        /// The node being resolved.
        schema: String,
        /// What was wrong.
        message: String,
    },

    /// A query definition produced something other than a mapping.
    #[error("Invalid query defined for {schema}: {message}")]
    InvalidQuery {
        /// The node being resolved.
        schema: String,
        /// What was wrong.
        message: String,
    },

    /// A security definition is malformed.
    #[error("Invalid security schema defined for {schema}: {message}")]
    InvalidSecurity {
        /// The node being resolved.
        schema: String,
        /// What was wrong.
        message: String,
    },

    /// A definition closure referenced a name its settings do not declare.
    #[error("{schema} has no option or attribute named '{name}'")]
    UnknownSetting {
        /// The settings owner.
        schema: String,
        /// The undeclared name.
        name: String,
    },

    /// A settings value could not be read as the requested Rust type.
    #[error("Setting '{name}' of {schema} cannot be read as {expected}: {message}")]
    SettingType {
        /// The settings owner.
        schema: String,
        /// The setting name.
        name: String,
        /// The requested type.
        expected: &'static str,
        /// The deserializer message.
        message: String,
    },

    /// A definition closure produced a value that cannot be represented.
    #[error("Definition of {key} for {schema} produced an unserializable value: {message}")]
    Unserializable {
        /// The definition key.
        key: String,
        /// The node being resolved.
        schema: String,
        /// The serializer message.
        message: String,
    },

    /// A definition closure failed with an error of another kind.
    #[error("Definition of {key} for {schema} failed: {source}")]
    Evaluation {
        /// The definition key.
        key: String,
        /// The node being resolved.
        schema: String,
        /// The original failure.
        #[source]
        source: Box<super::Error>,
    },
}

impl DefinitionError {
    /// Wraps an arbitrary failure raised while evaluating a definition.
    pub fn evaluation(key: impl Into<String>, schema: impl Into<String>, source: super::Error) -> Self {
        Self::Evaluation {
            key: key.into(),
            schema: schema.into(),
            source: Box::new(source),
        }
    }
}
