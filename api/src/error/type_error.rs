//! Type mismatches in the schema tree and in settings options.

use thiserror::Error;

/// A value or name has the wrong kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A child name is already bound to a node of the other kind.
    #[error("'{name}' is already defined as {existing} in {scope} and cannot be redefined as {requested}")]
    NameConflict {
        /// The conflicting child name.
        name: String,
        /// The enclosing scope.
        scope: String,
        /// Kind of the node already registered (`scope` or `operation`).
        existing: &'static str,
        /// Kind of the node that was requested.
        requested: &'static str,
    },

    /// An option value failed its declared type check.
    #[error("Option '{option}' of {schema} expects {expected}, got {actual}")]
    OptionType {
        /// The option name.
        option: String,
        /// The schema node being constructed.
        schema: String,
        /// The declared type.
        expected: String,
        /// The type of the value received.
        actual: String,
    },

    /// A custom option coercion rejected its input.
    #[error("Option '{option}' of {schema} cannot be coerced: {message}")]
    Coercion {
        /// The option name.
        option: String,
        /// The schema node being constructed.
        schema: String,
        /// Message returned by the coercion.
        message: String,
    },

    /// Options passed to a builder were not a mapping.
    #[error("Options for {schema} must be a mapping, got {actual}")]
    NotAMapping {
        /// The schema node being constructed.
        schema: String,
        /// The type of the value received.
        actual: String,
    },
}
