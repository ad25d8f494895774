//! Missing keys: required options and unknown members.

use thiserror::Error;

/// A name was looked up and not found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// A required settings option was not provided and has no default.
    #[error("Missing required option '{option}' for {schema}")]
    MissingOption {
        /// The missing option name.
        option: String,
        /// The schema node being constructed.
        schema: String,
    },

    /// A scope container has no child scope or operation with this name.
    #[error("{scope} has no scope or operation named '{name}'")]
    UnknownMember {
        /// The requested member name.
        name: String,
        /// The scope that was searched.
        scope: String,
    },
}
