//! Errors for names used in the definition DSL.

use thiserror::Error;

/// A scope, operation, option, attribute or validator name is not usable.
///
/// Raised while a schema is being defined; a schema that fails here is never
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name does not match the identifier format.
    #[error(
        "Invalid name '{name}': use lowercase latin letters, digits and underscores, start with a letter and end with a letter or digit"
    )]
    InvalidFormat {
        /// The rejected name.
        name: String,
    },

    /// The name is taken by the DSL or the chaining interface.
    #[error("Reserved name '{name}' cannot be used in a client definition")]
    Reserved {
        /// The rejected name.
        name: String,
    },
}

impl NameError {
    /// Returns the rejected name.
    pub fn name(&self) -> &str {
        match self {
            Self::InvalidFormat { name } | Self::Reserved { name } => name,
        }
    }
}
