//! Layered error types for client definitions and calls.
//!
//! Every failure a caller can observe maps onto one [`ErrorKind`]:
//! - [`NameError`] - a DSL name violates the identifier format or is reserved
//! - [`TypeError`] - a name collides across scope/operation, or an option has the wrong type
//! - [`KeyError`] - a required option is missing, or a member does not exist
//! - [`ValidationError`] - a settings validator rejected the options
//! - [`DefinitionError`] - the client definition itself cannot be resolved
//! - [`ResponseError`] - the server answered with a status declared as an error
//! - [`UnexpectedResponseError`] - the server answered with an undeclared status
//! - [`ConnectionError`] - transport and encoding failures

mod connection_error;
mod definition_error;
mod key_error;
mod name_error;
mod response_error;
mod type_error;
mod validation_error;

pub use connection_error::ConnectionError;
pub use definition_error::DefinitionError;
pub use key_error::KeyError;
pub use name_error::NameError;
pub use response_error::{ResponseError, UnexpectedResponseError};
pub use type_error::TypeError;
pub use validation_error::ValidationError;

use strum::Display;
use thiserror::Error;

/// Top-level error type for all definition and call failures.
///
/// ## Examples
///
/// ```rust,ignore
/// use scoped_api::Error;
///
/// match operation.call(serde_json::Value::Null) {
///     Ok(value) => println!("{value}"),
///     Err(Error::Response(e)) => eprintln!("declared error {}: {}", e.status, e.data),
///     Err(e) if e.is_input_error() => eprintln!("bad options: {e}"),
///     Err(e) => return Err(e),
/// }
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or reserved name in the DSL.
    #[error(transparent)]
    Name(#[from] NameError),

    /// Name collision or option type mismatch.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Missing required option or unknown member.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A settings validator failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The client definition could not be resolved.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The response status was declared with `raise`.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// The response status was not declared at all.
    #[error(transparent)]
    UnexpectedResponse(#[from] UnexpectedResponseError),

    /// Transport or encoding failure.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Classification of an [`Error`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Name,
    Type,
    Key,
    Validation,
    Definition,
    Response,
    UnexpectedResponse,
    Connection,
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Name(_) => ErrorKind::Name,
            Self::Type(_) => ErrorKind::Type,
            Self::Key(_) => ErrorKind::Key,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Definition(_) => ErrorKind::Definition,
            Self::Response(_) => ErrorKind::Response,
            Self::UnexpectedResponse(_) => ErrorKind::UnexpectedResponse,
            Self::Connection(_) => ErrorKind::Connection,
        }
    }

    /// Returns `true` if the error was caused by the options a caller passed
    /// in, rather than by the client definition or the remote server.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Type(_) | Self::Key(_) | Self::Validation(_))
    }

    /// Returns `true` if this error came back from the remote server.
    pub fn is_response_error(&self) -> bool {
        matches!(self, Self::Response(_) | Self::UnexpectedResponse(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Connection(ConnectionError::Decode(source))
    }
}
