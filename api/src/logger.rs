//! Optional logging hook for resolvers and settings validators.
//!
//! Containers carry an optional [`Logger`]. When none is set, nothing is
//! logged through the hook. [`TracingLogger`] forwards to `tracing`.

use std::fmt;
use std::sync::Arc;

/// Receives resolver and validator messages.
///
/// Messages are built lazily so that a disabled logger costs nothing.
pub trait Logger: Send + Sync + fmt::Debug {
    /// Logs a successful step.
    fn debug(&self, tag: &str, message: &dyn Fn() -> String);

    /// Logs a failure right before it is returned.
    fn error(&self, tag: &str, message: &dyn Fn() -> String);
}

/// Forwards hook messages to `tracing` events with the tag as a field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Returns a shared instance ready to be installed on a client.
    pub fn shared() -> Arc<dyn Logger> {
        Arc::new(Self)
    }
}

impl Logger for TracingLogger {
    fn debug(&self, tag: &str, message: &dyn Fn() -> String) {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(tag, "{}", message());
        }
    }

    fn error(&self, tag: &str, message: &dyn Fn() -> String) {
        tracing::error!(tag, "{}", message());
    }
}

pub(crate) fn debug(logger: Option<&Arc<dyn Logger>>, tag: &str, message: impl Fn() -> String) {
    if let Some(logger) = logger {
        logger.debug(tag, &message);
    }
}

pub(crate) fn error(logger: Option<&Arc<dyn Logger>>, tag: &str, message: impl Fn() -> String) {
    if let Some(logger) = logger {
        logger.error(tag, &message);
    }
}
