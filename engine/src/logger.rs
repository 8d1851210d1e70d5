//! Logging sink injected into the engine.
//!
//! The engine never logs through ambient state; it only talks to the
//! [`Logger`] it was built with. [`TracingLogger`] is the default and
//! forwards to `tracing`. [`MemoryLogger`] keeps every line, for tests and
//! for callers that want to replay output.

use std::sync::{Mutex, PoisonError};

use tracing::Level;

/// Target used for every event emitted by [`TracingLogger`].
pub const LOG_TARGET: &str = "command_dispatch";

/// Fire-and-forget, single-line message sink.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn debug(&self, message: &str);
}

/// Forwards messages to the `tracing` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: LOG_TARGET, "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: LOG_TARGET, "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: LOG_TARGET, "{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: LOG_TARGET, "{message}");
    }
}

/// Records every message in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages recorded at `level`, oldest first.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(Level::INFO, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::ERROR, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::WARN, message);
    }

    fn debug(&self, message: &str) {
        self.push(Level::DEBUG, message);
    }
}

/// Shared loggers, so a caller can keep a handle to what it injected.
impl<L: Logger + ?Sized> Logger for std::sync::Arc<L> {
    fn info(&self, message: &str) {
        (**self).info(message);
    }

    fn error(&self, message: &str) {
        (**self).error(message);
    }

    fn warn(&self, message: &str) {
        (**self).warn(message);
    }

    fn debug(&self, message: &str) {
        (**self).debug(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_filters_by_level() {
        let logger = MemoryLogger::new();
        logger.debug("one");
        logger.info("two");
        logger.debug("three");

        assert_eq!(logger.messages(Level::DEBUG), vec!["one", "three"]);
        assert_eq!(logger.messages(Level::INFO), vec!["two"]);
        assert_eq!(logger.entries().len(), 3);
    }

    #[test]
    fn test_arc_logger_shares_entries() {
        let shared = std::sync::Arc::new(MemoryLogger::new());
        let handle: Box<dyn Logger> = Box::new(shared.clone());
        handle.warn("careful");
        assert_eq!(shared.messages(Level::WARN), vec!["careful"]);
    }
}
