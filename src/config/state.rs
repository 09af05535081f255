// Application state module
// Read-only state shared by every connection task

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use super::types::Config;
use crate::logger::{writer, LogWriter};
use crate::registry::ResponseRegistry;

/// Application state
///
/// Built once before the listener starts; nothing in it is written after that
/// except the connection counter.
pub struct AppState {
    pub config: Config,
    pub registry: ResponseRegistry,
    pub active_connections: AtomicUsize,
    /// Sink for per-request access records
    pub access_log: Arc<LogWriter>,
}

impl AppState {
    pub fn new(config: Config, registry: ResponseRegistry) -> Self {
        Self {
            config,
            registry,
            active_connections: AtomicUsize::new(0),
            access_log: writer::shared(),
        }
    }

    /// Send access records to `sink` instead of the global writer
    #[must_use]
    pub fn with_access_log(mut self, sink: Arc<LogWriter>) -> Self {
        self.access_log = sink;
        self
    }
}
