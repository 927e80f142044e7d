//! Diagnostics sink for lenient-mode warnings.

use std::sync::{Arc, Mutex};

use tracing::warn;

/// Receives warnings for items skipped in lenient mode.
pub trait Diagnostics: Send + Sync {
    fn warning(&self, message: &str);
}

/// Default sink: forwards to `tracing::warn!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warning(&self, message: &str) {
        warn!("{message}");
    }
}

/// Collects warnings in memory; mainly for tests and batch reporting.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    messages: Mutex<Vec<String>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn warning(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub(crate) fn default_sink() -> Arc<dyn Diagnostics> {
    Arc::new(TracingDiagnostics)
}
