// In-process recall buffer for completed queries

use tracing::debug;

use crate::engine::Engine;
use crate::error::EngineError;

#[derive(Debug, Default)]
pub struct HistoryRecorder {
    entries: Vec<String>,
    flushed: bool,
}

impl HistoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed query with trailing line separators removed.
    ///
    /// Returns the stored entry, or `None` if nothing was left to store.
    pub fn record(&mut self, query: &str) -> Option<&str> {
        let entry = query.trim_end_matches(['\r', '\n']);
        if entry.is_empty() {
            return None;
        }
        self.entries.push(entry.to_string());
        self.entries.last().map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entry by 1-based position, as shown by the `!!` listing
    pub fn get(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    /// Hand the recorded queries to the engine for persistence.
    ///
    /// Only the first call reaches the engine, even when nothing was
    /// recorded; later calls do nothing.
    pub fn flush(&mut self, engine: &mut dyn Engine) -> Result<(), EngineError> {
        if self.flushed {
            return Ok(());
        }
        self.flushed = true;

        debug!(entries = self.entries.len(), "Persisting command history");
        engine.persist_history(&self.entries)
    }
}
