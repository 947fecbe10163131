use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics about a batch ingestion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    /// Files read from disk
    pub files: usize,

    /// Documents accepted by the store
    pub documents: usize,

    /// Chunks submitted
    pub chunks: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Documents per recorded strategy label
    pub strategies: BTreeMap<String, usize>,

    /// Errors encountered
    pub errors: Vec<String>,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, strategy: &str, chunks: usize) {
        self.documents += 1;
        self.chunks += chunks;
        *self.strategies.entry(strategy.to_string()).or_insert(0) += 1;
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }
}
