use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key/value metadata record as stored next to each chunk
pub type Metadata = Map<String, Value>;

pub const DEFAULT_SEARCH_LIMIT: usize = 5;
pub const DEFAULT_CATEGORY_LIMIT: usize = 3;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Ok,
    Failed,
}

/// Result of a service operation that always carries a usable value
///
/// Failures keep a fallback value (empty list, `false`, fallback text) and a
/// message instead of surfacing an error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Outcome<T> {
    pub status: OutcomeStatus,
    pub value: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            status: OutcomeStatus::Ok,
            value,
            message: None,
        }
    }

    pub fn failed(value: T, message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            value,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, OutcomeStatus::Ok)
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            status: self.status,
            value: f(self.value),
            message: self.message,
        }
    }
}

/// A document reassembled from its stored chunks
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub chunk_count: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub total_documents: usize,
    pub total_chunks: usize,
    pub categories: BTreeMap<String, usize>,
}

/// One similarity match; lower distance is closer
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub distance: f32,
}

impl SearchHit {
    pub fn filename(&self) -> &str {
        self.metadata
            .get("filename")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }

    pub fn category(&self) -> &str {
        self.metadata
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or("general")
    }
}

/// Three independent retrieval pools
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct EnhancedResults {
    pub general: Vec<SearchHit>,
    pub error_patterns: Vec<SearchHit>,
    pub best_practices: Vec<SearchHit>,
}

impl EnhancedResults {
    pub fn is_empty(&self) -> bool {
        self.general.is_empty() && self.error_patterns.is_empty() && self.best_practices.is_empty()
    }

    pub fn total(&self) -> usize {
        self.general.len() + self.error_patterns.len() + self.best_practices.len()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StrategyInfo {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct LibraryUploadReport {
    pub error_patterns: usize,
    pub best_practices: usize,
    pub network_protocols: usize,
    pub failed: Vec<String>,
}

impl LibraryUploadReport {
    pub fn total(&self) -> usize {
        self.error_patterns + self.best_practices + self.network_protocols
    }
}

/// How the assistant should use the document store
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    /// Prompt goes straight to the completion service
    #[default]
    Direct,
    /// Answer from retrieved documents
    Document,
    /// Retrieved context plus configuration commands to run
    Agent,
}

impl ChatMode {
    pub fn uses_context(self) -> bool {
        !matches!(self, Self::Direct)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AssistantStatus {
    pub completion_available: bool,
    pub model: String,
    pub models: Vec<String>,
    pub vector_store_running: bool,
    pub stats: CollectionStats,
}

// HTTP request bodies

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EnhancedSearchRequest {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default)]
    pub mode: ChatMode,
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn outcome_serializes_status_and_skips_empty_message() {
        let ok = serde_json::to_value(Outcome::ok(true)).unwrap();
        assert_eq!(ok, json!({"status": "ok", "value": true}));

        let failed = serde_json::to_value(Outcome::failed(Vec::<u8>::new(), "down")).unwrap();
        assert_eq!(
            failed,
            json!({"status": "failed", "value": [], "message": "down"})
        );
    }

    #[test]
    fn outcome_map_keeps_status() {
        let outcome = Outcome::failed(3, "partial").map(|n| n * 2);
        assert!(!outcome.is_ok());
        assert_eq!(outcome.value, 6);
        assert_eq!(outcome.message.as_deref(), Some("partial"));
    }

    #[test]
    fn search_request_defaults() {
        let req: SearchRequest = serde_json::from_value(json!({"query": "ospf"})).unwrap();
        assert_eq!(req.limit, DEFAULT_SEARCH_LIMIT);
        assert!(req.category.is_none());

        let chat: ChatRequest = serde_json::from_value(json!({"prompt": "hi"})).unwrap();
        assert_eq!(chat.mode, ChatMode::Direct);
        let chat: ChatRequest =
            serde_json::from_value(json!({"prompt": "hi", "mode": "agent"})).unwrap();
        assert!(chat.mode.uses_context());
    }

    #[test]
    fn hit_accessors_fall_back() {
        let hit = SearchHit {
            id: "x_chunk_0".into(),
            content: "c".into(),
            metadata: Metadata::new(),
            distance: 0.1,
        };
        assert_eq!(hit.filename(), "unknown");
        assert_eq!(hit.category(), "general");
    }
}
