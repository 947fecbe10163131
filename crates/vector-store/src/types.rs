use crate::error::{Result, VectorStoreError};
use netrag_protocol::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Equality filter: every key must match the stored metadata value
pub type Where = Metadata;

/// Build a single-key equality filter
pub fn where_eq(key: impl Into<String>, value: impl Into<Value>) -> Where {
    let mut filter = Where::new();
    filter.insert(key.into(), value.into());
    filter
}

/// Check a metadata record against an equality filter
pub fn matches_where(metadata: &Metadata, filter: Option<&Where>) -> bool {
    filter.map_or(true, |filter| {
        filter
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected))
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddRequest {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
}

impl AddRequest {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Parallel arrays must line up
    pub fn validate(&self) -> Result<()> {
        if self.documents.len() != self.ids.len() || self.metadatas.len() != self.ids.len() {
            return Err(VectorStoreError::invalid_request(format!(
                "ids ({}), documents ({}) and metadatas ({}) differ in length",
                self.ids.len(),
                self.documents.len(),
                self.metadatas.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query_texts: Vec<String>,
    pub n_results: usize,
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_: Option<Where>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, n_results: usize) -> Self {
        Self {
            query_texts: vec![query.into()],
            n_results,
            where_: None,
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: Option<Where>) -> Self {
        self.where_ = filter;
        self
    }
}

/// One row of results per query text, ordered by ascending distance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub ids: Vec<Vec<String>>,
    pub documents: Vec<Vec<String>>,
    pub metadatas: Vec<Vec<Metadata>>,
    pub distances: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_: Option<Where>,
}

impl GetRequest {
    pub fn limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            where_: None,
        }
    }

    pub fn filtered(filter: Where) -> Self {
        Self {
            limit: None,
            where_: Some(filter),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetResponse {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub ids: Vec<String>,
}
