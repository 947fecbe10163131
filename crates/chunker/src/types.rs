use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

const CHUNK_SEPARATOR: &str = "_chunk_";

/// Build the store id of the `index`-th chunk of a document
#[must_use]
pub fn chunk_id(document_id: &str, index: usize) -> String {
    format!("{document_id}{CHUNK_SEPARATOR}{index}")
}

/// Recover the parent document id from a chunk id
///
/// Everything before the first `_chunk_` is the document id; ids without the
/// separator are returned unchanged.
#[must_use]
pub fn parent_document_id(chunk_id: &str) -> &str {
    chunk_id
        .split_once(CHUNK_SEPARATOR)
        .map_or(chunk_id, |(parent, _)| parent)
}

/// Retrieval partition of a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    General,
    ErrorPatterns,
    BestPractices,
    NetworkProtocols,
    Custom(String),
}

impl Category {
    /// Parse a wire name; known names always map to their variant
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "general" => Self::General,
            "error_patterns" => Self::ErrorPatterns,
            "best_practices" => Self::BestPractices,
            "network_protocols" => Self::NetworkProtocols,
            other => Self::Custom(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::General => "general",
            Self::ErrorPatterns => "error_patterns",
            Self::BestPractices => "best_practices",
            Self::NetworkProtocols => "network_protocols",
            Self::Custom(name) => name,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied metadata of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub filename: String,
    pub file_type: String,
    /// ISO-8601 timestamp string
    pub upload_date: String,
    /// Size of the original upload in bytes
    pub size: u64,
    #[serde(default)]
    pub category: Category,
    /// Additional fields copied verbatim onto every chunk
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DocumentMetadata {
    pub fn new(
        filename: impl Into<String>,
        file_type: impl Into<String>,
        upload_date: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            filename: filename.into(),
            file_type: file_type.into(),
            upload_date: upload_date.into(),
            size,
            category: Category::General,
            extra: BTreeMap::new(),
        }
    }

    /// Builder: set category
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Builder: attach an extra metadata field
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A unit of knowledge submitted for ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
        }
    }
}

/// Metadata stored alongside every chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub filename: String,
    pub file_type: String,
    pub upload_date: String,
    pub size: u64,
    #[serde(default)]
    pub category: Category,
    pub chunk_index: usize,
    /// Strategy wire name, or the requested label for tagged requests
    pub chunking_strategy: String,
    /// Length of the chunk text in characters
    pub chunk_size: usize,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ChunkMetadata {
    pub fn from_document(
        metadata: &DocumentMetadata,
        chunk_index: usize,
        chunking_strategy: impl Into<String>,
        chunk_size: usize,
    ) -> Self {
        Self {
            filename: metadata.filename.clone(),
            file_type: metadata.file_type.clone(),
            upload_date: metadata.upload_date.clone(),
            size: metadata.size,
            category: metadata.category.clone(),
            chunk_index,
            chunking_strategy: chunking_strategy.into(),
            chunk_size,
            extra: metadata.extra.clone(),
        }
    }

    /// Flatten into the key/value record handed to the vector store
    ///
    /// Extra fields never shadow the fixed keys.
    #[must_use]
    pub fn to_json_map(&self) -> Map<String, Value> {
        let mut map: Map<String, Value> = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        map.insert("filename".into(), Value::from(self.filename.as_str()));
        map.insert("fileType".into(), Value::from(self.file_type.as_str()));
        map.insert("uploadDate".into(), Value::from(self.upload_date.as_str()));
        map.insert("size".into(), Value::from(self.size));
        map.insert("category".into(), Value::from(self.category.as_str()));
        map.insert("chunkIndex".into(), Value::from(self.chunk_index));
        map.insert(
            "chunkingStrategy".into(),
            Value::from(self.chunking_strategy.as_str()),
        );
        map.insert("chunkSize".into(), Value::from(self.chunk_size));
        map
    }
}

/// A stored, independently retrievable piece of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Length of the chunk text in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.metadata.chunk_size
    }
}
