use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur while chunking a document
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Content had no non-whitespace characters
    #[error("Document {0} has no content to chunk")]
    EmptyContent(String),

    /// Unknown strategy name where a concrete strategy was required
    #[error("Unknown chunking strategy: {0}")]
    UnknownStrategy(String),
}

impl ChunkerError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an empty content error for a document id
    pub fn empty_content(document_id: impl Into<String>) -> Self {
        Self::EmptyContent(document_id.into())
    }
}
