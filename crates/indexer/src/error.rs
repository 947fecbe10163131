use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] netrag_chunker::ChunkerError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] netrag_vector_store::VectorStoreError),

    #[error("Invalid knowledge library {library}: {source}")]
    InvalidLibrary {
        library: &'static str,
        source: serde_json::Error,
    },

    #[error("Invalid document path: {0}")]
    InvalidPath(String),
}
