use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] netrag_vector_store::VectorStoreError),

    #[error("Completion error: {0}")]
    CompletionError(#[from] netrag_completion::CompletionError),

    #[error("Malformed query response: {0}")]
    MalformedResponse(String),
}
