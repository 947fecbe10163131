//! # netrag vector store
//!
//! Similarity search over chunk text plus metadata, behind a small
//! collection API (add / query / get / delete).
//!
//! ## Backends
//!
//! - **MemoryStore**: in-process, brute-force cosine search, optional JSON
//!   snapshot per collection
//! - **ChromaStore**: Chroma server over its v1 REST API
//!
//! Both embed text with the same deterministic [`HashingEmbedder`], so a
//! corpus behaves the same whichever backend holds it.
//!
//! ## Example
//!
//! ```no_run
//! use netrag_vector_store::{
//!     default_collection_metadata, AddRequest, MemoryStore, QueryRequest, VectorStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> netrag_vector_store::Result<()> {
//!     let store = MemoryStore::new();
//!     let docs = store
//!         .get_or_create_collection("network_documents", default_collection_metadata())
//!         .await?;
//!
//!     docs.add(AddRequest {
//!         ids: vec!["r1_chunk_0".into()],
//!         documents: vec!["router ospf 1\n network 10.0.0.0 0.0.0.255 area 0".into()],
//!         metadatas: vec![Default::default()],
//!     })
//!     .await?;
//!
//!     let hits = docs.query(QueryRequest::new("ospf area", 5)).await?;
//!     println!("{:?}", hits.ids);
//!     Ok(())
//! }
//! ```

mod chroma;
mod embeddings;
mod error;
mod memory;
mod store;
mod types;

pub use chroma::{ChromaCollection, ChromaStore, DEFAULT_CHROMA_URL};
pub use embeddings::{Embedder, HashingEmbedder, DEFAULT_DIMENSION};
pub use error::{Result, VectorStoreError};
pub use memory::{MemoryCollection, MemoryStore};
pub use store::{
    default_collection_metadata, Collection, CollectionHandle, VectorStore, DEFAULT_COLLECTION,
};
pub use types::{
    matches_where, where_eq, AddRequest, DeleteRequest, GetRequest, GetResponse, QueryRequest,
    QueryResponse, Where,
};

pub use netrag_protocol::Metadata;
