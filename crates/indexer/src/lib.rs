//! # netrag Indexer
//!
//! Document ingestion and management for network configuration retrieval.
//!
//! ## Pipeline
//!
//! ```text
//! File / directory / knowledge library
//!     │
//!     ├──> DocumentScanner (walkdir)
//!     │      └─> Document {id, content, metadata}
//!     │
//!     ├──> IngestionPipeline
//!     │      ├─> StrategyRequest resolution (auto / explicit / tagged)
//!     │      └─> Chunks with {documentId}_chunk_{i} ids
//!     │
//!     └──> DocumentService (one batched add per document)
//!            └─> Collection
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use netrag_indexer::{DirectoryIngestor, DocumentService, IngestionPipeline};
//! use netrag_vector_store::{CollectionHandle, MemoryStore, DEFAULT_COLLECTION};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = CollectionHandle::connect(Arc::new(MemoryStore::new()), DEFAULT_COLLECTION).await;
//!     let service = Arc::new(DocumentService::new(Arc::new(handle), IngestionPipeline::default()));
//!     let stats = DirectoryIngestor::new(service, "/path/to/configs").run().await?;
//!
//!     println!("Ingested {} files, {} chunks", stats.documents, stats.chunks);
//!     Ok(())
//! }
//! ```

mod documents;
mod error;
mod ingest;
mod knowledge;
mod pipeline;
mod scanner;
mod stats;

pub use documents::{DocumentService, IngestReceipt, LIST_LIMIT, STATS_LIMIT};
pub use error::{IndexerError, Result};
pub use ingest::DirectoryIngestor;
pub use knowledge::{
    BestPractice, ConfigurationReview, ErrorPattern, KnowledgeLibrary, KnowledgeMatches,
    KnowledgeStats, LibraryKind, LibraryStats, NetworkProtocol, Severity,
};
pub use pipeline::{IngestionPipeline, PreparedDocument};
pub use scanner::DocumentScanner;
pub use stats::IngestStats;
