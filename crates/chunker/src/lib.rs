//! # netrag chunker
//!
//! Content-aware chunking of network configuration text for retrieval.
//!
//! ## Philosophy
//!
//! Device configurations, troubleshooting notes and best-practice write-ups
//! each have a natural unit of meaning. The chunker keeps those units intact:
//! an `interface` block stays together, an `Error:`/`Cause:`/`Solution:`
//! triple stays together, prose is cut on sentence boundaries.
//!
//! ## Architecture
//!
//! ```text
//! Document (id, content, metadata)
//!     │
//!     ├──> StrategyRequest (auto | named strategy | tagged label)
//!     │        └─> auto: select_strategy(content, category)
//!     │
//!     ├──> StrategyExecutor (pure, char-measured thresholds)
//!     │    ├─> default         sentence-aware fixed window
//!     │    ├─> context_aware   configuration blocks
//!     │    ├─> semantic_cisco  IOS command families
//!     │    └─> error_pattern   Error/Cause/Solution units
//!     │
//!     └──> Chunk[] with ids `{doc}_chunk_{i}` and provenance metadata
//! ```
//!
//! ## Example
//!
//! ```rust
//! use netrag_chunker::{Chunker, Document, DocumentMetadata, StrategyRequest};
//!
//! let chunker = Chunker::default();
//! let doc = Document::new(
//!     "d1",
//!     "interface Fa0/0\n description uplink\n!\n",
//!     DocumentMetadata::new("a.txt", "text", "2024-01-01T00:00:00Z", 39),
//! );
//!
//! let chunks = chunker.chunk_document(&doc, &StrategyRequest::Auto).unwrap();
//! assert_eq!(chunks[0].id, "d1_chunk_0");
//! assert_eq!(chunks[0].metadata.chunking_strategy, "semantic_cisco");
//! ```

mod chunker;
mod config;
mod error;
mod selector;
mod strategy;
mod types;

pub use chunker::{Chunker, ChunkingStats};
pub use config::{ChunkerConfig, ChunkingStrategy};
pub use error::{ChunkerError, Result};
pub use selector::select_strategy;
pub use strategy::{StrategyExecutor, StrategyRequest, KNOWLEDGE_TAG};
pub use types::{
    chunk_id, parent_document_id, Category, Chunk, ChunkMetadata, Document, DocumentMetadata,
};
