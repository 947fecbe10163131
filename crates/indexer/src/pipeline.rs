use crate::error::Result;
use netrag_chunker::{Chunk, Chunker, ChunkerConfig, Document, StrategyRequest};
use netrag_vector_store::AddRequest;

/// Chunks of one document, ready for a single batched `add`
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub document_id: String,
    /// Value recorded as `chunkingStrategy` on every chunk
    pub strategy: String,
    pub chunks: Vec<Chunk>,
}

impl PreparedDocument {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn to_add_request(&self) -> AddRequest {
        AddRequest {
            ids: self.chunks.iter().map(|c| c.id.clone()).collect(),
            documents: self.chunks.iter().map(|c| c.content.clone()).collect(),
            metadatas: self
                .chunks
                .iter()
                .map(|c| c.metadata.to_json_map())
                .collect(),
        }
    }
}

/// Strategy resolution, chunking and metadata tagging
pub struct IngestionPipeline {
    chunker: Chunker,
}

impl IngestionPipeline {
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        Ok(Self {
            chunker: Chunker::new(config)?,
        })
    }

    pub fn prepare(
        &self,
        document: &Document,
        request: &StrategyRequest,
    ) -> Result<PreparedDocument> {
        let chunks = self.chunker.chunk_document(document, request)?;
        let strategy = chunks
            .first()
            .map(|c| c.metadata.chunking_strategy.clone())
            .unwrap_or_default();
        log::debug!("{}: {}", document.id, Chunker::get_stats(&chunks));

        Ok(PreparedDocument {
            document_id: document.id.clone(),
            strategy,
            chunks,
        })
    }
}

impl Default for IngestionPipeline {
    fn default() -> Self {
        Self {
            chunker: Chunker::default(),
        }
    }
}
