use crate::config::{ChunkerConfig, ChunkingStrategy};
use crate::error::{ChunkerError, Result};
use crate::selector::select_strategy;
use crate::strategy::{StrategyExecutor, StrategyRequest};
use crate::types::{chunk_id, Category, Chunk, ChunkMetadata, Document};

/// Main chunker interface for processing documents
pub struct Chunker {
    executor: StrategyExecutor,
}

impl Chunker {
    /// Create a new chunker with configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self {
            executor: StrategyExecutor::new(config),
        })
    }

    /// Resolve a request into the strategy to run and the label to record
    #[must_use]
    pub fn resolve(
        request: &StrategyRequest,
        content: &str,
        category: &Category,
    ) -> (ChunkingStrategy, String) {
        match request {
            StrategyRequest::Auto => {
                let strategy = select_strategy(content, category);
                (strategy, strategy.as_str().to_string())
            }
            StrategyRequest::Strategy(strategy) => (*strategy, strategy.as_str().to_string()),
            StrategyRequest::Tagged(label) => (ChunkingStrategy::Default, label.clone()),
        }
    }

    /// Split raw text with one strategy
    #[must_use]
    pub fn chunk_str(&self, content: &str, strategy: ChunkingStrategy) -> Vec<String> {
        self.executor.execute(strategy, content)
    }

    /// Chunk a document into id'd chunks carrying its metadata
    pub fn chunk_document(
        &self,
        document: &Document,
        request: &StrategyRequest,
    ) -> Result<Vec<Chunk>> {
        let (strategy, label) =
            Self::resolve(request, &document.content, &document.metadata.category);
        let texts = self.executor.execute(strategy, &document.content);

        if texts.is_empty() {
            return Err(ChunkerError::empty_content(&document.id));
        }

        log::debug!(
            "Chunked {} with {} into {} chunks",
            document.id,
            strategy,
            texts.len()
        );

        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(index, content)| {
                let size = content.chars().count();
                Chunk {
                    id: chunk_id(&document.id, index),
                    metadata: ChunkMetadata::from_document(
                        &document.metadata,
                        index,
                        label.as_str(),
                        size,
                    ),
                    content,
                }
            })
            .collect())
    }

    /// Get statistics about chunking
    #[must_use]
    pub fn get_stats(chunks: &[Chunk]) -> ChunkingStats {
        let total_chars: usize = chunks.iter().map(Chunk::char_len).sum();
        ChunkingStats {
            total_chunks: chunks.len(),
            total_chars,
            avg_chars_per_chunk: if chunks.is_empty() {
                0
            } else {
                total_chars / chunks.len()
            },
            min_chars: chunks.iter().map(Chunk::char_len).min().unwrap_or(0),
            max_chars: chunks.iter().map(Chunk::char_len).max().unwrap_or(0),
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            executor: StrategyExecutor::new(ChunkerConfig::default()),
        }
    }
}

/// Statistics about chunking results
#[derive(Debug, Clone)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    pub total_chars: usize,
    pub avg_chars_per_chunk: usize,
    pub min_chars: usize,
    pub max_chars: usize,
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} | Chars: {} | Avg: {} | Range: {}-{}",
            self.total_chunks,
            self.total_chars,
            self.avg_chars_per_chunk,
            self.min_chars,
            self.max_chars
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMetadata;
    use pretty_assertions::assert_eq;

    const RUNNING_CONFIG: &str = "interface Gi0/1\n description access\n!\ninterface Gi0/2\n description trunk\n!\ninterface Gi0/3\n shutdown\n";

    fn doc(id: &str, content: &str) -> Document {
        Document::new(
            id,
            content,
            DocumentMetadata::new("r1.cfg", "text/plain", "2024-01-01T00:00:00Z", 64),
        )
    }

    #[test]
    fn test_auto_selects_semantic_cisco() {
        let chunker = Chunker::default();
        let chunks = chunker
            .chunk_document(
                &doc("d1", "interface Fa0/0\n description test\n!\n"),
                &StrategyRequest::Auto,
            )
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "d1_chunk_0");
        assert_eq!(chunks[0].metadata.chunking_strategy, "semantic_cisco");
        assert_eq!(chunks[0].metadata.category, Category::General);
    }

    #[test]
    fn test_chunk_ids_are_dense() {
        let chunker = Chunker::default();
        let chunks = chunker
            .chunk_document(
                &doc("cfg", RUNNING_CONFIG),
                &StrategyRequest::Strategy(ChunkingStrategy::ContextAware),
            )
            .unwrap();

        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.id, format!("cfg_chunk_{i}"));
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.chunk_size, chunk.content.chars().count());
            assert_eq!(chunk.metadata.filename, "r1.cfg");
        }
    }

    #[test]
    fn test_tagged_request_uses_default_with_label() {
        let chunker = Chunker::default();
        let chunks = chunker
            .chunk_document(
                &doc("kb", "interface Gi0/0\n description x"),
                &StrategyRequest::knowledge(),
            )
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.chunking_strategy, "knowledge");
    }

    #[test]
    fn test_chunk_empty_content() {
        let chunker = Chunker::default();
        let err = chunker
            .chunk_document(&doc("empty", "  \n "), &StrategyRequest::Auto)
            .unwrap_err();
        assert!(matches!(err, ChunkerError::EmptyContent(id) if id == "empty"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ChunkerConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(Chunker::new(config).is_err());
    }

    #[test]
    fn test_chunking_stats() {
        let chunker = Chunker::default();
        let chunks = chunker
            .chunk_document(
                &doc("cfg", RUNNING_CONFIG),
                &StrategyRequest::Strategy(ChunkingStrategy::SemanticCisco),
            )
            .unwrap();
        let stats = Chunker::get_stats(&chunks);

        assert_eq!(stats.total_chunks, chunks.len());
        assert!(stats.min_chars <= stats.avg_chars_per_chunk);
        assert!(stats.avg_chars_per_chunk <= stats.max_chars);
        assert!(stats.to_string().starts_with("Chunks: "));
    }
}
