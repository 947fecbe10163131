use crate::error::Result;
use crate::pipeline::IngestionPipeline;
use netrag_chunker::{parent_document_id, ChunkingStrategy, Document, StrategyRequest};
use netrag_protocol::{CollectionStats, Metadata, Outcome, StoredDocument, StrategyInfo};
use netrag_vector_store::{where_eq, CollectionHandle, DeleteRequest, GetRequest};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Chunks fetched when reassembling documents for listing
pub const LIST_LIMIT: usize = 1000;
/// Chunks fetched when computing collection statistics
pub const STATS_LIMIT: usize = 10_000;

/// Result of one successful ingestion
#[derive(Debug, Clone, Serialize)]
pub struct IngestReceipt {
    pub document_id: String,
    pub strategy: String,
    pub chunks: usize,
}

/// Document management on top of the shared collection
pub struct DocumentService {
    handle: Arc<CollectionHandle>,
    pipeline: IngestionPipeline,
}

impl DocumentService {
    pub fn new(handle: Arc<CollectionHandle>, pipeline: IngestionPipeline) -> Self {
        Self { handle, pipeline }
    }

    pub fn handle(&self) -> &Arc<CollectionHandle> {
        &self.handle
    }

    /// Chunk a document and submit all chunks in one batch
    pub async fn ingest(
        &self,
        document: &Document,
        request: &StrategyRequest,
    ) -> Result<IngestReceipt> {
        let collection = self.handle.collection()?;
        let prepared = self.pipeline.prepare(document, request)?;
        collection.add(prepared.to_add_request()).await?;

        log::info!(
            "Document {} added with {} chunks using {} strategy",
            document.metadata.filename,
            prepared.len(),
            prepared.strategy
        );

        Ok(IngestReceipt {
            document_id: prepared.document_id,
            strategy: prepared.strategy,
            chunks: prepared.chunks.len(),
        })
    }

    pub async fn add_document(
        &self,
        document: &Document,
        request: &StrategyRequest,
    ) -> Outcome<bool> {
        match self.ingest(document, request).await {
            Ok(_) => Outcome::ok(true),
            Err(e) => {
                log::error!("Error adding document {}: {e}", document.id);
                Outcome::failed(false, e.to_string())
            }
        }
    }

    /// Reassemble stored documents from their chunks
    pub async fn get_all_documents(&self) -> Outcome<Vec<StoredDocument>> {
        match self.try_get_all_documents().await {
            Ok(documents) => Outcome::ok(documents),
            Err(e) => {
                log::error!("Error getting all documents: {e}");
                Outcome::failed(Vec::new(), e.to_string())
            }
        }
    }

    async fn try_get_all_documents(&self) -> Result<Vec<StoredDocument>> {
        let collection = self.handle.collection()?;
        let results = collection.get(GetRequest::limit(LIST_LIMIT)).await?;

        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<(usize, String, Metadata)>> = HashMap::new();

        for ((id, content), metadata) in results
            .ids
            .into_iter()
            .zip(results.documents)
            .zip(results.metadatas)
        {
            let parent = parent_document_id(&id).to_string();
            let index = chunk_index(&metadata);
            groups
                .entry(parent.clone())
                .or_insert_with(|| {
                    order.push(parent);
                    Vec::new()
                })
                .push((index, content, metadata));
        }

        Ok(order
            .into_iter()
            .filter_map(|id| {
                let mut chunks = groups.remove(&id)?;
                chunks.sort_by_key(|(index, _, _)| *index);
                let chunk_count = chunks.len();
                let metadata = chunks[0].2.clone();
                let content = chunks
                    .into_iter()
                    .map(|(_, content, _)| content)
                    .collect::<Vec<_>>()
                    .join("\n\n");
                Some(StoredDocument {
                    id,
                    content,
                    metadata,
                    chunk_count,
                })
            })
            .collect())
    }

    /// Delete every chunk whose stored filename equals `filename`
    ///
    /// Uploads that share a filename are removed together.
    pub async fn delete_document(&self, filename: &str) -> Outcome<bool> {
        match self.try_delete_document(filename).await {
            Ok(true) => {
                log::info!("Document {filename} deleted");
                Outcome::ok(true)
            }
            Ok(false) => Outcome::ok(false).with_message(format!("No chunks stored for {filename}")),
            Err(e) => {
                log::error!("Error deleting document {filename}: {e}");
                Outcome::failed(false, e.to_string())
            }
        }
    }

    async fn try_delete_document(&self, filename: &str) -> Result<bool> {
        let collection = self.handle.collection()?;
        let matched = collection
            .get(GetRequest::filtered(where_eq("filename", filename)))
            .await?;

        if matched.ids.is_empty() {
            return Ok(false);
        }

        collection.delete(DeleteRequest { ids: matched.ids }).await?;
        Ok(true)
    }

    pub async fn collection_stats(&self) -> Outcome<CollectionStats> {
        match self.try_collection_stats().await {
            Ok(stats) => Outcome::ok(stats),
            Err(e) => {
                log::error!("Error getting collection stats: {e}");
                Outcome::failed(CollectionStats::default(), e.to_string())
            }
        }
    }

    async fn try_collection_stats(&self) -> Result<CollectionStats> {
        let collection = self.handle.collection()?;
        let results = collection.get(GetRequest::limit(STATS_LIMIT)).await?;

        let mut documents: Vec<&str> = results.ids.iter().map(|id| parent_document_id(id)).collect();
        documents.sort_unstable();
        documents.dedup();

        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        for metadata in &results.metadatas {
            let category = metadata
                .get("category")
                .and_then(Value::as_str)
                .unwrap_or("general");
            *categories.entry(category.to_string()).or_insert(0) += 1;
        }

        Ok(CollectionStats {
            total_documents: documents.len(),
            total_chunks: results.ids.len(),
            categories,
        })
    }

    pub async fn is_server_running(&self) -> bool {
        self.handle.is_alive().await
    }

    pub fn available_strategies() -> Vec<StrategyInfo> {
        ChunkingStrategy::ALL
            .into_iter()
            .map(|strategy| StrategyInfo {
                name: strategy.as_str().to_string(),
                display_name: strategy.display_name().to_string(),
            })
            .collect()
    }
}

fn chunk_index(metadata: &Metadata) -> usize {
    metadata
        .get("chunkIndex")
        .and_then(Value::as_u64)
        .map_or(0, |index| index as usize)
}
