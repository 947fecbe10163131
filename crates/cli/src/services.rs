use crate::config::{AppConfig, StoreKind};
use anyhow::{Context, Result};
use netrag_completion::{CompletionService, OllamaClient};
use netrag_indexer::{DocumentService, IngestionPipeline, KnowledgeLibrary};
use netrag_search::{Assistant, PromptComposer, RetrievalService};
use netrag_vector_store::{ChromaStore, CollectionHandle, MemoryStore, VectorStore};
use std::sync::Arc;

/// Every service, built once from the startup config and shared by reference
pub struct AppServices {
    pub documents: Arc<DocumentService>,
    pub retrieval: Arc<RetrievalService>,
    pub assistant: Assistant,
    pub library: KnowledgeLibrary,
}

impl AppServices {
    pub async fn build(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn VectorStore> = match config.store {
            StoreKind::Memory => match &config.data_dir {
                Some(dir) => Arc::new(MemoryStore::persistent(dir)),
                None => Arc::new(MemoryStore::new()),
            },
            StoreKind::Chroma => Arc::new(ChromaStore::new(config.chroma_url.clone())),
        };
        let handle = Arc::new(CollectionHandle::connect(store, &config.collection).await);

        let pipeline = IngestionPipeline::new(config.chunking.clone())
            .context("Failed to build ingestion pipeline")?;
        let documents = Arc::new(DocumentService::new(handle.clone(), pipeline));
        let retrieval = Arc::new(RetrievalService::new(handle, config.retrieval.clone()));

        let completion: Arc<dyn CompletionService> =
            Arc::new(OllamaClient::new(config.ollama.clone()));
        let assistant = Assistant::new(
            retrieval.clone(),
            documents.clone(),
            completion,
            PromptComposer::new(config.system_prompt.clone()),
        )
        .with_context_limit(config.context_limit);

        let library = KnowledgeLibrary::builtin().context("Failed to load knowledge library")?;

        Ok(Self {
            documents,
            retrieval,
            assistant,
            library,
        })
    }
}
