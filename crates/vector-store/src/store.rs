use crate::error::{Result, VectorStoreError};
use crate::types::{AddRequest, DeleteRequest, GetRequest, GetResponse, QueryRequest, QueryResponse};
use async_trait::async_trait;
use netrag_protocol::Metadata;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_COLLECTION: &str = "network_documents";

/// Metadata attached when the document collection is first created
pub fn default_collection_metadata() -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("hnsw:space".into(), Value::from("cosine"));
    metadata.insert(
        "description".into(),
        Value::from("Network engineering documents for RAG"),
    );
    metadata
}

/// A named set of documents with embeddings and metadata
#[async_trait]
pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    async fn add(&self, request: AddRequest) -> Result<()>;

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse>;

    async fn get(&self, request: GetRequest) -> Result<GetResponse>;

    async fn delete(&self, request: DeleteRequest) -> Result<()>;
}

/// Connection to a vector store server or in-process store
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Liveness probe; returns the server clock in nanoseconds
    async fn heartbeat(&self) -> Result<u64>;

    async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: Metadata,
    ) -> Result<Arc<dyn Collection>>;
}

/// Store plus the collection opened at startup
///
/// Opening may fail when the server is down; the handle stays usable and
/// every collection access reports `NotInitialized` until restart.
pub struct CollectionHandle {
    store: Arc<dyn VectorStore>,
    name: String,
    collection: Option<Arc<dyn Collection>>,
}

impl CollectionHandle {
    pub async fn connect(store: Arc<dyn VectorStore>, name: &str) -> Self {
        let collection = match store
            .get_or_create_collection(name, default_collection_metadata())
            .await
        {
            Ok(collection) => {
                log::info!("Opened vector collection '{name}'");
                Some(collection)
            }
            Err(e) => {
                log::error!("Failed to open vector collection '{name}': {e}");
                None
            }
        };

        Self {
            store,
            name: name.to_string(),
            collection,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.collection.is_some()
    }

    pub fn collection(&self) -> Result<&Arc<dyn Collection>> {
        self.collection
            .as_ref()
            .ok_or_else(|| VectorStoreError::NotInitialized(self.name.clone()))
    }

    /// True when the store answers its heartbeat
    pub async fn is_alive(&self) -> bool {
        match self.store.heartbeat().await {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Vector store heartbeat failed: {e}");
                false
            }
        }
    }
}
