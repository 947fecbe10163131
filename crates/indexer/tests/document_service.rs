use async_trait::async_trait;
use netrag_chunker::{Category, ChunkingStrategy, Document, DocumentMetadata, StrategyRequest};
use netrag_indexer::{DirectoryIngestor, DocumentService, IngestionPipeline, KnowledgeLibrary};
use netrag_vector_store::{
    Collection, CollectionHandle, GetRequest, MemoryStore, Metadata, Result, VectorStore,
    VectorStoreError, DEFAULT_COLLECTION,
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

const THREE_INTERFACES: &str = "interface Gi0/0\n ip address 10.0.0.1 255.255.255.0\n\
interface Gi0/1\n shutdown\n\
interface Gi0/2\n description spare";

async fn memory_service() -> DocumentService {
    let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new());
    let handle = CollectionHandle::connect(store, DEFAULT_COLLECTION).await;
    DocumentService::new(Arc::new(handle), IngestionPipeline::default())
}

fn document(id: &str, filename: &str, content: &str) -> Document {
    Document::new(
        id,
        content,
        DocumentMetadata::new(filename, "text/plain", "2024-01-01T00:00:00Z", content.len() as u64),
    )
}

struct DownStore;

#[async_trait]
impl VectorStore for DownStore {
    async fn heartbeat(&self) -> Result<u64> {
        Err(VectorStoreError::Http("connection refused".into()))
    }

    async fn get_or_create_collection(
        &self,
        _name: &str,
        _metadata: Metadata,
    ) -> Result<Arc<dyn Collection>> {
        Err(VectorStoreError::Http("connection refused".into()))
    }
}

#[tokio::test]
async fn auto_ingest_of_interface_block() {
    let service = memory_service().await;
    let d1 = document("d1", "a.txt", "interface Fa0/0\n description test\n!\n");

    let outcome = service.add_document(&d1, &StrategyRequest::Auto).await;
    assert!(outcome.is_ok());
    assert!(outcome.value);

    let stored = service
        .handle()
        .collection()
        .unwrap()
        .get(GetRequest::limit(10))
        .await
        .unwrap();
    assert_eq!(stored.ids, vec!["d1_chunk_0".to_string()]);
    let metadata = &stored.metadatas[0];
    assert_eq!(metadata["chunkingStrategy"], Value::from("semantic_cisco"));
    assert_eq!(metadata["category"], Value::from("general"));
    assert_eq!(metadata["filename"], Value::from("a.txt"));
    assert_eq!(metadata["chunkIndex"], Value::from(0));
}

#[tokio::test]
async fn delete_by_filename_lowers_stats() {
    let service = memory_service().await;
    let keep = document("keep", "keep.txt", "interface Fa0/0\n description keep\n!\n");
    let gone = document("gone", "core.cfg", THREE_INTERFACES);

    assert!(service.add_document(&keep, &StrategyRequest::Auto).await.value);
    assert!(
        service
            .add_document(&gone, &StrategyRequest::Strategy(ChunkingStrategy::ContextAware))
            .await
            .value
    );

    let before = service.collection_stats().await.into_value();
    assert_eq!(before.total_chunks, 4);
    assert_eq!(before.total_documents, 2);

    let deleted = service.delete_document("core.cfg").await;
    assert!(deleted.is_ok());
    assert!(deleted.value);

    let after = service.collection_stats().await.into_value();
    assert_eq!(after.total_chunks, before.total_chunks - 3);
    assert_eq!(after.total_documents, 1);
    assert_eq!(after.categories.get("general"), Some(&1));

    let missing = service.delete_document("core.cfg").await;
    assert!(missing.is_ok());
    assert!(!missing.value);
    assert!(missing.message.is_some());
}

#[tokio::test]
async fn listing_reassembles_chunks_in_order() {
    let service = memory_service().await;
    let doc = document("core", "core.cfg", THREE_INTERFACES);
    service
        .add_document(&doc, &StrategyRequest::Strategy(ChunkingStrategy::ContextAware))
        .await;

    let listed = service.get_all_documents().await;
    assert!(listed.is_ok());
    let documents = listed.into_value();
    assert_eq!(documents.len(), 1);

    let stored = &documents[0];
    assert_eq!(stored.id, "core");
    assert_eq!(stored.chunk_count, 3);
    assert_eq!(stored.metadata["chunkIndex"], Value::from(0));
    assert_eq!(
        stored.content,
        "interface Gi0/0\n ip address 10.0.0.1 255.255.255.0\n\n\
interface Gi0/1\n shutdown\n\n\
interface Gi0/2\n description spare"
    );

    let visible = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    assert_eq!(visible(&stored.content), visible(THREE_INTERFACES));
}

#[tokio::test]
async fn uploads_sharing_a_filename_are_deleted_together() {
    let service = memory_service().await;
    let first = document("u1", "shared.cfg", "interface Gi0/0\n shutdown");
    let second = document("u2", "shared.cfg", "router ospf 1\n network 10.0.0.0 0.0.0.255 area 0");
    service.add_document(&first, &StrategyRequest::Auto).await;
    service.add_document(&second, &StrategyRequest::Auto).await;
    assert_eq!(service.collection_stats().await.value.total_documents, 2);

    assert!(service.delete_document("shared.cfg").await.value);
    let stats = service.collection_stats().await.into_value();
    assert_eq!(stats.total_documents, 0);
    assert_eq!(stats.total_chunks, 0);
}

#[tokio::test]
async fn blank_document_is_rejected() {
    let service = memory_service().await;
    let blank = document("blank", "blank.txt", "  \n\t\n");

    let outcome = service.add_document(&blank, &StrategyRequest::Auto).await;
    assert!(!outcome.is_ok());
    assert!(!outcome.value);
    assert_eq!(service.collection_stats().await.value.total_chunks, 0);
}

#[tokio::test]
async fn unreachable_store_yields_failed_outcomes() {
    let store: Arc<dyn VectorStore> = Arc::new(DownStore);
    let handle = CollectionHandle::connect(store, DEFAULT_COLLECTION).await;
    let service = DocumentService::new(Arc::new(handle), IngestionPipeline::default());
    let d1 = document("d1", "a.txt", "interface Fa0/0\n description test\n!\n");

    let added = service.add_document(&d1, &StrategyRequest::Auto).await;
    assert!(!added.is_ok());
    assert!(!added.value);

    let listed = service.get_all_documents().await;
    assert!(!listed.is_ok());
    assert!(listed.value.is_empty());

    assert!(!service.delete_document("a.txt").await.is_ok());
    assert!(!service.collection_stats().await.is_ok());
    assert!(!service.is_server_running().await);
}

#[tokio::test]
async fn knowledge_upload_tags_every_entry() {
    let service = memory_service().await;
    let library = KnowledgeLibrary::builtin().unwrap();

    let outcome = library.upload_libraries(&service).await;
    assert!(outcome.is_ok());
    let report = outcome.into_value();
    assert_eq!(report.error_patterns, library.error_patterns().len());
    assert_eq!(report.best_practices, library.best_practices().len());
    assert_eq!(report.network_protocols, library.network_protocols().len());
    assert!(report.failed.is_empty());

    let stats = service.collection_stats().await.into_value();
    assert_eq!(stats.total_documents, report.total());
    assert!(stats.categories.contains_key("error_patterns"));
    assert!(stats.categories.contains_key("best_practices"));
    assert!(stats.categories.contains_key("network_protocols"));

    let stored = service
        .handle()
        .collection()
        .unwrap()
        .get(GetRequest::limit(1000))
        .await
        .unwrap();
    assert!(stored
        .metadatas
        .iter()
        .all(|m| m["chunkingStrategy"] == Value::from("knowledge")));

    // Re-running submits the same ids; the store skips them
    let again = library.upload_libraries(&service).await;
    assert!(again.is_ok());
    let rerun = service.collection_stats().await.into_value();
    assert_eq!(rerun.total_chunks, stats.total_chunks);
}

#[tokio::test]
async fn directory_ingest_collects_stats() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("r1.cfg"), "interface Gi0/0\n shutdown\n").unwrap();
    std::fs::write(temp.path().join("notes.txt"), "   ").unwrap();
    std::fs::write(temp.path().join("diagram.png"), [0u8, 1]).unwrap();

    let service = Arc::new(memory_service().await);
    let stats = DirectoryIngestor::new(service.clone(), temp.path())
        .category(Category::General)
        .run()
        .await
        .unwrap();

    assert_eq!(stats.files, 2);
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.errors.len(), 1);
    assert_eq!(stats.strategies.get("semantic_cisco"), Some(&1));
    assert!(stats.time_ms >= 1);

    let listed = service.get_all_documents().await.into_value();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].metadata["filename"], Value::from("r1.cfg"));
}
