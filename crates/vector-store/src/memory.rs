use crate::embeddings::{Embedder, HashingEmbedder};
use crate::error::Result;
use crate::store::{Collection, VectorStore};
use crate::types::{
    matches_where, AddRequest, DeleteRequest, GetRequest, GetResponse, QueryRequest,
    QueryResponse,
};
use async_trait::async_trait;
use netrag_protocol::Metadata;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    id: String,
    document: String,
    metadata: Metadata,
    vector: Vec<f32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    name: String,
    metadata: Metadata,
    records: Vec<StoredRecord>,
}

/// In-process vector store with optional JSON snapshots
pub struct MemoryStore {
    embedder: Arc<dyn Embedder>,
    data_dir: Option<PathBuf>,
    collections: RwLock<HashMap<String, Arc<MemoryCollection>>>,
}

impl MemoryStore {
    /// Volatile store, nothing touches disk
    pub fn new() -> Self {
        Self::with_embedder(Arc::new(HashingEmbedder::default()), None)
    }

    /// Store that keeps `<data_dir>/<collection>.json` up to date
    pub fn persistent(data_dir: impl AsRef<Path>) -> Self {
        Self::with_embedder(
            Arc::new(HashingEmbedder::default()),
            Some(data_dir.as_ref().to_path_buf()),
        )
    }

    pub fn with_embedder(embedder: Arc<dyn Embedder>, data_dir: Option<PathBuf>) -> Self {
        Self {
            embedder,
            data_dir,
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn heartbeat(&self) -> Result<u64> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Ok(nanos)
    }

    async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: Metadata,
    ) -> Result<Arc<dyn Collection>> {
        if let Some(existing) = self.collections.read().await.get(name) {
            return Ok(existing.clone());
        }

        let mut collections = self.collections.write().await;
        if let Some(existing) = collections.get(name) {
            return Ok(existing.clone());
        }

        let snapshot_path = self
            .data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{name}.json")));
        let collection = Arc::new(
            MemoryCollection::open(name, metadata, self.embedder.clone(), snapshot_path).await?,
        );
        collections.insert(name.to_string(), collection.clone());
        Ok(collection)
    }
}

pub struct MemoryCollection {
    name: String,
    metadata: Metadata,
    embedder: Arc<dyn Embedder>,
    snapshot_path: Option<PathBuf>,
    records: RwLock<Vec<StoredRecord>>,
}

impl MemoryCollection {
    async fn open(
        name: &str,
        metadata: Metadata,
        embedder: Arc<dyn Embedder>,
        snapshot_path: Option<PathBuf>,
    ) -> Result<Self> {
        let mut records = Vec::new();
        let mut metadata = metadata;

        if let Some(path) = snapshot_path.as_ref() {
            if tokio::fs::try_exists(path).await? {
                log::info!("Loading collection snapshot from {:?}", path);
                let data = tokio::fs::read_to_string(path).await?;
                let snapshot: Snapshot = serde_json::from_str(&data)?;
                records = snapshot.records;
                if !snapshot.metadata.is_empty() {
                    metadata = snapshot.metadata;
                }
                log::info!("Loaded {} records into '{name}'", records.len());
            }
        }

        Ok(Self {
            name: name.to_string(),
            metadata,
            embedder,
            snapshot_path,
            records: RwLock::new(records),
        })
    }

    async fn save(&self, records: &[StoredRecord]) -> Result<()> {
        let Some(path) = self.snapshot_path.as_ref() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let snapshot = Snapshot {
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            records: records.to_vec(),
        };
        let data = serde_json::to_string(&snapshot)?;
        tokio::fs::write(path, data).await?;
        log::debug!("Saved {} records to {:?}", records.len(), path);
        Ok(())
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn add(&self, request: AddRequest) -> Result<()> {
        request.validate()?;
        if request.is_empty() {
            return Ok(());
        }

        let vectors = self.embedder.embed_batch(&request.documents);
        let mut records = self.records.write().await;
        let mut known: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
        let mut next = records.clone();
        let mut added = 0usize;

        for (((id, document), metadata), vector) in request
            .ids
            .into_iter()
            .zip(request.documents)
            .zip(request.metadatas)
            .zip(vectors)
        {
            if !known.insert(id.clone()) {
                log::warn!("Skipping existing id '{id}' in '{}'", self.name);
                continue;
            }
            next.push(StoredRecord {
                id,
                document,
                metadata,
                vector,
            });
            added += 1;
        }

        // Snapshot first: a failed write leaves the collection untouched
        self.save(&next).await?;
        log::debug!("Added {added} records to '{}'. Total: {}", self.name, next.len());
        *records = next;
        Ok(())
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse> {
        let records = self.records.read().await;
        let mut response = QueryResponse::default();

        for text in &request.query_texts {
            let query_vector = self.embedder.embed(text);

            // Brute-force scan; stable sort keeps insertion order on ties
            let mut scored: Vec<(&StoredRecord, f32)> = records
                .iter()
                .filter(|r| matches_where(&r.metadata, request.where_.as_ref()))
                .map(|r| (r, HashingEmbedder::cosine_distance(&query_vector, &r.vector)))
                .collect();
            scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            scored.truncate(request.n_results);

            response.ids.push(scored.iter().map(|(r, _)| r.id.clone()).collect());
            response
                .documents
                .push(scored.iter().map(|(r, _)| r.document.clone()).collect());
            response
                .metadatas
                .push(scored.iter().map(|(r, _)| r.metadata.clone()).collect());
            response
                .distances
                .push(scored.iter().map(|(_, d)| *d).collect());
        }

        Ok(response)
    }

    async fn get(&self, request: GetRequest) -> Result<GetResponse> {
        let records = self.records.read().await;
        let limit = request.limit.unwrap_or(usize::MAX);
        let mut response = GetResponse::default();

        for record in records
            .iter()
            .filter(|r| matches_where(&r.metadata, request.where_.as_ref()))
            .take(limit)
        {
            response.ids.push(record.id.clone());
            response.documents.push(record.document.clone());
            response.metadatas.push(record.metadata.clone());
        }

        Ok(response)
    }

    async fn delete(&self, request: DeleteRequest) -> Result<()> {
        let doomed: HashSet<&str> = request.ids.iter().map(String::as_str).collect();
        let mut records = self.records.write().await;
        let next: Vec<StoredRecord> = records
            .iter()
            .filter(|r| !doomed.contains(r.id.as_str()))
            .cloned()
            .collect();

        self.save(&next).await?;
        log::debug!(
            "Deleted {} records from '{}'",
            records.len() - next.len(),
            self.name
        );
        *records = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::where_eq;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn meta(filename: &str, category: &str) -> Metadata {
        serde_json::from_value(json!({"filename": filename, "category": category})).unwrap()
    }

    fn add_request(rows: &[(&str, &str, &str, &str)]) -> AddRequest {
        AddRequest {
            ids: rows.iter().map(|r| r.0.to_string()).collect(),
            documents: rows.iter().map(|r| r.1.to_string()).collect(),
            metadatas: rows.iter().map(|r| meta(r.2, r.3)).collect(),
        }
    }

    async fn collection(store: &MemoryStore) -> Arc<dyn Collection> {
        store
            .get_or_create_collection("docs", Metadata::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn query_orders_by_distance_and_filters() {
        let store = MemoryStore::new();
        let docs = collection(&store).await;
        docs.add(add_request(&[
            ("a", "ospf neighbor stuck in exstart", "a.txt", "general"),
            ("b", "vlan trunk allowed list", "b.txt", "general"),
            ("c", "ospf neighbor mtu mismatch", "c.txt", "error_patterns"),
        ]))
        .await
        .unwrap();

        let all = docs
            .query(QueryRequest::new("ospf neighbor", 3))
            .await
            .unwrap();
        assert_eq!(all.ids[0].len(), 3);
        assert_eq!(all.ids[0][2], "b");
        assert!(all.distances[0].windows(2).all(|w| w[0] <= w[1]));

        let scoped = docs
            .query(
                QueryRequest::new("ospf neighbor", 3)
                    .filter(Some(where_eq("category", "error_patterns"))),
            )
            .await
            .unwrap();
        assert_eq!(scoped.ids[0], vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_ids_are_skipped() {
        let store = MemoryStore::new();
        let docs = collection(&store).await;
        docs.add(add_request(&[("a", "first", "a.txt", "general")]))
            .await
            .unwrap();
        docs.add(add_request(&[
            ("a", "second", "a.txt", "general"),
            ("b", "third", "b.txt", "general"),
        ]))
        .await
        .unwrap();

        let got = docs.get(GetRequest::default()).await.unwrap();
        assert_eq!(got.ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(got.documents[0], "first");
    }

    #[tokio::test]
    async fn get_respects_limit_and_where_then_delete() {
        let store = MemoryStore::new();
        let docs = collection(&store).await;
        docs.add(add_request(&[
            ("a_chunk_0", "one", "a.txt", "general"),
            ("a_chunk_1", "two", "a.txt", "general"),
            ("b_chunk_0", "three", "b.txt", "general"),
        ]))
        .await
        .unwrap();

        assert_eq!(docs.get(GetRequest::limit(2)).await.unwrap().ids.len(), 2);

        let a = docs
            .get(GetRequest::filtered(where_eq("filename", "a.txt")))
            .await
            .unwrap();
        assert_eq!(a.ids.len(), 2);

        docs.delete(DeleteRequest { ids: a.ids }).await.unwrap();
        let rest = docs.get(GetRequest::default()).await.unwrap();
        assert_eq!(rest.ids, vec!["b_chunk_0".to_string()]);
    }

    #[tokio::test]
    async fn mismatched_add_is_rejected() {
        let store = MemoryStore::new();
        let docs = collection(&store).await;
        let mut req = add_request(&[("a", "x", "a.txt", "general")]);
        req.metadatas.clear();
        assert!(docs.add(req).await.is_err());
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = MemoryStore::persistent(temp_dir.path());
            let docs = collection(&store).await;
            docs.add(add_request(&[("a", "bgp peer down", "a.txt", "general")]))
                .await
                .unwrap();
        }
        assert!(temp_dir.path().join("docs.json").exists());

        let reopened = MemoryStore::persistent(temp_dir.path());
        let docs = collection(&reopened).await;
        let got = docs.get(GetRequest::default()).await.unwrap();
        assert_eq!(got.ids, vec!["a".to_string()]);

        let hits = docs.query(QueryRequest::new("bgp", 1)).await.unwrap();
        assert_eq!(hits.ids[0], vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn failed_snapshot_write_leaves_collection_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        let store = MemoryStore::persistent(&data_dir);
        let docs = collection(&store).await;
        docs.add(add_request(&[("a_chunk_0", "ospf area 0", "a.txt", "general")]))
            .await
            .unwrap();

        // A regular file where the data directory used to be
        std::fs::remove_dir_all(&data_dir).unwrap();
        std::fs::write(&data_dir, "not a directory").unwrap();

        let added = docs
            .add(add_request(&[("b_chunk_0", "ospf neighbor", "b.txt", "general")]))
            .await;
        assert!(added.is_err());
        let hits = docs.query(QueryRequest::new("ospf", 5)).await.unwrap();
        assert_eq!(hits.ids[0], vec!["a_chunk_0".to_string()]);

        let deleted = docs
            .delete(DeleteRequest {
                ids: vec!["a_chunk_0".to_string()],
            })
            .await;
        assert!(deleted.is_err());
        let got = docs.get(GetRequest::default()).await.unwrap();
        assert_eq!(got.ids, vec!["a_chunk_0".to_string()]);

        // Once the directory is back, a retry stores the chunk instead of skipping it
        std::fs::remove_file(&data_dir).unwrap();
        docs.add(add_request(&[("b_chunk_0", "ospf neighbor", "b.txt", "general")]))
            .await
            .unwrap();
        assert_eq!(docs.get(GetRequest::default()).await.unwrap().ids.len(), 2);
        assert!(data_dir.join("docs.json").is_file());
    }

    #[tokio::test]
    async fn same_collection_is_shared() {
        let store = MemoryStore::new();
        let first = collection(&store).await;
        first
            .add(add_request(&[("a", "x", "a.txt", "general")]))
            .await
            .unwrap();
        let second = collection(&store).await;
        assert_eq!(second.get(GetRequest::default()).await.unwrap().ids.len(), 1);
        assert!(store.heartbeat().await.unwrap() > 0);
    }
}
