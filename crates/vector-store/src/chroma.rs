use crate::embeddings::{Embedder, HashingEmbedder};
use crate::error::{Result, VectorStoreError};
use crate::store::{Collection, VectorStore};
use crate::types::{
    AddRequest, DeleteRequest, GetRequest, GetResponse, QueryRequest, QueryResponse, Where,
};
use async_trait::async_trait;
use netrag_protocol::Metadata;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_CHROMA_URL: &str = "http://localhost:8000";

/// Client for a Chroma server speaking the v1 REST API
///
/// Embeddings are computed locally and sent with every add/query.
pub struct ChromaStore {
    client: Client,
    base_url: String,
    embedder: Arc<dyn Embedder>,
}

impl ChromaStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_embedder(base_url, Arc::new(HashingEmbedder::default()))
    }

    pub fn with_embedder(base_url: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            embedder,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Deserialize)]
struct Heartbeat {
    #[serde(rename = "nanosecond heartbeat")]
    nanos: u64,
}

#[derive(Serialize)]
struct CreateCollection<'a> {
    name: &'a str,
    metadata: Metadata,
    get_or_create: bool,
}

#[derive(Deserialize)]
struct CollectionModel {
    id: String,
    name: String,
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn heartbeat(&self) -> Result<u64> {
        let resp = self
            .client
            .get(format!("{}/api/v1/heartbeat", self.base_url))
            .send()
            .await?;
        let beat: Heartbeat = read_json(resp).await?;
        Ok(beat.nanos)
    }

    async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: Metadata,
    ) -> Result<Arc<dyn Collection>> {
        let resp = self
            .client
            .post(format!("{}/api/v1/collections", self.base_url))
            .json(&CreateCollection {
                name,
                metadata,
                get_or_create: true,
            })
            .send()
            .await?;
        let model: CollectionModel = read_json(resp).await?;
        log::debug!("Chroma collection '{}' has id {}", model.name, model.id);

        Ok(Arc::new(ChromaCollection {
            client: self.client.clone(),
            url: format!("{}/api/v1/collections/{}", self.base_url, model.id),
            name: model.name,
            embedder: self.embedder.clone(),
        }))
    }
}

pub struct ChromaCollection {
    client: Client,
    url: String,
    name: String,
    embedder: Arc<dyn Embedder>,
}

#[derive(Serialize)]
struct ChromaAdd<'a> {
    ids: &'a [String],
    embeddings: Vec<Vec<f32>>,
    documents: &'a [String],
    metadatas: &'a [Metadata],
}

#[derive(Serialize)]
struct ChromaQuery {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    where_: Option<Value>,
    include: [&'static str; 3],
}

#[derive(Deserialize)]
struct ChromaQueryResult {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
}

#[derive(Serialize)]
struct ChromaGet {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    where_: Option<Value>,
    include: [&'static str; 2],
}

#[derive(Deserialize)]
struct ChromaGetResult {
    ids: Vec<String>,
    #[serde(default)]
    documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Option<Vec<Option<Metadata>>>,
}

/// Chroma accepts a single key per filter object; several keys need `$and`
fn chroma_where(filter: Option<&Where>) -> Option<Value> {
    let filter = filter?;
    if filter.len() <= 1 {
        return Some(Value::Object(filter.clone()));
    }
    let clauses: Vec<Value> = filter
        .iter()
        .map(|(key, value)| {
            let mut clause = Metadata::new();
            clause.insert(key.clone(), value.clone());
            Value::Object(clause)
        })
        .collect();
    let mut and = Metadata::new();
    and.insert("$and".into(), Value::Array(clauses));
    Some(Value::Object(and))
}

fn fill<T: Default>(values: Option<Vec<Option<T>>>, len: usize) -> Vec<T> {
    let mut out: Vec<T> = values
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    out.resize_with(len, T::default);
    out
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(VectorStoreError::Http(format!("{status}: {body}")));
    }
    Ok(resp.json::<T>().await?)
}

async fn expect_success(resp: reqwest::Response) -> Result<()> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(VectorStoreError::Http(format!("{status}: {body}")));
    }
    Ok(())
}

#[async_trait]
impl Collection for ChromaCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn add(&self, request: AddRequest) -> Result<()> {
        request.validate()?;
        let body = ChromaAdd {
            ids: &request.ids,
            embeddings: self.embedder.embed_batch(&request.documents),
            documents: &request.documents,
            metadatas: &request.metadatas,
        };
        let resp = self
            .client
            .post(format!("{}/add", self.url))
            .json(&body)
            .send()
            .await?;
        expect_success(resp).await
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse> {
        let body = ChromaQuery {
            query_embeddings: self.embedder.embed_batch(&request.query_texts),
            n_results: request.n_results,
            where_: chroma_where(request.where_.as_ref()),
            include: ["documents", "metadatas", "distances"],
        };
        let resp = self
            .client
            .post(format!("{}/query", self.url))
            .json(&body)
            .send()
            .await?;
        let result: ChromaQueryResult = read_json(resp).await?;

        let rows = result.ids.len();
        let mut documents = result.documents.unwrap_or_default();
        let mut metadatas = result.metadatas.unwrap_or_default();
        let mut distances = result.distances.unwrap_or_default();
        documents.resize_with(rows, Vec::new);
        metadatas.resize_with(rows, Vec::new);
        distances.resize_with(rows, Vec::new);

        let mut response = QueryResponse::default();
        for (((ids, docs), metas), mut dists) in result
            .ids
            .into_iter()
            .zip(documents)
            .zip(metadatas)
            .zip(distances)
        {
            let len = ids.len();
            dists.resize(len, 1.0);
            response.documents.push(fill(Some(docs), len));
            response.metadatas.push(fill(Some(metas), len));
            response.distances.push(dists);
            response.ids.push(ids);
        }
        Ok(response)
    }

    async fn get(&self, request: GetRequest) -> Result<GetResponse> {
        let body = ChromaGet {
            limit: request.limit,
            where_: chroma_where(request.where_.as_ref()),
            include: ["documents", "metadatas"],
        };
        let resp = self
            .client
            .post(format!("{}/get", self.url))
            .json(&body)
            .send()
            .await?;
        let result: ChromaGetResult = read_json(resp).await?;
        let len = result.ids.len();

        Ok(GetResponse {
            documents: fill(result.documents, len),
            metadatas: fill(result.metadatas, len),
            ids: result.ids,
        })
    }

    async fn delete(&self, request: DeleteRequest) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/delete", self.url))
            .json(&request)
            .send()
            .await?;
        expect_success(resp).await
    }
}
