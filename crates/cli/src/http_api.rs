use crate::services::AppServices;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use netrag_chunker::{Document, StrategyRequest};
use netrag_indexer::DocumentService;
use netrag_protocol::{ChatRequest, EnhancedSearchRequest, Outcome, SearchRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

type AppState = Arc<AppServices>;

#[derive(Debug, Deserialize, Serialize)]
pub struct AddDocumentRequest {
    pub document: Document,
    /// `auto`, a strategy name, or a free-form tag; defaults to `default`
    #[serde(default)]
    pub strategy: Option<String>,
}

pub fn router(services: AppState) -> Router {
    Router::new()
        .route("/documents", post(add_document).get(list_documents))
        .route("/documents/:filename", delete(delete_document))
        .route("/search", post(search))
        .route("/search/enhanced", post(enhanced_search))
        .route("/stats", get(stats))
        .route("/health", get(health))
        .route("/strategies", get(strategies))
        .route("/libraries/upload", post(upload_libraries))
        .route("/chat", post(chat))
        .with_state(services)
}

pub async fn serve(services: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("Serving netrag API on http://{bind}");
    axum::serve(listener, router(services)).await?;
    Ok(())
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        let outcome: Outcome<Value> = Outcome::failed(Value::Null, format!("Invalid request: {e}"));
        (StatusCode::BAD_REQUEST, Json(outcome)).into_response()
    })
}

fn ok_json<T: Serialize>(outcome: Outcome<T>) -> Response {
    Json(outcome).into_response()
}

async fn add_document(State(services): State<AppState>, body: Bytes) -> Response {
    let request: AddDocumentRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let strategy = request
        .strategy
        .as_deref()
        .map(StrategyRequest::parse)
        .unwrap_or_default();
    ok_json(services.documents.add_document(&request.document, &strategy).await)
}

async fn list_documents(State(services): State<AppState>) -> Response {
    ok_json(services.documents.get_all_documents().await)
}

async fn delete_document(
    State(services): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    ok_json(services.documents.delete_document(&filename).await)
}

async fn search(State(services): State<AppState>, body: Bytes) -> Response {
    let request: SearchRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    ok_json(
        services
            .retrieval
            .search(&request.query, request.limit, request.category.as_deref())
            .await,
    )
}

async fn enhanced_search(State(services): State<AppState>, body: Bytes) -> Response {
    let request: EnhancedSearchRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    ok_json(
        services
            .retrieval
            .enhanced_search(&request.query, request.limit)
            .await,
    )
}

async fn stats(State(services): State<AppState>) -> Response {
    ok_json(services.documents.collection_stats().await)
}

async fn health(State(services): State<AppState>) -> Response {
    let status = services.assistant.status().await;
    if status.vector_store_running {
        ok_json(Outcome::ok(status))
    } else {
        ok_json(Outcome::failed(status, "Vector store is not reachable"))
    }
}

async fn strategies() -> Response {
    ok_json(Outcome::ok(DocumentService::available_strategies()))
}

async fn upload_libraries(State(services): State<AppState>) -> Response {
    ok_json(services.library.upload_libraries(&services.documents).await)
}

async fn chat(State(services): State<AppState>, body: Bytes) -> Response {
    let request: ChatRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    ok_json(
        services
            .assistant
            .generate_response(&request.prompt, request.mode)
            .await,
    )
}
