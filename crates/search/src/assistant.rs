use crate::prompt::PromptComposer;
use crate::retrieval::RetrievalService;
use netrag_completion::{fallback_response, CompletionService};
use netrag_indexer::DocumentService;
use netrag_protocol::{AssistantStatus, ChatMode, Outcome, DEFAULT_SEARCH_LIMIT};
use std::sync::Arc;

/// Retrieval-augmented answering on top of a completion backend
pub struct Assistant {
    retrieval: Arc<RetrievalService>,
    documents: Arc<DocumentService>,
    completion: Arc<dyn CompletionService>,
    composer: PromptComposer,
    context_limit: usize,
}

impl Assistant {
    pub fn new(
        retrieval: Arc<RetrievalService>,
        documents: Arc<DocumentService>,
        completion: Arc<dyn CompletionService>,
        composer: PromptComposer,
    ) -> Self {
        Self {
            retrieval,
            documents,
            completion,
            composer,
            context_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Size of the enhanced-search bundle fetched in document and agent modes
    #[must_use]
    pub fn with_context_limit(mut self, limit: usize) -> Self {
        self.context_limit = limit;
        self
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Full prompt that would be sent for `prompt` in `mode`
    pub async fn compose(&self, prompt: &str, mode: ChatMode) -> String {
        if !mode.uses_context() {
            return self.composer.compose(prompt, None, mode);
        }

        let bundle = self.retrieval.enhanced_search(prompt, self.context_limit).await;
        if !bundle.is_ok() {
            log::warn!(
                "Answering with partial context: {}",
                bundle.message.as_deref().unwrap_or("retrieval failed")
            );
        }
        let context = bundle.into_value();
        let context = (!context.is_empty()).then_some(context);
        self.composer.compose(prompt, context.as_ref(), mode)
    }

    /// Answer `prompt`, or the fallback text in a failed outcome when generation fails
    pub async fn generate_response(&self, prompt: &str, mode: ChatMode) -> Outcome<String> {
        let composed = self.compose(prompt, mode).await;
        match self.completion.complete(&composed).await {
            Ok(response) => Outcome::ok(response),
            Err(e) => {
                log::error!("Completion error: {e}");
                Outcome::failed(fallback_response(prompt), e.to_string())
            }
        }
    }

    pub async fn status(&self) -> AssistantStatus {
        let (completion_available, models, vector_store_running, stats) = tokio::join!(
            self.completion.is_available(),
            self.completion.available_models(),
            self.documents.is_server_running(),
            self.documents.collection_stats(),
        );

        AssistantStatus {
            completion_available,
            model: self.completion.model().to_string(),
            models,
            vector_store_running,
            stats: stats.into_value(),
        }
    }
}
