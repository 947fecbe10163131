use crate::error::{CompletionError, Result};
use crate::CompletionService;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2:1b";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub server_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2048,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Non-streaming client for the Ollama generate API
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.server_url.trim_end_matches('/'))
    }

    fn request<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
                top_p: 0.9,
                top_k: 40,
            },
        }
    }
}

#[async_trait]
impl CompletionService for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        log::debug!(
            "Generating with {} ({} prompt chars)",
            self.config.model,
            prompt.chars().count()
        );
        let resp = self
            .client
            .post(self.url("/api/generate"))
            .json(&self.request(prompt))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CompletionError::Api {
                status: resp.status().as_u16(),
            });
        }

        let body: GenerateResponse = resp.json().await?;
        if body.response.trim().is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(body.response)
    }

    async fn is_available(&self) -> bool {
        match self.client.get(self.url("/api/tags")).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                log::debug!("Ollama status probe failed: {e}");
                false
            }
        }
    }

    async fn available_models(&self) -> Vec<String> {
        let resp = match self.client.get(self.url("/api/tags")).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                log::error!("Failed to fetch models: HTTP {}", resp.status());
                return Vec::new();
            }
            Err(e) => {
                log::error!("Failed to fetch models: {e}");
                return Vec::new();
            }
        };

        match resp.json::<TagsResponse>().await {
            Ok(tags) => tags.models.into_iter().map(|m| m.name).collect(),
            Err(e) => {
                log::error!("Invalid model list: {e}");
                Vec::new()
            }
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
