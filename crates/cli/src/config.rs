use anyhow::{Context, Result};
use netrag_chunker::ChunkerConfig;
use netrag_completion::OllamaConfig;
use netrag_search::RetrievalConfig;
use netrag_vector_store::{DEFAULT_CHROMA_URL, DEFAULT_COLLECTION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LOCAL_CONFIG: &str = "netrag.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// In-process store with JSON snapshots
    Memory,
    /// Remote Chroma server
    Chroma,
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "chroma" => Ok(Self::Chroma),
            other => Err(format!("unknown store '{other}' (expected memory or chroma)")),
        }
    }
}

/// Startup configuration: defaults, then TOML, then `NETRAG_*` env, then flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreKind,
    /// Snapshot directory for the memory store; unset keeps data in memory only
    pub data_dir: Option<PathBuf>,
    pub chroma_url: String,
    pub collection: String,
    pub system_prompt: Option<String>,
    /// Enhanced-search size used for chat context
    pub context_limit: usize,
    pub bind: String,
    pub chunking: ChunkerConfig,
    pub retrieval: RetrievalConfig,
    pub ollama: OllamaConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::Memory,
            data_dir: Some(PathBuf::from(".netrag")),
            chroma_url: DEFAULT_CHROMA_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            system_prompt: None,
            context_limit: 5,
            bind: "127.0.0.1:8080".to_string(),
            chunking: ChunkerConfig::default(),
            retrieval: RetrievalConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with the first config file found and the process environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os("NETRAG_CONFIG").map(PathBuf::from);
        let path = explicit
            .map(Path::to_path_buf)
            .or(env_path)
            .or_else(|| {
                let local = PathBuf::from(LOCAL_CONFIG);
                local.is_file().then_some(local)
            });

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(store) = var("NETRAG_STORE") {
            self.store = store.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(dir) = var("NETRAG_DATA_DIR") {
            self.data_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }
        if let Some(url) = var("NETRAG_CHROMA_URL") {
            self.chroma_url = url;
        }
        if let Some(collection) = var("NETRAG_COLLECTION") {
            self.collection = collection;
        }
        if let Some(url) = var("NETRAG_OLLAMA_URL") {
            self.ollama.server_url = url;
        }
        if let Some(model) = var("NETRAG_MODEL") {
            self.ollama.model = model;
        }
        if let Some(prompt) = var("NETRAG_SYSTEM_PROMPT") {
            self.system_prompt = Some(prompt);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid chunking config: {e}"))?;
        if self.collection.trim().is_empty() {
            anyhow::bail!("Collection name must not be empty");
        }
        Ok(())
    }
}
