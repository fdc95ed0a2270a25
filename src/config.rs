use serde::{Deserialize, Serialize};

/// Default embedding model. jina-embeddings-v3 produces 1024-dim vectors.
const DEFAULT_EMBEDDING_MODEL: &str = "jina-embeddings-v3";
/// Default embedding task mode
const DEFAULT_EMBEDDING_TASK: &str = "text-matching";
/// Default embedding endpoint
const DEFAULT_EMBEDDING_URL: &str = "https://api.jina.ai/v1/embeddings";
/// Vector dimension produced by the default embedding model
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1024;

/// Default chat-completions model
const DEFAULT_CHAT_MODEL: &str = "llama-3.1-sonar-small-128k-online";
/// Default chat-completions endpoint
const DEFAULT_CHAT_URL: &str = "https://api.perplexity.ai/chat/completions";
const DEFAULT_CHAT_MAX_TOKENS: u32 = 1000;
const DEFAULT_CHAT_TEMPERATURE: f32 = 0.3;
const DEFAULT_CHAT_TOP_P: f32 = 0.9;

/// Default structured discovery endpoint (Google Books volumes API)
const DEFAULT_VOLUMES_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const DEFAULT_VOLUMES_MAX_RESULTS: u32 = 10;
const DEFAULT_VOLUMES_LANG: &str = "zh";

/// Default timeout for any single outbound request, in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for the remote embedding service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_url")]
    pub api_url: String,

    /// Bearer token. `None` disables the client; every call degrades to
    /// an empty vector.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Task mode sent with each request (e.g. "text-matching")
    #[serde(default = "default_embedding_task")]
    pub task: String,

    /// Vector dimension the configured model produces
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_EMBEDDING_URL.to_string(),
            api_key: None,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            task: DEFAULT_EMBEDDING_TASK.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl EmbeddingConfig {
    /// Pick up the API key from `EMBEDDING_API_KEY` when the config
    /// itself carries none.
    pub fn with_env_key(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var("EMBEDDING_API_KEY").ok();
        }
        self
    }
}

/// Configuration for the chat-completions service used by discovery
/// Tier 1 and the assistant utilities.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_url")]
    pub api_url: String,

    /// Bearer token. `None` disables the client; calls fail with
    /// `ChatError::Unconfigured` before any network I/O.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default = "default_chat_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature [0.0, 2.0]
    #[serde(default = "default_chat_temperature")]
    pub temperature: f32,

    /// Nucleus sampling threshold (0.0, 1.0]
    #[serde(default = "default_chat_top_p")]
    pub top_p: f32,

    /// Optional domain restriction for search-grounded models
    #[serde(default)]
    pub search_domain_filter: Vec<String>,

    /// Optional recency filter (e.g. "month")
    #[serde(default)]
    pub search_recency_filter: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_CHAT_URL.to_string(),
            api_key: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            max_tokens: DEFAULT_CHAT_MAX_TOKENS,
            temperature: DEFAULT_CHAT_TEMPERATURE,
            top_p: DEFAULT_CHAT_TOP_P,
            search_domain_filter: Vec::new(),
            search_recency_filter: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ChatConfig {
    /// Pick up the API key from `CHAT_API_KEY` when the config itself
    /// carries none.
    pub fn with_env_key(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var("CHAT_API_KEY").ok();
        }
        self
    }
}

/// Configuration for the structured keyword discovery service (Tier 2).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VolumesConfig {
    #[serde(default = "default_volumes_url")]
    pub api_url: String,

    #[serde(default = "default_volumes_max_results")]
    pub max_results: u32,

    /// Language restriction passed as `langRestrict`; `None` omits it
    #[serde(default = "default_volumes_lang")]
    pub lang_restrict: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VolumesConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_VOLUMES_URL.to_string(),
            max_results: DEFAULT_VOLUMES_MAX_RESULTS,
            lang_restrict: Some(DEFAULT_VOLUMES_LANG.to_string()),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub volumes: VolumesConfig,
}

impl EngineConfig {
    /// Fill missing credentials from the environment.
    pub fn with_env_keys(mut self) -> Self {
        self.embedding = self.embedding.with_env_key();
        self.chat = self.chat.with_env_key();
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.embedding.dimensions == 0 {
            anyhow::bail!("embedding.dimensions must be positive");
        }
        if self.embedding.model.trim().is_empty() {
            anyhow::bail!("embedding.model must not be empty");
        }
        if self.chat.max_tokens == 0 {
            anyhow::bail!("chat.max_tokens must be positive");
        }
        if !(0.0..=2.0).contains(&self.chat.temperature) {
            anyhow::bail!(
                "chat.temperature must be between 0.0 and 2.0, got {}",
                self.chat.temperature
            );
        }
        if !(self.chat.top_p > 0.0 && self.chat.top_p <= 1.0) {
            anyhow::bail!("chat.top_p must be in (0.0, 1.0], got {}", self.chat.top_p);
        }
        if self.volumes.max_results == 0 {
            anyhow::bail!("volumes.max_results must be positive");
        }
        Ok(())
    }
}

fn default_embedding_url() -> String {
    DEFAULT_EMBEDDING_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_embedding_task() -> String {
    DEFAULT_EMBEDDING_TASK.to_string()
}

fn default_embedding_dimensions() -> usize {
    DEFAULT_EMBEDDING_DIMENSIONS
}

fn default_chat_url() -> String {
    DEFAULT_CHAT_URL.to_string()
}

fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

fn default_chat_max_tokens() -> u32 {
    DEFAULT_CHAT_MAX_TOKENS
}

fn default_chat_temperature() -> f32 {
    DEFAULT_CHAT_TEMPERATURE
}

fn default_chat_top_p() -> f32 {
    DEFAULT_CHAT_TOP_P
}

fn default_volumes_url() -> String {
    DEFAULT_VOLUMES_URL.to_string()
}

fn default_volumes_max_results() -> u32 {
    DEFAULT_VOLUMES_MAX_RESULTS
}

fn default_volumes_lang() -> Option<String> {
    Some(DEFAULT_VOLUMES_LANG.to_string())
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
