//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` (or an explicit path), then applies the
//! `BOOKGRAPH_LOG_LEVEL`, `BOOKGRAPH_BIND` and `BOOKGRAPH_GRAPH_PATH`
//! overrides. API keys come from the environment only, never from TOML.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the router binds to.
    pub bind: String,
    pub log_level: String,
}

/// Knowledge graph source and retrieval settings.
#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    /// Graph file re-read on every reload (already `~`-expanded).
    pub graph_path: PathBuf,
    /// Number of facts retrieved per chat query.
    pub top_k: usize,
    /// IRI namespace used for books written by `/add-book`.
    pub namespace: String,
}

/// OpenAI / OpenAI-compatible chat provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"` or `"openai"`).
    /// Maps to `default` in `[llm]` TOML.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Remote embeddings endpoint configuration (`[embedding.openai]`).
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingConfig {
    /// Full embeddings endpoint URL.
    pub api_base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

/// In-process AllMiniLML6V2 settings (`[embedding.fastembed]`).
#[derive(Debug, Clone)]
pub struct FastEmbedConfig {
    /// Where model files are cached. `None` uses fastembed's own default.
    pub cache_dir: Option<PathBuf>,
    pub batch_size: usize,
}

/// Embedding configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Which embedder is active (`"fastembed"`, `"hashing"` or `"openai"`).
    pub provider: String,
    /// Vector size of the offline hashing embedder.
    pub hashing_dimensions: usize,
    pub fastembed: FastEmbedConfig,
    pub openai: OpenAiEmbeddingConfig,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub knowledge: KnowledgeConfig,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY` env var. `None` for keyless local models.
    pub llm_api_key: Option<String>,
    pub embedding: EmbeddingConfig,
    /// API key from `EMBEDDING_API_KEY` env var.
    pub embedding_api_key: Option<String>,
    /// Optional override for the built-in answer prompt template.
    pub answer_template: Option<PathBuf>,
}

/// Raw TOML shape, the `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    knowledge: RawKnowledge,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    embedding: RawEmbedding,
    #[serde(default)]
    prompts: RawPrompts,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawKnowledge {
    #[serde(default = "default_graph_path")]
    graph_path: String,
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(default = "default_namespace")]
    namespace: String,
}

impl Default for RawKnowledge {
    fn default() -> Self {
        Self {
            graph_path: default_graph_path(),
            top_k: default_top_k(),
            namespace: default_namespace(),
        }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawEmbedding {
    #[serde(rename = "default", default = "default_embedding_provider")]
    provider: String,
    #[serde(default)]
    fastembed: RawFastEmbed,
    #[serde(default)]
    hashing: RawHashing,
    #[serde(default)]
    openai: RawOpenAiEmbedding,
}

impl Default for RawEmbedding {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            fastembed: RawFastEmbed::default(),
            hashing: RawHashing::default(),
            openai: RawOpenAiEmbedding::default(),
        }
    }
}

#[derive(Deserialize)]
struct RawFastEmbed {
    #[serde(default)]
    cache_dir: Option<String>,
    #[serde(default = "default_fastembed_batch_size")]
    batch_size: usize,
}

impl Default for RawFastEmbed {
    fn default() -> Self {
        Self { cache_dir: None, batch_size: default_fastembed_batch_size() }
    }
}

#[derive(Deserialize)]
struct RawHashing {
    #[serde(default = "default_hashing_dimensions")]
    dimensions: usize,
}

impl Default for RawHashing {
    fn default() -> Self {
        Self { dimensions: default_hashing_dimensions() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiEmbedding {
    #[serde(default = "default_embedding_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_embedding_model")]
    model: String,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiEmbedding {
    fn default() -> Self {
        Self {
            api_base_url: default_embedding_api_base_url(),
            model: default_embedding_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawPrompts {
    answer_template: Option<String>,
}

fn default_bind() -> String { "127.0.0.1:5000".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_graph_path() -> String { "books_data.rdf".to_string() }
fn default_top_k() -> usize { 5 }
fn default_namespace() -> String { "http://example.org/bookstore#".to_string() }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_openai_api_base_url() -> String { "http://localhost:11434/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "llama3".to_string() }
fn default_openai_temperature() -> f32 { 0.2 }
fn default_timeout_seconds() -> u64 { 120 }
fn default_embedding_provider() -> String { "fastembed".to_string() }
fn default_fastembed_batch_size() -> usize { 64 }
fn default_hashing_dimensions() -> usize { 1024 }
fn default_embedding_api_base_url() -> String { "http://localhost:11434/v1/embeddings".to_string() }
fn default_embedding_model() -> String { "all-minilm".to_string() }

/// Env-var overrides applied after the TOML is parsed.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub bind: Option<String>,
    pub graph_path: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("BOOKGRAPH_LOG_LEVEL").ok(),
            bind: env::var("BOOKGRAPH_BIND").ok(),
            graph_path: env::var("BOOKGRAPH_GRAPH_PATH").ok(),
        }
    }
}

/// Load config from the given path, or `config/default.toml`, then apply
/// env-var overrides. When no path is given and the default file does not
/// exist, built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = Overrides::from_env();
    match config_path {
        Some(p) => load_from(Path::new(p), &overrides),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_from(Path::new(DEFAULT_CONFIG_PATH), &overrides)
        }
        None => Ok(resolve(RawConfig::default(), &overrides)),
    }
}

/// Load from an explicit path with explicit overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(path: &Path, overrides: &Overrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse(&raw, overrides)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))
}

/// Parse TOML text into a resolved [`Config`].
pub fn parse(text: &str, overrides: &Overrides) -> Result<Config, toml::de::Error> {
    let parsed: RawConfig = toml::from_str(text)?;
    Ok(resolve(parsed, overrides))
}

fn resolve(parsed: RawConfig, overrides: &Overrides) -> Config {
    let graph_path = overrides
        .graph_path
        .as_deref()
        .unwrap_or(&parsed.knowledge.graph_path);

    Config {
        server: ServerConfig {
            bind: overrides.bind.clone().unwrap_or(parsed.server.bind),
            log_level: overrides.log_level.clone().unwrap_or(parsed.server.log_level),
        },
        knowledge: KnowledgeConfig {
            graph_path: expand_home(graph_path),
            top_k: parsed.knowledge.top_k,
            namespace: parsed.knowledge.namespace,
        },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        llm_api_key: env::var("LLM_API_KEY").ok(),
        embedding: EmbeddingConfig {
            provider: parsed.embedding.provider,
            hashing_dimensions: parsed.embedding.hashing.dimensions,
            fastembed: FastEmbedConfig {
                cache_dir: parsed.embedding.fastembed.cache_dir.map(|p| expand_home(&p)),
                batch_size: parsed.embedding.fastembed.batch_size,
            },
            openai: OpenAiEmbeddingConfig {
                api_base_url: parsed.embedding.openai.api_base_url,
                model: parsed.embedding.openai.model,
                timeout_seconds: parsed.embedding.openai.timeout_seconds,
            },
        },
        embedding_api_key: env::var("EMBEDDING_API_KEY").ok(),
        answer_template: parsed.prompts.answer_template.map(|p| expand_home(&p)),
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

impl Config {
    /// Offline config: dummy LLM, hashing embedder, no API keys.
    /// Nothing built from it touches the network.
    pub fn offline(graph_path: &Path) -> Self {
        let mut cfg = resolve(RawConfig::default(), &Overrides::default());
        cfg.knowledge.graph_path = graph_path.to_path_buf();
        cfg.llm.provider = "dummy".to_string();
        cfg.embedding.provider = "hashing".to_string();
        cfg.llm_api_key = None;
        cfg.embedding_api_key = None;
        cfg
    }
}
