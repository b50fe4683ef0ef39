//! Configuration: one typed struct, built once at startup, passed by
//! reference into every component constructor.
//!
//! Layering: `config.toml` then `config.<env>.toml` (selected by `RUST_ENV`)
//! then `APP_*` environment variables (double underscore for nesting, e.g.
//! `APP_GENERATION__TIMEOUT_SECS=30`). Every recognized option and its
//! default lives in this file and nowhere else.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub storage: StorageConfig,
    pub retrieval: RetrievalConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Directory holding tokenizer.json, config.json and pytorch_model.bin.
    pub model_dir: String,
    /// Output dimension D. Must match the store's vector column; checked at
    /// model load and again on every store call.
    pub dim: usize,
    /// Context cap in tokens. Longer input keeps the prefix.
    pub max_len: usize,
    /// Deterministic hash embedder instead of real weights.
    pub use_fake: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_dir: "./models/e5-small-v2".to_string(),
            dim: 384,
            max_len: 256,
            use_fake: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Directory holding tokenizer.json and the GGUF weights file.
    pub model_dir: String,
    /// GGUF file name inside `model_dir`.
    pub model_file: String,
    /// Reported model identifier.
    pub model_name: String,
    /// Output bound per call. A configuration constant, not a per-call
    /// parameter.
    pub max_new_tokens: usize,
    /// Wall-clock budget imposed on each generation call.
    pub timeout_secs: u64,
    /// Canned-answer generator instead of real weights.
    pub use_fake: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_dir: "./models/tinyllama".to_string(),
            model_file: "tinyllama-1.1b-chat-v1.0.Q4_K_M.gguf".to_string(),
            model_name: "TinyLlama-1.1B-Chat-v1.0".to_string(),
            max_new_tokens: 100,
            timeout_secs: 120,
            use_fake: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_dir: String,
    pub table: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { db_dir: "./data/lancedb".to_string(), table: "chunks".to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Applied when a query does not specify top_k.
    pub default_top_k: usize,
    /// Maximum acceptable cosine distance for a candidate to count as
    /// relevant. Candidates at or above it are dropped even inside the
    /// top_k window.
    pub threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_top_k: 2, threshold: 1.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub mode: IngestMode,
    pub data_dir: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { mode: IngestMode::BestEffort, data_dir: "./data/txt".to_string() }
    }
}

/// Per-item failure handling for batch ingestion. The original behavior is
/// best-effort; the choice is surfaced here instead of hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IngestMode {
    #[default]
    BestEffort,
    FailFast,
}

impl RagConfig {
    /// Load with the standard layering. `RUST_ENV` selects the overlay file.
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Self::from_figment(figment)
    }

    /// Extract from an explicit figment. Exposed so tests can inject
    /// providers without touching process environment or files.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

