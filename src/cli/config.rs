//! Configuration management for mtgjudge
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.mtgjudge/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::acquire::RULES_URL;
use crate::embedding::engine::{DEFAULT_DIMENSION, DEFAULT_MAX_SEQ_LEN, DEFAULT_MODEL_ID};
use crate::errors::{JudgeError, Result};
use crate::indexer::IdStrategy;
use crate::llm::client::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TOKEN_ENV};
use crate::llm::GenerationParams;
use crate::rag::SearchParams;
use crate::vector_db::manager::{DEFAULT_COLLECTION, DEFAULT_QDRANT_URL};

/// Complete configuration for mtgjudge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub qdrant: QdrantConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Where the rules document comes from and where outputs go
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub rules_url: String,
    pub download_dir: String,
    pub output_dir: String,
}

/// Vector database connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
    /// Environment variable holding an API key, if the server needs one
    pub api_key_env: Option<String>,
}

/// Sentence embedding model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model_id: String,
    pub dimension: usize,
    pub max_seq_len: usize,
    pub batch_size: usize,
}

/// Hosted language model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    pub model: String,
    pub token_env: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

/// Retrieval and indexing knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub expansion_limit: usize,
    pub id_strategy: IdStrategy,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            rules_url: RULES_URL.to_string(),
            download_dir: "downloads".to_string(),
            output_dir: "output".to_string(),
        }
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            api_key_env: None,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            dimension: DEFAULT_DIMENSION,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            batch_size: 32,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            max_new_tokens: params.max_new_tokens,
            temperature: params.temperature,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let params = SearchParams::default();
        Self {
            top_k: params.top_k,
            expansion_limit: params.expansion_limit,
            id_strategy: IdStrategy::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| JudgeError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| JudgeError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard config location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".mtgjudge").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(JudgeError::ConfigError(
                "top_k must be greater than 0".to_string()
            ));
        }

        if self.retrieval.expansion_limit < self.retrieval.top_k {
            return Err(JudgeError::ConfigError(
                "expansion_limit must be at least top_k".to_string()
            ));
        }

        if self.embedding.dimension == 0 {
            return Err(JudgeError::ConfigError(
                "embedding dimension must be greater than 0".to_string()
            ));
        }

        if self.embedding.batch_size == 0 {
            return Err(JudgeError::ConfigError(
                "embedding batch_size must be greater than 0".to_string()
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(JudgeError::ConfigError(
                "temperature must be between 0.0 and 2.0".to_string()
            ));
        }

        if self.llm.max_new_tokens == 0 {
            return Err(JudgeError::ConfigError(
                "max_new_tokens must be greater than 0".to_string()
            ));
        }

        if self.qdrant.collection.trim().is_empty() {
            return Err(JudgeError::ConfigError(
                "qdrant collection name must not be empty".to_string()
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| JudgeError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| JudgeError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| JudgeError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Write this configuration as a new file; refuses to overwrite
    pub fn init_file(&self, path: &PathBuf) -> Result<()> {
        if path.exists() {
            return Err(JudgeError::ConfigError(format!(
                "{} already exists",
                path.display()
            )));
        }
        self.save(path)
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn download_dir(&self) -> PathBuf {
        Self::expand_path(&self.source.download_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.source.output_dir)
    }

    pub fn rules_json(&self) -> PathBuf {
        self.output_dir().join(crate::chunking::RULES_JSON)
    }

    pub fn glossary_json(&self) -> PathBuf {
        self.output_dir().join(crate::chunking::GLOSSARY_JSON)
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            top_k: self.retrieval.top_k,
            expansion_limit: self.retrieval.expansion_limit,
        }
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.llm.max_new_tokens,
            temperature: self.llm.temperature,
        }
    }

    /// Qdrant API key from the configured environment variable
    pub fn qdrant_api_key(&self) -> Option<String> {
        self.qdrant
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty())
    }
}
