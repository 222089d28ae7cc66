//! Error types for mtgjudge
//!
//! One error enum shared by the acquisition, chunking, indexing and query
//! stages, with conversions for the transport and serialization layers.

use thiserror::Error;

/// Main error type for the rules judge pipeline
#[derive(Error, Debug)]
pub enum JudgeError {
    /// The rules landing page had no plaintext document link
    #[error("No .txt rule links found at {url}")]
    NoLinkFound { url: String },

    /// The rules document has no glossary section marker
    #[error("No glossary section found in rules document")]
    GlossaryNotFound,

    /// Non-success HTTP status from a remote endpoint
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The language model returned no completions
    #[error("Language model returned no completion")]
    EmptyCompletion,

    /// Bearer token environment variable is unset or empty
    #[error("Missing API token: set the {0} environment variable")]
    MissingToken(String),

    /// Embedding width does not match the collection
    #[error("Embedding dimension {actual} does not match collection dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embedding model errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector database errors
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for judge operations
pub type Result<T> = std::result::Result<T, JudgeError>;

/// Convert anyhow errors to JudgeError
impl From<anyhow::Error> for JudgeError {
    fn from(err: anyhow::Error) -> Self {
        JudgeError::Generic(format!("{:#}", err))
    }
}

impl From<qdrant_client::QdrantError> for JudgeError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        JudgeError::VectorStore(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_link_display() {
        let err = JudgeError::NoLinkFound {
            url: "https://magic.wizards.com/en/rules".to_string(),
        };
        assert!(err.to_string().contains("No .txt rule links"));
        assert!(err.to_string().contains("magic.wizards.com"));
    }

    #[test]
    fn test_http_status_display() {
        let err = JudgeError::HttpStatus {
            status: 503,
            url: "https://example.com/model".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503 from https://example.com/model");
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = JudgeError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        assert!(err.to_string().contains("384"));
        assert!(err.to_string().contains("768"));
    }

    #[test]
    fn test_from_anyhow_keeps_context() {
        let err: JudgeError = anyhow::anyhow!("inner").context("outer").into();
        assert_eq!(err.to_string(), "outer: inner");
    }
}
