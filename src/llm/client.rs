//! HTTP client for the hosted instruction-following model
//!
//! Sends a single synchronous-style request per prompt to the Hugging Face
//! Inference API. No retries, no timeout.

use async_trait::async_trait;
use reqwest::Client;

use crate::errors::{JudgeError, Result};
use crate::llm::types::{GeneratedText, GenerationParams, GenerationRequest};
use crate::llm::TextGenerator;

pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";
pub const DEFAULT_TOKEN_ENV: &str = "HF_API_TOKEN";

/// Client for one hosted model
pub struct InferenceClient {
    client: Client,
    endpoint: String,
    token: String,
    params: GenerationParams,
}

impl InferenceClient {
    /// Create a client for `<api_base>/<model>`
    pub fn new(api_base: &str, model: &str, token: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/{}", api_base.trim_end_matches('/'), model),
            token: token.into(),
            params,
        }
    }

    /// Create a client reading the bearer token from `token_env`
    pub fn from_env(api_base: &str, model: &str, token_env: &str, params: GenerationParams) -> Result<Self> {
        let token = std::env::var(token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| JudgeError::MissingToken(token_env.to_string()))?;
        Ok(Self::new(api_base, model, token.trim(), params))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for InferenceClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerationRequest {
            inputs: prompt,
            parameters: self.params,
        };

        tracing::debug!(endpoint = %self.endpoint, prompt_chars = prompt.len(), "calling language model");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(JudgeError::HttpStatus {
                status: response.status().as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let completions: Vec<GeneratedText> = response.json().await?;
        completions
            .into_iter()
            .next()
            .map(|c| c.generated_text)
            .ok_or(JudgeError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_model() {
        let client = InferenceClient::new(DEFAULT_API_BASE, DEFAULT_MODEL, "t", GenerationParams::default());
        assert_eq!(
            client.endpoint(),
            "https://api-inference.huggingface.co/models/meta-llama/Llama-3.1-8B-Instruct"
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = InferenceClient::new("http://localhost:8080/", "m", "t", GenerationParams::default());
        assert_eq!(client.endpoint(), "http://localhost:8080/m");
    }

    #[test]
    fn test_missing_token_env() {
        let result = InferenceClient::from_env(
            DEFAULT_API_BASE,
            DEFAULT_MODEL,
            "MTGJUDGE_TEST_TOKEN_THAT_IS_NEVER_SET",
            GenerationParams::default(),
        );
        assert!(matches!(result, Err(JudgeError::MissingToken(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let client = InferenceClient::new("http://127.0.0.1:9", "m", "t", GenerationParams::default());
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, JudgeError::HttpError(_)));
    }

    #[tokio::test]
    #[ignore] // Requires HF_API_TOKEN and network access
    async fn test_generate_integration() {
        let client = InferenceClient::from_env(
            DEFAULT_API_BASE,
            DEFAULT_MODEL,
            DEFAULT_TOKEN_ENV,
            GenerationParams::default(),
        )
        .unwrap();
        let text = client.generate("Say hello.").await.unwrap();
        assert!(!text.is_empty());
    }
}
