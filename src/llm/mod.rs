//! Hosted language model access
//!
//! [`TextGenerator`] is what the query pipeline calls; [`InferenceClient`]
//! implements it over HTTP with bearer-token auth.

pub mod client;
pub mod types;

pub use client::InferenceClient;
pub use types::GenerationParams;

use async_trait::async_trait;

use crate::errors::Result;

/// Turns a prompt into a completion
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
