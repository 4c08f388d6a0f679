//! LLM backend integration.
//!
//! The reasoning behind every pipeline stage is opaque: a stage hands the
//! backend its declared inputs and expects a JSON object back. Everything
//! else in the crate stays deterministic, so swapping the backend (hosted
//! API, local model, canned mock) never changes pipeline semantics.

pub mod mock;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod types;

pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use types::{Message, Role};

use crate::config::LlmConfig;
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;

/// Trait for LLM clients that can generate completions.
///
/// Implementations must be thread-safe (Send + Sync) to support async
/// operations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given messages.
    ///
    /// Returns the complete response as a single string.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// OpenAI (GPT-4 family).
    #[default]
    OpenAi,
    /// Mock client for testing (no API key required).
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builds an LLM client from configuration.
pub fn build_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let provider = config
        .provider
        .parse::<LlmProvider>()
        .map_err(ScoutError::llm)?;

    match provider {
        LlmProvider::OpenAi => {
            let client = OpenAiClient::from_env(&config.model)?;
            Ok(Arc::new(client))
        }
        LlmProvider::Mock => Ok(Arc::new(MockLlmClient::new())),
    }
}
