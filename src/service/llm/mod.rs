//! Integration with generative model providers.
//!
//! The `GenericLlmClient` trait is the seam between the triage handler and a
//! concrete provider. Gemini is the default; OpenAI is available as an alternative.

pub mod gemini;
pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{
    config::{Config, LlmProvider},
    types::{ModelOutput, Prompt, Res},
};

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// Implementations are configured once with the system directive, generation
/// parameters, and the triage response schema; each call only carries the prompt.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Human-readable provider name, used in error details.
    fn provider_name(&self) -> &'static str;

    /// Run one triage generation for the given prompt.
    ///
    /// Transport and provider failures are returned as errors; they are never
    /// retried here.
    async fn generate_triage(&self, prompt: &Prompt) -> Res<ModelOutput>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    /// Wrap an existing client implementation.
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }

    /// Create the client for the provider selected in the configuration.
    pub fn from_config(config: &Config) -> Res<Self> {
        match config.llm_provider {
            LlmProvider::Gemini => Self::gemini(config),
            LlmProvider::OpenAi => Self::openai(config),
        }
    }
}
