//! Gemini client over the Generative Language REST API.
//!
//! Gemini only ever hands back text parts, so results are surfaced as
//! [`ModelOutput::Text`] for the caller to decode.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use tracing::{debug, info, instrument, warn};

use crate::base::{
    config::Config,
    schema::gemini_response_schema,
    types::{ModelOutput, Prompt, Res},
};

use super::{GenericLlmClient, LlmClient};

/// Harm categories set to `BLOCK_NONE` on every request.
const RELAXED_HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

// Extra methods on `LlmClient` applied by the gemini implementation.

impl LlmClient {
    /// Create a Gemini-backed client.
    pub fn gemini(config: &Config) -> Res<Self> {
        let client = GeminiLlmClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

/// Body of a `generateContent` call.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; a single user turn here.
    pub contents: Vec<Content>,
    /// The system directive.
    pub system_instruction: Option<Content>,
    /// Sampling parameters and the response schema.
    pub generation_config: GenerationConfig,
    /// Per-category blocking thresholds.
    pub safety_settings: Vec<SafetySetting>,
}

/// A turn of text parts.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    /// `user`, or absent for the system instruction.
    pub role: Option<String>,
    /// The text of the turn.
    pub parts: Vec<TextPart>,
}

/// A plain text part.
#[derive(Debug, Clone, Serialize)]
pub struct TextPart {
    /// The text.
    pub text: String,
}

/// Sampling parameters and structured output settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling mass.
    pub top_p: f32,
    /// Top-k cutoff.
    pub top_k: u32,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
    /// Always `application/json`.
    pub response_mime_type: String,
    /// The triage schema in Gemini's upper-cased dialect.
    pub response_schema: Value,
}

/// Blocking threshold for one harm category.
#[derive(Debug, Clone, Serialize)]
pub struct SafetySetting {
    /// E.g. `HARM_CATEGORY_HARASSMENT`.
    pub category: String,
    /// E.g. `BLOCK_NONE`.
    pub threshold: String,
}

/// Reply of a `generateContent` call.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates; empty when the prompt was blocked.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Set when the prompt itself was rejected.
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A single generated answer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated parts, absent when generation stopped early.
    pub content: Option<CandidateContent>,
    /// Why generation stopped, e.g. `STOP` or `SAFETY`.
    pub finish_reason: Option<String>,
}

/// The parts of a candidate.
#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    /// Generated parts, in order.
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

/// One generated part; only text parts are read.
#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    /// Generated text, if this is a text part.
    pub text: Option<String>,
}

/// Feedback on the prompt.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Why the prompt was blocked, if it was.
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// Specific implementations.

/// Gemini LLM client implementation.
#[derive(Clone)]
pub struct GeminiLlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
    system_directive: String,
    generation_config: GenerationConfig,
}

impl GeminiLlmClient {
    /// Create a new Gemini LLM client.
    #[instrument(name = "GeminiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let api_key = config.google_api_key.clone().ok_or_else(|| anyhow!("google_api_key is required for the gemini provider."))?;
        let endpoint = format!("{}/models/{}:generateContent", config.gemini_base_url.trim_end_matches('/'), config.gemini_model);

        info!("Using Gemini model `{}`.", config.gemini_model);

        Ok(Self {
            client: Client::builder().build()?,
            endpoint,
            api_key,
            system_directive: config.system_directive.clone(),
            generation_config: GenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                max_output_tokens: config.max_output_tokens,
                response_mime_type: "application/json".to_string(),
                response_schema: gemini_response_schema().clone(),
            },
        })
    }

    /// Build the request body for a prompt.
    pub fn build_request(&self, prompt: &Prompt) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some(prompt.role.to_string()),
                parts: vec![TextPart { text: prompt.text.clone() }],
            }],
            system_instruction: Some(Content {
                role: None,
                parts: vec![TextPart { text: self.system_directive.clone() }],
            }),
            generation_config: self.generation_config.clone(),
            safety_settings: RELAXED_HARM_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: category.to_string(),
                    threshold: "BLOCK_NONE".to_string(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl GenericLlmClient for GeminiLlmClient {
    fn provider_name(&self) -> &'static str {
        "Gemini"
    }

    #[instrument(name = "GeminiLlmClient::generate_triage", skip_all)]
    async fn generate_triage(&self, prompt: &Prompt) -> Res<ModelOutput> {
        let request = self.build_request(prompt);

        let response = self.client.post(&self.endpoint).header("x-goog-api-key", &self.api_key).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body).map(|b| b.error.message).unwrap_or(body);
            warn!("Gemini returned {status}: {message}");
            return Err(anyhow!("{status}: {message}"));
        }

        debug!("Gemini returned {} bytes.", body.len());

        let response: GenerateContentResponse = serde_json::from_str(&body)?;

        parse_gemini_response(&response)
    }
}

/// Pull the generated text out of a Gemini response.
#[instrument(skip_all)]
pub fn parse_gemini_response(response: &GenerateContentResponse) -> Res<ModelOutput> {
    if let Some(reason) = response.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_ref()) {
        return Err(anyhow!("Prompt blocked: {reason}"));
    }

    let Some(candidate) = response.candidates.first() else {
        return Err(anyhow!("Response contained no candidates."));
    };

    let text = candidate
        .content
        .iter()
        .flat_map(|content| &content.parts)
        .filter_map(|part| part.text.as_deref())
        .collect::<String>();

    if text.is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("UNKNOWN");
        return Err(anyhow!("Response contained no text (finish reason: {reason})."));
    }

    Ok(ModelOutput::Text(text))
}

// Tests.
