//! OpenAI client over the Responses API.
//!
//! The triage response schema is passed as a JSON-schema text format, so the
//! model's output text should already be the triage object.

use std::sync::{Arc, OnceLock};

use crate::base::{
    config::Config,
    schema::{TRIAGE_RESPONSE_SCHEMA_NAME, triage_response_schema},
    types::{ModelOutput, Prompt, Res},
};
use anyhow::anyhow;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{Content, CreateResponseArgs, Input, InputItem, InputMessageArgs, OutputContent, Response, ResponseFormatJsonSchema, Role, TextConfig, TextResponseFormat},
};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    /// Create an OpenAI-backed client.
    pub fn openai(config: &Config) -> Res<Self> {
        let client = OpenAiLlmClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let api_key = config.openai_api_key.clone().ok_or_else(|| anyhow!("openai_api_key is required for the openai provider."))?;
        let cfg = OpenAIConfig::new().with_api_key(api_key);

        info!("Using OpenAI model `{}`.", config.openai_model);

        Ok(Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        })
    }

    /// Build the request for a prompt.
    #[instrument(name = "OpenAiLlmClient::build_request", skip_all)]
    fn build_request(&self, prompt: &Prompt) -> Res<CreateResponseArgs> {
        let input = Input::Items(vec![InputItem::Message(InputMessageArgs::default().role(Role::User).content(prompt.text.clone()).build()?)]);

        let mut request = CreateResponseArgs::default();
        request
            .instructions(self.config.system_directive.clone())
            .max_output_tokens(self.config.max_output_tokens)
            .model(&self.config.openai_model)
            .text(get_openai_text_config().clone())
            .input(input);

        // Sampling parameters only apply to the non-reasoning models.
        if self.config.openai_model.starts_with("gpt") {
            request.temperature(self.config.temperature).top_p(self.config.top_p);
        }

        Ok(request)
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    fn provider_name(&self) -> &'static str {
        "OpenAI"
    }

    #[instrument(name = "OpenAiLlmClient::generate_triage", skip_all)]
    async fn generate_triage(&self, prompt: &Prompt) -> Res<ModelOutput> {
        let request = self.build_request(prompt)?.build()?;
        let response = self.client.responses().create(request).await?;

        parse_openai_response(&response)
    }
}

/// Collect the output text of an OpenAI response.
#[instrument(skip_all)]
pub fn parse_openai_response(response: &Response) -> Res<ModelOutput> {
    let mut text = String::new();

    info!("LLM response has {} outputs.", response.output.len());
    for output in &response.output {
        match output {
            OutputContent::Message(message) => {
                for message_content in &message.content {
                    match message_content {
                        Content::OutputText(output_text) => text.push_str(&output_text.text),
                        Content::Refusal(reason) => {
                            return Err(anyhow!("Request refused: {reason:#?}"));
                        }
                    }
                }
            }
            _ => {
                warn!("Unknown output: {output:#?}");
            }
        }
    }

    if text.is_empty() {
        return Err(anyhow!("Response contained no output text."));
    }

    Ok(ModelOutput::Text(text))
}

// Statics.

static OPENAI_TEXT_CONFIG: OnceLock<TextConfig> = OnceLock::new();

fn get_openai_text_config() -> &'static TextConfig {
    OPENAI_TEXT_CONFIG.get_or_init(|| TextConfig {
        format: TextResponseFormat::JsonSchema(ResponseFormatJsonSchema {
            name: TRIAGE_RESPONSE_SCHEMA_NAME.to_string(),
            description: Some("Structured triage of a customer support ticket.".to_string()),
            schema: Some(triage_response_schema().clone()),
            // Strict mode would require `tags` and `language` to be mandatory.
            strict: Some(false),
        }),
    })
}

// Tests.
