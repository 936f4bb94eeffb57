use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        CreateChatCompletionRequestArgs, FinishReason,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::config::AuditorConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model output was truncated at the token limit")]
    Truncated,

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u16,
    pub dump_prompt: bool,
}

#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A single text-generation backend.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn generate(&self, request: GenerationRequest)
        -> Result<GenerationResponse, GatewayError>;

    fn model_name(&self) -> &str;
}

/// Chat-completions client for any OpenAI-compatible endpoint.
///
/// Gemini is reached through its OpenAI-compatible base URL, so both
/// configured providers share this implementation.
pub struct OpenAICompatibleGateway {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAICompatibleGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAICompatibleGateway")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAICompatibleGateway {
    /// Fails with `GatewayError::Configuration` when no credential is set.
    pub fn from_config(config: &AuditorConfig) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;

        let api_key = config.provider.api_key().ok_or_else(|| {
            GatewayError::Configuration(format!(
                "{} not set and no api_key configured",
                config.provider.credential_env_var()
            ))
        })?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(config.provider.base_url());

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.provider.model().to_string(),
            timeout: Duration::from_secs(config.pipeline.timeout_seconds),
        })
    }
}

fn map_openai_error(err: OpenAIError) -> GatewayError {
    match err {
        OpenAIError::Reqwest(e) => GatewayError::Network(e.to_string()),
        other => GatewayError::Api(other.to_string()),
    }
}

pub(crate) fn dump_request(model: &str, request: &GenerationRequest) {
    eprintln!("\n🔍 {} COMPLETE PROMPT DUMP {}", "=".repeat(25), "=".repeat(25));
    eprintln!("🤖 Model: {}", model);
    eprintln!("🌡️  Temperature: {}", request.temperature);
    eprintln!("📏 Max Tokens: {}", request.max_tokens);
    eprintln!("\n📝 {} SYSTEM PROMPT {}", "=".repeat(20), "=".repeat(20));
    eprintln!("{}", request.system_prompt);
    eprintln!("\n👤 {} USER PROMPT {}", "=".repeat(22), "=".repeat(22));
    eprintln!("{}", request.user_prompt);
    eprintln!("{}", "=".repeat(70));
}

#[async_trait]
impl ModelGateway for OpenAICompatibleGateway {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GatewayError> {
        debug!("Sending request to model: {}", self.model);
        debug!(
            "Temperature: {}, Max tokens: {}",
            request.temperature, request.max_tokens
        );

        if request.dump_prompt {
            dump_request(&self.model, &request);
        }

        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_prompt)
            .build()
            .map_err(map_openai_error)?;

        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Text(
                request.user_prompt,
            ))
            .build()
            .map_err(map_openai_error)?;

        let api_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_message),
                ChatCompletionRequestMessage::User(user_message),
            ])
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build()
            .map_err(map_openai_error)?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(api_request))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| {
                warn!("Model API error: {}", e);
                map_openai_error(e)
            })?;

        let choice = response
            .choices
            .first()
            .ok_or(GatewayError::EmptyResponse)?;

        if matches!(choice.finish_reason, Some(FinishReason::Length)) {
            return Err(GatewayError::Truncated);
        }

        let content = choice.message.content.clone().unwrap_or_default();
        if content.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }

        let usage = response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        debug!("Received response with {} tokens", usage.total_tokens);

        Ok(GenerationResponse {
            content,
            model: response.model,
            usage,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
