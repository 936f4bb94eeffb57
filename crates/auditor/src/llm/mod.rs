//! Model backend integration
//!
//! The gateway trait hides which text-generation service answers a prompt.
//! The production implementation speaks the OpenAI chat-completions protocol,
//! which Gemini also exposes, and a scripted mock stands in for it in tests.
//! Stage prompts and backend configuration live alongside it.

pub mod config;
pub mod mock_provider;
pub mod prompts;
pub mod provider;

pub use config::{AuditorConfig, ContextMode, PipelineSettings, ProviderConfig, EXAMPLE_CONFIG};
pub use mock_provider::MockGateway;
pub use prompts::{truncate_code, Persona, StageKind, StageDefinition, STAGES};
pub use provider::{
    GatewayError, GenerationRequest, GenerationResponse, ModelGateway, OpenAICompatibleGateway,
    TokenUsage,
};
