use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditorConfig {
    pub provider: ProviderConfig,

    #[serde(default)]
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "gemini")]
    Gemini {
        model: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        api_key: Option<String>, // If not provided, use GEMINI_API_KEY env var
        #[serde(skip_serializing_if = "Option::is_none", default)]
        base_url: Option<String>,
    },
    #[serde(rename = "openai")]
    OpenAI {
        model: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        api_key: Option<String>, // If not provided, use OPENAI_API_KEY env var
        #[serde(skip_serializing_if = "Option::is_none", default)]
        base_url: Option<String>,
    },
}

/// How later stages see the output of earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// Every earlier stage's raw output is appended to the prompt.
    #[default]
    Chained,
    /// Each prompt is built from the code excerpt alone.
    Isolated,
}

impl std::str::FromStr for ContextMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chained" => Ok(ContextMode::Chained),
            "isolated" => Ok(ContextMode::Isolated),
            _ => Err(format!("Unknown context mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u16,

    #[serde(default = "default_code_prefix_chars")]
    pub code_prefix_chars: usize,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub context_mode: ContextMode,

    #[serde(default)]
    pub dump_prompts: bool,
}

fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u16 {
    4000
}
fn default_code_prefix_chars() -> usize {
    2000
}
fn default_timeout_seconds() -> u64 {
    120
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            code_prefix_chars: default_code_prefix_chars(),
            timeout_seconds: default_timeout_seconds(),
            context_mode: ContextMode::default(),
            dump_prompts: false,
        }
    }
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::Gemini {
                model: GEMINI_DEFAULT_MODEL.to_string(),
                api_key: None,
                base_url: None,
            },
            pipeline: PipelineSettings::default(),
        }
    }
}

impl ProviderConfig {
    pub fn gemini(model: impl Into<String>) -> Self {
        Self::Gemini {
            model: model.into(),
            api_key: None,
            base_url: None,
        }
    }

    pub fn openai(model: impl Into<String>) -> Self {
        Self::OpenAI {
            model: model.into(),
            api_key: None,
            base_url: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Gemini { .. } => "gemini",
            Self::OpenAI { .. } => "openai",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::Gemini { model, .. } | Self::OpenAI { model, .. } => model,
        }
    }

    pub fn set_model(&mut self, new_model: impl Into<String>) {
        match self {
            Self::Gemini { model, .. } | Self::OpenAI { model, .. } => *model = new_model.into(),
        }
    }

    /// Configured credential, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        match self {
            Self::Gemini { api_key, .. } | Self::OpenAI { api_key, .. } => api_key
                .as_deref()
                .filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        match self {
            Self::Gemini { api_key, .. } | Self::OpenAI { api_key, .. } => {
                *api_key = Some(key.into())
            }
        }
    }

    pub fn set_base_url(&mut self, url: impl Into<String>) {
        match self {
            Self::Gemini { base_url, .. } | Self::OpenAI { base_url, .. } => {
                *base_url = Some(url.into())
            }
        }
    }

    pub fn base_url(&self) -> &str {
        match self {
            Self::Gemini { base_url, .. } => base_url.as_deref().unwrap_or(GEMINI_OPENAI_BASE_URL),
            Self::OpenAI { base_url, .. } => base_url.as_deref().unwrap_or(OPENAI_BASE_URL),
        }
    }

    pub fn credential_env_var(&self) -> &'static str {
        match self {
            Self::Gemini { .. } => GEMINI_API_KEY_ENV,
            Self::OpenAI { .. } => OPENAI_API_KEY_ENV,
        }
    }
}

impl AuditorConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML config: {}", path.display()))?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON config: {}", path.display()))?;
        Ok(config)
    }

    /// Picks the loader from the file extension, defaulting to YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_yaml_file(path),
        }
    }

    /// Defaults overlaid with `VIGIL_*` variables and the provider credential.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(provider) = std::env::var("VIGIL_PROVIDER") {
            config.provider = match provider.to_lowercase().as_str() {
                "gemini" => ProviderConfig::gemini(GEMINI_DEFAULT_MODEL),
                "openai" => ProviderConfig::openai(OPENAI_DEFAULT_MODEL),
                other => bail!("Unknown provider in VIGIL_PROVIDER: {}", other),
            };
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Applies `VIGIL_*` overrides and fills a missing credential from the
    /// provider's API key variable.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(model) = std::env::var("VIGIL_MODEL") {
            self.provider.set_model(model);
        }

        if let Ok(url) = std::env::var("VIGIL_BASE_URL") {
            self.provider.set_base_url(url);
        }

        if let Ok(temp) = std::env::var("VIGIL_TEMPERATURE") {
            self.pipeline.temperature = temp
                .parse::<f32>()
                .with_context(|| format!("Invalid VIGIL_TEMPERATURE: {}", temp))?;
        }

        if let Ok(chars) = std::env::var("VIGIL_CODE_PREFIX_CHARS") {
            self.pipeline.code_prefix_chars = chars
                .parse::<usize>()
                .with_context(|| format!("Invalid VIGIL_CODE_PREFIX_CHARS: {}", chars))?;
        }

        if let Ok(secs) = std::env::var("VIGIL_TIMEOUT_SECONDS") {
            self.pipeline.timeout_seconds = secs
                .parse::<u64>()
                .with_context(|| format!("Invalid VIGIL_TIMEOUT_SECONDS: {}", secs))?;
        }

        if let Ok(mode) = std::env::var("VIGIL_CONTEXT_MODE") {
            self.pipeline.context_mode = mode.parse().map_err(anyhow::Error::msg)?;
        }

        if self.provider.api_key().is_none() {
            if let Ok(key) = std::env::var(self.provider.credential_env_var()) {
                self.provider.set_api_key(key);
            }
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let temperature = self.pipeline.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            bail!("temperature must be between 0 and 2, got {}", temperature);
        }
        if self.pipeline.code_prefix_chars == 0 {
            bail!("code_prefix_chars must be greater than zero");
        }
        if self.pipeline.max_tokens == 0 {
            bail!("max_tokens must be greater than zero");
        }
        if self.provider.model().trim().is_empty() {
            bail!("model must not be empty");
        }
        Ok(())
    }

    pub fn credential_configured(&self) -> bool {
        self.provider.api_key().is_some()
    }

    /// Copy safe to print: the credential is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.provider.api_key().is_some() {
            copy.provider.set_api_key("***");
        }
        copy
    }

    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub const EXAMPLE_CONFIG: &str = r#"
# Vigil auditor configuration

provider:
  type: gemini
  model: gemini-2.0-flash
  # api_key: ...  # Optional, defaults to GEMINI_API_KEY env var
  # base_url: https://generativelanguage.googleapis.com/v1beta/openai

pipeline:
  temperature: 0.3
  max_tokens: 4000
  code_prefix_chars: 2000
  timeout_seconds: 120
  context_mode: chained   # or: isolated
  dump_prompts: false
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuditorConfig::default();
        assert!(matches!(config.provider, ProviderConfig::Gemini { .. }));
        assert_eq!(config.pipeline.temperature, 0.3);
        assert_eq!(config.pipeline.code_prefix_chars, 2000);
        assert_eq!(config.pipeline.context_mode, ContextMode::Chained);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let config: AuditorConfig = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.provider.model(), "gemini-2.0-flash");
        assert_eq!(config.provider.base_url(), GEMINI_OPENAI_BASE_URL);
        assert!(config.provider.api_key().is_none());
    }

    #[test]
    fn test_pipeline_section_optional() {
        let yaml = "provider:\n  type: openai\n  model: gpt-4o-mini\n";
        let config: AuditorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.name(), "openai");
        assert_eq!(config.pipeline.max_tokens, 4000);
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vigil.yaml");

        let mut config = AuditorConfig::default();
        config.pipeline.context_mode = ContextMode::Isolated;
        config.save_yaml(&path).unwrap();

        let loaded = AuditorConfig::from_file(&path).unwrap();
        assert_eq!(loaded.pipeline.context_mode, ContextMode::Isolated);
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let mut config = AuditorConfig::default();
        config.provider.set_api_key("   ");
        assert!(!config.credential_configured());

        config.provider.set_api_key("abc");
        assert!(config.credential_configured());
        assert_eq!(config.redacted().provider.api_key(), Some("***"));
    }

    #[test]
    fn test_validate_rejects_zero_prefix() {
        let mut config = AuditorConfig::default();
        config.pipeline.code_prefix_chars = 0;
        assert!(config.validate().is_err());
    }
}
