pub mod anthropic;
pub mod client;
pub mod openai;

use std::sync::Arc;

pub use client::LlmClient;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: String,
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
    fn name(&self) -> &str;
}

/// Builds the provider named by `LLM_PROVIDER`. Hosted providers need their
/// API key; Ollama does not.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn Provider>> {
    fn require<'a>(key: &'a Option<String>, var: &str) -> anyhow::Result<&'a str> {
        key.as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow::anyhow!("{var} must be set"))
    }

    let provider: Arc<dyn Provider> = match config.llm_provider.as_str() {
        "openai" => Arc::new(openai::OpenAIProvider::new(require(
            &config.openai_api_key,
            "OPENAI_API_KEY",
        )?)),
        "google" => Arc::new(openai::OpenAIProvider::new_google(require(
            &config.google_api_key,
            "GOOGLE_API_KEY",
        )?)),
        "ollama" => Arc::new(openai::OpenAIProvider::new_ollama(&config.ollama_base_url)),
        "anthropic" => Arc::new(anthropic::AnthropicProvider::new(require(
            &config.anthropic_api_key,
            "ANTHROPIC_API_KEY",
        )?)),
        other => anyhow::bail!("unknown LLM_PROVIDER: {other}"),
    };

    Ok(provider)
}
