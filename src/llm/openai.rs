use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
};

use super::{GenerateRequest, GenerateResponse, Provider};

const GOOGLE_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Any chat-completions compatible backend: OpenAI itself, Google's
/// compatibility endpoint, or a local Ollama.
pub struct OpenAIProvider {
    client: Client<OpenAIConfig>,
    provider_name: &'static str,
}

impl OpenAIProvider {
    fn with_config(config: OpenAIConfig, provider_name: &'static str) -> Self {
        Self {
            client: Client::with_config(config),
            provider_name,
        }
    }

    pub fn new(api_key: &str) -> Self {
        Self::with_config(OpenAIConfig::new().with_api_key(api_key), "openai")
    }

    pub fn new_google(api_key: &str) -> Self {
        Self::with_config(
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(GOOGLE_OPENAI_BASE),
            "google",
        )
    }

    pub fn new_ollama(base_url: &str) -> Self {
        Self::with_config(
            OpenAIConfig::new()
                .with_api_key("ollama")
                .with_api_base(format!("{}/v1", base_url.trim_end_matches('/'))),
            "ollama",
        )
    }
}

#[async_trait::async_trait]
impl Provider for OpenAIProvider {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let mut messages = Vec::with_capacity(2);
        if !req.system.is_empty() {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(req.system.clone()),
                    name: None,
                },
            ));
        }
        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(req.prompt.clone()),
                name: None,
            },
        ));

        #[allow(deprecated)]
        let request = CreateChatCompletionRequest {
            model: req.model.clone(),
            messages,
            temperature: Some(req.temperature),
            max_completion_tokens: Some(req.max_tokens),
            ..Default::default()
        };

        let response = self.client.chat().create(request).await?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| anyhow::anyhow!("{} returned no choices", self.provider_name))?;

        let content = choice
            .message
            .content
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let finish_reason = choice
            .finish_reason
            .map(|r| format!("{r:?}").to_lowercase())
            .unwrap_or_default();

        let (input_tokens, output_tokens) = response
            .usage
            .as_ref()
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        Ok(GenerateResponse {
            content,
            model: response.model,
            input_tokens,
            output_tokens,
            finish_reason,
        })
    }

    fn name(&self) -> &str {
        self.provider_name
    }
}
