use codemate_core::chat::{build_chat_request, first_choice_content, ChatCompletionResponse};
use codemate_core::prompt::GenerationPrompt;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::ollama;

use crate::config::{GeneratorConfig, Provider};
use crate::prelude::Error;

/// One prompt in, one text out. Implementations never retry.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, Error>;
}

/// Backend selected from configuration.
pub enum Generator {
    Chat(ChatCompletionsGenerator),
    Ollama(OllamaGenerator),
}

impl Generator {
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, Error> {
        match config.provider {
            Provider::Openai => ChatCompletionsGenerator::new(config).map(Generator::Chat),
            Provider::Ollama => OllamaGenerator::new(config).map(Generator::Ollama),
        }
    }
}

impl TextGenerator for Generator {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, Error> {
        match self {
            Generator::Chat(generator) => generator.generate(prompt).await,
            Generator::Ollama(generator) => generator.generate(prompt).await,
        }
    }
}

/// Hosted OpenAI-compatible `chat/completions` endpoint.
pub struct ChatCompletionsGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl ChatCompletionsGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self, Error> {
        use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

        config.validate()?;
        let api_key = config.api_key.as_deref().unwrap_or_default();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| Error::Configuration(format!("Invalid API key: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

impl TextGenerator for ChatCompletionsGenerator {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, Error> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = build_chat_request(prompt, &self.model, self.max_tokens);

        log::debug!("Requesting completion from {url} with model {}", self.model);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Failed to reach {url}: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(Error::Generation(format!(
                "Completion request failed [{status}]: {body}"
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Failed to parse completion response: {e}")))?;

        first_choice_content(completion)
            .ok_or_else(|| Error::Generation("Completion response contained no content".into()))
    }
}

/// Local Ollama server through rig.
pub struct OllamaGenerator {
    client: ollama::Client,
    model: String,
    max_tokens: u32,
}

impl OllamaGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self, Error> {
        use rig::client::Nothing;

        let client = ollama::Client::builder()
            .api_key(Nothing)
            .base_url(config.base_url.as_str())
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to create Ollama client: {e}")))?;

        Ok(Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, Error> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(&prompt.system)
            .max_tokens(u64::from(self.max_tokens))
            .build();

        agent
            .prompt(&prompt.user)
            .await
            .map_err(|e| Error::Generation(format!("Model generation failed: {e}")))
    }
}
