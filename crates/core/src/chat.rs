//! Types for OpenAI-compatible chat completion endpoints

use serde::{Deserialize, Serialize};

use crate::prompt::GenerationPrompt;

// =============================================================================
// Request Types (Serialization)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of `POST /chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub max_tokens: u32,
}

// =============================================================================
// Response Types (Deserialization)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// =============================================================================
// Transformation Functions
// =============================================================================

/// Build a single, non-streaming completion request.
pub fn build_chat_request(
    prompt: &GenerationPrompt,
    model: &str,
    max_tokens: u32,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: prompt.system.clone(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: prompt.user.clone(),
            },
        ],
        stream: false,
        max_tokens,
    }
}

/// Content of the first choice, if the provider returned any.
pub fn first_choice_content(response: ChatCompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
}
