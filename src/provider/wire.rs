//! Chat-completion request/response shapes shared by the OpenAI-style backends.

use serde::{Deserialize, Serialize};

use super::SuggestionRequest;

/// Sampling temperature for every suggestion request.
pub const TEMPERATURE: f32 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub n: u32,
}

impl ChatCompletionRequest {
    /// A single user-role message carrying the whole prompt.
    pub fn from_suggestion(model: &str, request: &SuggestionRequest) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: TEMPERATURE,
            max_tokens: request.max_tokens,
            n: request.count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Message text of every choice, in the order returned.
    pub fn texts(self) -> Vec<String> {
        self.choices
            .into_iter()
            .filter_map(|choice| choice.message.content)
            .collect()
    }
}
