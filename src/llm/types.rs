//! Common types for LLM interactions

use crate::transcript::{Message, Role, Transcript};

/// LLM request
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    /// Active guidance, sent through the provider's separate system channel
    pub system: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Build a request from a transcript: the latest system message becomes
    /// the guidance, user and assistant messages become the history.
    pub fn from_transcript(transcript: &Transcript) -> Self {
        Self {
            system: transcript.active_guidance().map(str::to_string),
            messages: transcript
                .dialogue()
                .filter_map(LlmMessage::from_transcript)
                .collect(),
            max_tokens: None,
            temperature: None,
        }
    }

    /// Single-turn request with explicit guidance
    pub fn single(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            messages: vec![LlmMessage::user(prompt)],
            max_tokens: None,
            temperature: None,
        }
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Message in the conversation history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub content: String,
}

impl LlmMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// System messages have no history representation
    pub fn from_transcript(message: &Message) -> Option<Self> {
        let role = match message.role {
            Role::System => return None,
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        };
        Some(Self {
            role,
            content: message.content.clone(),
        })
    }
}

/// Message role. There is deliberately no system variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// LLM response
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Usage,
}

impl LlmResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
