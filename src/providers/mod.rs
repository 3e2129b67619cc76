//! Chat-completion provider interface
//!
//! The components talk to a language model through the `LlmProvider` trait.
//! `OpenAiProvider` is the HTTP implementation; tests substitute their own.
//!
//! # Example
//!
//! ```rust,no_run
//! use viam_chatgpt::providers::{LlmMessage, LlmProvider, LlmRole};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let messages = vec![
//!         LlmMessage::new(LlmRole::System, "You are a intelligent assistant."),
//!         LlmMessage::new(LlmRole::User, "Hello!"),
//!     ];
//!
//!     let response = provider.chat(messages, "gpt-3.5-turbo").await.unwrap();
//!     println!("Response: {}", response.content);
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub mod error;
#[cfg(test)]
pub mod mock;
pub mod openai;

pub use error::ProviderError;
pub use openai::{OpenAiConfig, OpenAiProvider};

/// A role-tagged entry in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    /// Creates a new message with the specified role and content
    pub fn new(role: LlmRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(LlmRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(LlmRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(LlmRole::Assistant, content)
    }

    pub fn is_system(&self) -> bool {
        matches!(self.role, LlmRole::System)
    }

    pub fn is_user(&self) -> bool {
        matches!(self.role, LlmRole::User)
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self.role, LlmRole::Assistant)
    }
}

/// Role of a message sender in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    System,
    User,
    Assistant,
}

impl LlmRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmRole::System => "system",
            LlmRole::User => "user",
            LlmRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for LlmRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reply from a chat-completion call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmResponse {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
}

impl LlmResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            prompt_tokens: None,
            completion_tokens: None,
        }
    }

    pub fn with_tokens(mut self, prompt: u32, completion: u32) -> Self {
        self.prompt_tokens = Some(prompt);
        self.completion_tokens = Some(completion);
        self
    }

    pub fn total_tokens(&self) -> Option<u32> {
        match (self.prompt_tokens, self.completion_tokens) {
            (Some(p), Some(c)) => Some(p + c),
            _ => None,
        }
    }
}

/// Trait for chat-completion backends
///
/// Implementations must be Send + Sync so a component can hold one across
/// await points behind its state lock.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends the accumulated conversation and returns the assistant reply
    async fn chat(&self, messages: Vec<LlmMessage>, model: &str)
    -> Result<LlmResponse, ProviderError>;

    /// Used for logging and identification
    fn provider_name(&self) -> &'static str;
}

/// Shared handle to a provider
pub type SharedProvider = Arc<dyn LlmProvider>;

/// Builds a provider from the settings of a (re)configured component
pub type ProviderBuilder =
    Arc<dyn Fn(&OpenAiConfig) -> Result<SharedProvider, ProviderError> + Send + Sync>;

/// The builder used outside of tests: an HTTP client per configuration
pub fn openai_builder() -> ProviderBuilder {
    Arc::new(|config: &OpenAiConfig| {
        let provider = OpenAiProvider::try_new(config.clone())?;
        Ok(Arc::new(provider) as SharedProvider)
    })
}
