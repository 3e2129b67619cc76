//! ChatGPT generic component (`jeremyrhyde:nlp:chatgpt`)
//!
//! `do_command` takes `{<request_key>: <text>}`, appends the text to the
//! conversation and relays the whole conversation to the chat-completion
//! API. Upstream failures never surface as errors: the reply is replaced by
//! a fixed apology string.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::chat::conversation::Conversation;
use crate::config::{Attributes, ComponentConfig};
use crate::providers::openai::DEFAULT_BASE_URL;
use crate::providers::{
    LlmMessage, OpenAiConfig, ProviderBuilder, SharedProvider, openai_builder,
};
use crate::resource::{
    Api, Dependencies, Generic, Model, ModelFactory, ModelFamily, Resource, ResourceHandle,
    ValueMap,
};
use crate::utils::{ModuleError, Result};

pub const SUPPORTED_VERSIONS: &[&str] = &["gpt-3.5-turbo"];

pub const DEFAULT_REQUEST_KEY: &str = "request";

pub const RESPONSE_KEY: &str = "response";

pub const TIMESTAMP_KEY: &str = "timestamp";

pub fn model() -> Model {
    Model::new(ModelFamily::new("jeremyrhyde", "nlp"), "chatgpt")
}

/// Reply returned when the upstream call fails
pub fn fallback_response(request: &str) -> String {
    format!("Unable to reach ChatGPT. Request was {}", request)
}

/// Reply returned when the command lacks the request key
pub fn invalid_request_response(request_key: &str) -> String {
    format!("invalid request, no '{}' given", request_key)
}

/// Typed view of the component attributes
#[derive(Debug, Clone, PartialEq)]
pub struct ChatGptConfig {
    pub api_key: String,
    pub chat_gpt_version: String,
    pub request_key: String,
    /// Conversation timeout in seconds; zero resets on every request
    pub timeout_secs: f64,
    pub base_url: String,
}

impl ChatGptConfig {
    pub fn from_attributes(attributes: &Attributes) -> Result<Self> {
        Ok(Self {
            api_key: attributes.get_string("api_key")?.unwrap_or_default().to_string(),
            chat_gpt_version: attributes
                .get_string("chat_gpt_version")?
                .unwrap_or_default()
                .to_string(),
            request_key: attributes
                .get_string("request_key")?
                .unwrap_or(DEFAULT_REQUEST_KEY)
                .to_string(),
            timeout_secs: attributes.get_number("timeout")?.unwrap_or(0.0),
            base_url: attributes
                .get_string("base_url")?
                .unwrap_or(DEFAULT_BASE_URL)
                .to_string(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_VERSIONS.contains(&self.chat_gpt_version.as_str()) {
            return Err(ModuleError::config(format!(
                "{} must be one of the following: [{}]",
                self.chat_gpt_version,
                SUPPORTED_VERSIONS.join(", ")
            )));
        }

        if !self.timeout_secs.is_finite() || self.timeout_secs < 0.0 {
            return Err(ModuleError::config(format!(
                "timeout must be a non-negative number of seconds, got {}",
                self.timeout_secs
            )));
        }

        if self.request_key.is_empty() {
            return Err(ModuleError::config("request_key cannot be empty"));
        }

        Ok(())
    }

    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig::new(self.api_key.clone()).with_base_url(self.base_url.clone())
    }
}

struct ChatGptState {
    config: ChatGptConfig,
    provider: SharedProvider,
    conversation: Conversation,
}

pub struct ChatGpt {
    name: String,
    builder: ProviderBuilder,
    state: Mutex<ChatGptState>,
}

impl ChatGpt {
    /// Constructs the component and applies its initial configuration
    pub fn new(config: &ComponentConfig, builder: ProviderBuilder) -> Result<Self> {
        let state = build_state(config, &builder)?;
        info!(
            name = %config.name,
            version = %state.config.chat_gpt_version,
            timeout_secs = state.config.timeout_secs,
            "ChatGPT component configured"
        );

        Ok(Self {
            name: config.name.clone(),
            builder,
            state: Mutex::new(state),
        })
    }

    /// Snapshot of the current conversation buffer
    pub async fn conversation(&self) -> Vec<LlmMessage> {
        self.state.lock().await.conversation.messages().to_vec()
    }

    pub async fn config(&self) -> ChatGptConfig {
        self.state.lock().await.config.clone()
    }
}

fn build_state(config: &ComponentConfig, builder: &ProviderBuilder) -> Result<ChatGptState> {
    let chat_config = ChatGptConfig::from_attributes(&config.attributes)?;
    chat_config.validate()?;
    if chat_config.api_key.is_empty() {
        warn!(name = %config.name, "No api_key configured; requests will fail upstream");
    }

    let provider = builder(&chat_config.openai_config())?;
    let conversation = Conversation::with_timeout_secs(chat_config.timeout_secs);

    Ok(ChatGptState {
        config: chat_config,
        provider,
        conversation,
    })
}

fn request_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait::async_trait]
impl Resource for ChatGpt {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reconfigure(&self, config: &ComponentConfig, _deps: &Dependencies) -> Result<()> {
        let new_state = build_state(config, &self.builder)?;
        let mut state = self.state.lock().await;
        *state = new_state;
        info!(name = %self.name, "ChatGPT component reconfigured, conversation reset");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Generic for ChatGpt {
    async fn do_command(&self, command: ValueMap) -> Result<ValueMap> {
        let mut state = self.state.lock().await;
        let state = &mut *state;

        let Some(request) = command.get(&state.config.request_key).map(request_text) else {
            warn!(
                name = %self.name,
                request_key = %state.config.request_key,
                "Not a valid request"
            );
            let mut resp = ValueMap::new();
            resp.insert(
                RESPONSE_KEY.to_string(),
                json!(invalid_request_response(&state.config.request_key)),
            );
            return Ok(resp);
        };

        if state.conversation.expire_if_stale() {
            debug!(name = %self.name, "Conversation timed out, starting over");
        }

        let timestamp = chrono::Utc::now().to_rfc3339();
        state.conversation.push_user(request.clone());

        let result = state
            .provider
            .chat(
                state.conversation.messages().to_vec(),
                &state.config.chat_gpt_version,
            )
            .await;

        let reply = match result {
            Ok(response) => {
                debug!(
                    name = %self.name,
                    provider = state.provider.provider_name(),
                    messages = state.conversation.len(),
                    "Received reply"
                );
                state.conversation.push_assistant(response.content.clone());
                response.content
            }
            Err(e) => {
                warn!(
                    name = %self.name,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Issue occurred interfacing with chat-gpt"
                );
                fallback_response(&request)
            }
        };

        state.conversation.touch();

        let mut resp = ValueMap::new();
        resp.insert(RESPONSE_KEY.to_string(), json!(reply));
        resp.insert(TIMESTAMP_KEY.to_string(), json!(timestamp));
        Ok(resp)
    }
}

/// Factory registered for `jeremyrhyde:nlp:chatgpt`
pub struct ChatGptFactory {
    builder: ProviderBuilder,
}

impl ChatGptFactory {
    pub fn new() -> Self {
        Self::with_builder(openai_builder())
    }

    /// Uses a custom provider builder, e.g. an in-process provider
    pub fn with_builder(builder: ProviderBuilder) -> Self {
        Self { builder }
    }
}

impl Default for ChatGptFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ModelFactory for ChatGptFactory {
    fn api(&self) -> Api {
        Api::generic()
    }

    fn model(&self) -> Model {
        model()
    }

    fn validate(&self, config: &ComponentConfig) -> Result<Vec<String>> {
        ChatGptConfig::from_attributes(&config.attributes)?.validate()?;
        Ok(vec![])
    }

    async fn create(
        &self,
        config: &ComponentConfig,
        _deps: &Dependencies,
    ) -> Result<ResourceHandle> {
        let chat = ChatGpt::new(config, Arc::clone(&self.builder))?;
        Ok(ResourceHandle::Generic(Arc::new(chat)))
    }
}
