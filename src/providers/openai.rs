//! OpenAI-compatible chat-completion provider
//!
//! Sends the conversation to `{base_url}/chat/completions` and returns the
//! first choice. One request per call; failures are classified and returned
//! to the caller, which decides how to surface them.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::providers::{LlmMessage, LlmProvider, LlmResponse, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Timeout applied to every HTTP request
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: HTTP_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
    error: Option<OpenAiError>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
}

/// HTTP client for the chat-completion endpoint
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    /// Builds the provider, returning an error if the HTTP client cannot be created
    pub fn try_new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn build_request<'a>(&self, messages: Vec<LlmMessage>, model: &'a str) -> OpenAiRequest<'a> {
        let messages = messages
            .into_iter()
            .map(|msg| OpenAiMessage {
                role: msg.role.as_str().to_string(),
                content: Some(msg.content),
            })
            .collect();

        OpenAiRequest { model, messages }
    }

    fn parse_response(&self, response: OpenAiResponse) -> Result<LlmResponse, ProviderError> {
        if let Some(error) = response.error {
            return Err(ProviderError::provider(
                error.message,
                error.code.or(error.error_type),
            ));
        }

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            ProviderError::provider("No response choices returned", None::<&str>)
        })?;

        let mut llm_response = LlmResponse::new(choice.message.content.unwrap_or_default());
        if let Some(usage) = response.usage {
            llm_response = llm_response.with_tokens(usage.prompt_tokens, usage.completion_tokens);
        }

        Ok(llm_response)
    }
}

fn retry_after_secs(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(
        &self,
        messages: Vec<LlmMessage>,
        model: &str,
    ) -> Result<LlmResponse, ProviderError> {
        let url = self.config.completions_url();
        let request = self.build_request(messages, model);
        debug!(url = %url, model = %model, messages = request.messages.len(), "Sending chat completion request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.config.timeout_seconds))?;

        let status = resp.status();
        debug!(status = %status, "Received response");

        if status != StatusCode::OK {
            let retry_after = retry_after_secs(&resp);
            let body = resp.text().await.unwrap_or_default();
            let err = ProviderError::from_status(status, &body, retry_after);
            warn!(status = %status, retryable = err.is_retryable(), "Chat completion request failed");
            return Err(err);
        }

        let body = resp.json::<OpenAiResponse>().await.map_err(|e| {
            ProviderError::serialization(format!("Failed to parse response: {}", e))
        })?;

        let response = self.parse_response(body)?;
        debug!(tokens = ?response.total_tokens(), "Chat completion succeeded");
        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
