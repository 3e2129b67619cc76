//! Mock chat provider for unit tests
//!
//! Returns a configurable reply or error and records what it was sent.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::providers::{
    LlmMessage, LlmProvider, LlmResponse, OpenAiConfig, ProviderBuilder, ProviderError,
    SharedProvider,
};

pub struct MockLlmProvider {
    response: Mutex<LlmResponse>,
    error: Mutex<Option<ProviderError>>,
    call_count: Mutex<usize>,
    last_messages: Mutex<Option<Vec<LlmMessage>>>,
    last_model: Mutex<Option<String>>,
    message_counts: Mutex<Vec<usize>>,
    delay: Mutex<Option<Duration>>,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            response: Mutex::new(LlmResponse::new("Mock response")),
            error: Mutex::new(None),
            call_count: Mutex::new(0),
            last_messages: Mutex::new(None),
            last_model: Mutex::new(None),
            message_counts: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
        }
    }

    pub fn set_response(&self, content: impl Into<String>) {
        *self.response.lock().unwrap() = LlmResponse::new(content);
    }

    /// Makes every call sleep before answering
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn set_error(&self, error: ProviderError) {
        *self.error.lock().unwrap() = Some(error);
    }

    pub fn clear_error(&self) {
        *self.error.lock().unwrap() = None;
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn last_messages(&self) -> Option<Vec<LlmMessage>> {
        self.last_messages.lock().unwrap().clone()
    }

    /// Number of messages sent on each call, in call order
    pub fn message_counts(&self) -> Vec<usize> {
        self.message_counts.lock().unwrap().clone()
    }

    pub fn last_model(&self) -> Option<String> {
        self.last_model.lock().unwrap().clone()
    }

    /// A builder that hands out this same mock on every reconfigure
    pub fn builder(self: &Arc<Self>) -> ProviderBuilder {
        let mock = Arc::clone(self);
        Arc::new(move |_config: &OpenAiConfig| Ok(Arc::clone(&mock) as SharedProvider))
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockLlmProvider {
    async fn chat(
        &self,
        messages: Vec<LlmMessage>,
        model: &str,
    ) -> Result<LlmResponse, ProviderError> {
        *self.call_count.lock().unwrap() += 1;
        self.message_counts.lock().unwrap().push(messages.len());
        *self.last_messages.lock().unwrap() = Some(messages);
        *self.last_model.lock().unwrap() = Some(model.to_string());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.error.lock().unwrap().clone() {
            return Err(err);
        }

        Ok(self.response.lock().unwrap().clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_records_calls() {
        let mock = MockLlmProvider::new();
        mock.set_response("Hello!");

        let response = mock
            .chat(vec![LlmMessage::user("Hi")], "gpt-3.5-turbo")
            .await
            .unwrap();

        assert_eq!(response.content, "Hello!");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_model().as_deref(), Some("gpt-3.5-turbo"));
        assert_eq!(mock.last_messages().unwrap()[0].content, "Hi");
    }

    #[tokio::test]
    async fn test_mock_provider_error_then_clear() {
        let mock = MockLlmProvider::new();
        mock.set_error(ProviderError::network("Connection failed"));
        assert!(mock.chat(vec![], "m").await.is_err());

        mock.clear_error();
        assert!(mock.chat(vec![], "m").await.is_ok());
        assert_eq!(mock.call_count(), 2);
    }
}
