//! Conversation buffer with timeout-gated reset
//!
//! The buffer always begins with exactly one system entry. It grows by one
//! user entry per request (plus one assistant entry per successful reply)
//! until the time since the previous request exceeds the timeout, at which
//! point the next request starts again from the system entry alone.

use std::time::Duration;

use tokio::time::Instant;

use crate::providers::LlmMessage;

pub const SYSTEM_PROMPT: &str = "You are a intelligent assistant.";

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<LlmMessage>,
    timeout: Duration,
    last_request: Instant,
}

impl Conversation {
    /// A fresh buffer holding only the system entry
    pub fn new(timeout: Duration) -> Self {
        Self {
            messages: vec![LlmMessage::system(SYSTEM_PROMPT)],
            timeout,
            last_request: Instant::now(),
        }
    }

    /// Builds a buffer from a timeout in seconds; negative or non-finite
    /// values are treated as zero
    pub fn with_timeout_secs(secs: f64) -> Self {
        let timeout = if secs.is_finite() && secs > 0.0 {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        Self::new(timeout)
    }

    /// Drops everything but the system entry and restarts the clock
    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(LlmMessage::system(SYSTEM_PROMPT));
        self.last_request = Instant::now();
    }

    /// True when the next request must start from a fresh buffer
    ///
    /// A zero timeout expires on every request.
    pub fn is_expired(&self) -> bool {
        self.timeout.is_zero() || self.last_request.elapsed() > self.timeout
    }

    /// Resets the buffer if it has expired; returns whether it did
    pub fn expire_if_stale(&mut self) -> bool {
        if self.is_expired() {
            self.reset();
            true
        } else {
            false
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(LlmMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(LlmMessage::assistant(content));
    }

    /// Records that a request was just handled
    pub fn touch(&mut self) {
        self.last_request = Instant::now();
    }

    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
