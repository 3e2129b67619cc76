//! Crate-wide error type for module components
//!
//! Library code returns `ModuleError` through the `Result` alias below.
//! The binary wraps these in `anyhow` for context.

use std::path::PathBuf;
use thiserror::Error;

use crate::providers::ProviderError;

/// Errors raised while validating, constructing or invoking a resource
#[derive(Error, Debug)]
pub enum ModuleError {
    /// Invalid or unsupported component configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed command or request input
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// IO errors with path context
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content that could not be parsed (sensor files, model strings)
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// A named resource, model or interface was not found
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// Attempt to register a model that is already registered
    #[error("Model {model} is already registered for {api}")]
    DuplicateModel { api: String, model: String },

    /// Operation not supported by this resource
    #[error("{operation} is not implemented for {resource}")]
    Unimplemented {
        resource: String,
        operation: &'static str,
    },

    /// Upstream chat-completion failures
    #[error("External service error: {0}")]
    Provider(#[from] ProviderError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl ModuleError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create an unimplemented-operation error
    pub fn unimplemented(resource: impl Into<String>, operation: &'static str) -> Self {
        Self::Unimplemented {
            resource: resource.into(),
            operation,
        }
    }

    /// Returns true if the caller can retry or fix the input and continue
    pub fn is_recoverable(&self) -> bool {
        match self {
            ModuleError::InvalidInput { .. } => true,
            ModuleError::Io { .. } => true,
            ModuleError::Provider(e) => e.is_retryable(),
            ModuleError::NotFound { .. } => true,
            ModuleError::Config { .. } => false,
            ModuleError::Parse { .. } => false,
            ModuleError::DuplicateModel { .. } => false,
            ModuleError::Unimplemented { .. } => false,
            ModuleError::Serialization { .. } => false,
        }
    }

    /// Returns the level at which this error should be logged
    pub fn severity(&self) -> tracing::Level {
        match self {
            ModuleError::Config { .. } => tracing::Level::ERROR,
            ModuleError::DuplicateModel { .. } => tracing::Level::ERROR,
            ModuleError::Serialization { .. } => tracing::Level::ERROR,
            ModuleError::Provider(_) => tracing::Level::WARN,
            ModuleError::Io { .. } => tracing::Level::WARN,
            ModuleError::Parse { .. } => tracing::Level::WARN,
            ModuleError::NotFound { .. } => tracing::Level::WARN,
            ModuleError::Unimplemented { .. } => tracing::Level::INFO,
            ModuleError::InvalidInput { .. } => tracing::Level::INFO,
        }
    }

    /// Logs this error at its severity level
    pub fn log(&self, context: &str) {
        let level = self.severity();
        if level == tracing::Level::ERROR {
            tracing::error!(error = %self, "{}", context);
        } else if level == tracing::Level::WARN {
            tracing::warn!(error = %self, "{}", context);
        } else {
            tracing::info!(error = %self, "{}", context);
        }
    }

    /// Returns a hint for the operator, if one applies
    pub fn suggestion(&self) -> Option<String> {
        match self {
            ModuleError::Config { message } if message.contains("must be one of") => {
                Some("Set 'chat_gpt_version' to a supported model.".to_string())
            }
            ModuleError::Config { .. } => {
                Some("Check the component attributes in your config file.".to_string())
            }
            ModuleError::Provider(e) if e.is_auth_error() => {
                Some("Verify 'api_key' or the OPENAI_API_KEY environment variable.".to_string())
            }
            ModuleError::Io { path, .. } if path.starts_with("/proc") => {
                Some("This sensor needs a Linux host with a wireless interface.".to_string())
            }
            _ => None,
        }
    }
}

/// Result type alias using ModuleError
pub type Result<T> = std::result::Result<T, ModuleError>;

impl From<serde_json::Error> for ModuleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
