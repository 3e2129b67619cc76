//! Utility modules for cross-cutting concerns

pub mod error;

pub use error::{ModuleError, Result};
