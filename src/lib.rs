//! Viam module components backed by a chat-completion API
//!
//! Three models are provided:
//! - `jeremyrhyde:nlp:chatgpt` (generic): relays prompts to the API and keeps a
//!   timeout-bounded conversation
//! - `jeremyrhyde:generic:chatgpt` (generic): echoes its input
//! - `jeremyrhyde:sensor:wifi` (sensor): wireless signal statistics

use std::sync::Arc;

pub mod chat;
pub mod config;
pub mod providers;
pub mod resource;
pub mod sensor;
pub mod utils;

use resource::Registry;

/// Registers every model this module provides
pub fn register_models(registry: &mut Registry) -> utils::Result<()> {
    registry.register(Arc::new(chat::ChatGptFactory::new()))?;
    registry.register(Arc::new(chat::EchoFactory))?;
    registry.register(Arc::new(sensor::WifiFactory))?;
    Ok(())
}

/// A registry holding every model this module provides
pub fn default_registry() -> utils::Result<Registry> {
    let mut registry = Registry::new();
    register_models(&mut registry)?;
    Ok(registry)
}
