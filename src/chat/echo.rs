//! Echo component (`jeremyrhyde:generic:chatgpt`)
//!
//! Accepts the same shape of configuration as the ChatGPT component but
//! never calls upstream: `do_command({"input": s})` returns `{"response": s}`.
//! Unlike the ChatGPT component, a missing `input` key is an error.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::chat::chatgpt::RESPONSE_KEY;
use crate::config::ComponentConfig;
use crate::resource::{
    Api, Dependencies, Generic, Model, ModelFactory, ModelFamily, Resource, ResourceHandle,
    ValueMap,
};
use crate::utils::{ModuleError, Result};

pub const INPUT_KEY: &str = "input";

pub fn model() -> Model {
    Model::new(ModelFamily::new("jeremyrhyde", "generic"), "chatgpt")
}

#[derive(Debug, Clone, PartialEq)]
pub struct EchoConfig {
    pub chat_gpt_version: Option<String>,
    pub setup: bool,
}

impl EchoConfig {
    pub fn from_component(config: &ComponentConfig) -> Result<Self> {
        Ok(Self {
            chat_gpt_version: config
                .attributes
                .get_string("chat_gpt_version")?
                .map(str::to_string),
            setup: config.attributes.get_bool("setup")?.unwrap_or(false),
        })
    }
}

pub struct Echo {
    name: String,
    setup_runs: RwLock<usize>,
}

impl Echo {
    pub async fn new(config: &ComponentConfig) -> Result<Self> {
        let echo = Self {
            name: config.name.clone(),
            setup_runs: RwLock::new(0),
        };
        echo.reconfigure(config, &Dependencies::new()).await?;
        Ok(echo)
    }

    /// Hook run on reconfigure when `setup` is true
    async fn setup(&self) {
        *self.setup_runs.write().await += 1;
        info!(name = %self.name, "Running setup");
    }

    /// Number of times the setup hook has run
    pub async fn setup_runs(&self) -> usize {
        *self.setup_runs.read().await
    }
}

#[async_trait::async_trait]
impl Resource for Echo {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reconfigure(&self, config: &ComponentConfig, _deps: &Dependencies) -> Result<()> {
        let new_config = EchoConfig::from_component(config)?;
        debug!(name = %self.name, version = ?new_config.chat_gpt_version, "Echo reconfigured");

        if new_config.setup {
            self.setup().await;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Generic for Echo {
    async fn do_command(&self, command: ValueMap) -> Result<ValueMap> {
        let Some(input) = command.get(INPUT_KEY) else {
            warn!(name = %self.name, "Not a valid request");
            return Err(ModuleError::invalid_input(format!(
                "invalid request, no '{}' given",
                INPUT_KEY
            )));
        };

        let mut resp = ValueMap::new();
        resp.insert(RESPONSE_KEY.to_string(), Value::clone(input));
        Ok(resp)
    }
}

pub struct EchoFactory;

#[async_trait::async_trait]
impl ModelFactory for EchoFactory {
    fn api(&self) -> Api {
        Api::generic()
    }

    fn model(&self) -> Model {
        model()
    }

    fn validate(&self, config: &ComponentConfig) -> Result<Vec<String>> {
        EchoConfig::from_component(config)?;
        Ok(vec![])
    }

    async fn create(
        &self,
        config: &ComponentConfig,
        _deps: &Dependencies,
    ) -> Result<ResourceHandle> {
        let echo = Echo::new(config).await?;
        Ok(ResourceHandle::Generic(Arc::new(echo)))
    }
}
