//! Model registry
//!
//! Maps an (API, model) pair to the factory that validates and builds it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ComponentConfig;
use crate::resource::{Api, Dependencies, Model, ResourceHandle};
use crate::utils::{ModuleError, Result};

/// Validates and constructs one model
#[async_trait::async_trait]
pub trait ModelFactory: Send + Sync {
    fn api(&self) -> Api;

    fn model(&self) -> Model;

    /// Checks the configuration and returns the names of implicit dependencies
    fn validate(&self, config: &ComponentConfig) -> Result<Vec<String>>;

    /// Builds and configures a new instance
    async fn create(&self, config: &ComponentConfig, deps: &Dependencies)
    -> Result<ResourceHandle>;
}

#[derive(Default)]
pub struct Registry {
    factories: HashMap<(Api, Model), Arc<dyn ModelFactory>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: Arc<dyn ModelFactory>) -> Result<()> {
        let key = (factory.api(), factory.model());
        if self.factories.contains_key(&key) {
            return Err(ModuleError::DuplicateModel {
                api: key.0.to_string(),
                model: key.1.to_string(),
            });
        }

        debug!(api = %key.0, model = %key.1, "Registered model");
        self.factories.insert(key, factory);
        Ok(())
    }

    pub fn lookup(&self, api: &Api, model: &Model) -> Option<Arc<dyn ModelFactory>> {
        self.factories
            .get(&(api.clone(), model.clone()))
            .map(Arc::clone)
    }

    fn factory_for(&self, config: &ComponentConfig) -> Result<Arc<dyn ModelFactory>> {
        let api = config.api();
        self.lookup(&api, &config.model)
            .ok_or_else(|| ModuleError::not_found("model", format!("{} ({})", config.model, api)))
    }

    pub fn validate(&self, config: &ComponentConfig) -> Result<Vec<String>> {
        self.factory_for(config)?.validate(config)
    }

    /// Validates the configuration and, if it passes, builds the resource
    pub async fn create(
        &self,
        config: &ComponentConfig,
        deps: &Dependencies,
    ) -> Result<ResourceHandle> {
        let factory = self.factory_for(config)?;
        factory.validate(config)?;

        let handle = factory.create(config, deps).await?;
        info!(name = %config.name, model = %config.model, "Resource created");
        Ok(handle)
    }

    /// Registered (api, model) pairs sorted by model name
    pub fn models(&self) -> Vec<(Api, Model)> {
        let mut models: Vec<(Api, Model)> = self.factories.keys().cloned().collect();
        models.sort_by_key(|(api, model)| (model.to_string(), api.to_string()));
        models
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Generic, ModelFamily, Resource, ValueMap};
    use serde_json::json;

    struct Noop {
        name: String,
    }

    #[async_trait::async_trait]
    impl Resource for Noop {
        fn name(&self) -> &str {
            &self.name
        }

        async fn reconfigure(&self, _config: &ComponentConfig, _deps: &Dependencies) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl Generic for Noop {
        async fn do_command(&self, command: ValueMap) -> Result<ValueMap> {
            Ok(command)
        }
    }

    struct NoopFactory;

    #[async_trait::async_trait]
    impl ModelFactory for NoopFactory {
        fn api(&self) -> Api {
            Api::generic()
        }

        fn model(&self) -> Model {
            Model::new(ModelFamily::new("test", "noop"), "noop")
        }

        fn validate(&self, config: &ComponentConfig) -> Result<Vec<String>> {
            if config.attributes.get_bool("fail")?.unwrap_or(false) {
                return Err(ModuleError::config("asked to fail"));
            }
            Ok(vec![])
        }

        async fn create(
            &self,
            config: &ComponentConfig,
            _deps: &Dependencies,
        ) -> Result<ResourceHandle> {
            Ok(ResourceHandle::Generic(std::sync::Arc::new(Noop {
                name: config.name.clone(),
            })))
        }
    }

    fn noop_config(attributes: serde_json::Value) -> ComponentConfig {
        serde_json::from_value(json!({
            "name": "n",
            "type": "generic",
            "model": "test:noop:noop",
            "attributes": attributes
        }))
        .unwrap()
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = Registry::new();
        registry.register(Arc::new(NoopFactory)).unwrap();

        let err = registry.register(Arc::new(NoopFactory)).unwrap_err();
        assert!(matches!(err, ModuleError::DuplicateModel { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_create_runs_validation_first() {
        let mut registry = Registry::new();
        registry.register(Arc::new(NoopFactory)).unwrap();

        let err = registry
            .create(&noop_config(json!({"fail": true})), &Dependencies::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ModuleError::Config { .. }));

        let handle = registry
            .create(&noop_config(json!({})), &Dependencies::new())
            .await
            .unwrap();
        assert_eq!(handle.name(), "n");
    }

    #[test]
    fn test_unknown_model_not_found() {
        let registry = Registry::new();
        let err = registry.validate(&noop_config(json!({}))).unwrap_err();
        assert!(matches!(err, ModuleError::NotFound { kind: "model", .. }));
    }
}
