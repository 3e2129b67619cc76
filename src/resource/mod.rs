//! Resource identity and lifecycle traits
//!
//! These types mirror the contract a Viam host imposes on module resources:
//! every model is registered under an API triple and a model triple, is
//! validated before construction, and can be reconfigured in place.
//! Transport to and from the host is out of scope; the `Registry` drives
//! the same lifecycle in-process.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ComponentConfig;
use crate::utils::{ModuleError, Result};

pub mod registry;

pub use registry::{ModelFactory, Registry};

/// Argument and return type of `do_command` and `get_readings`
pub type ValueMap = serde_json::Map<String, serde_json::Value>;

/// API triple, e.g. `rdk:component:generic`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Api {
    pub namespace: String,
    pub resource_type: String,
    pub subtype: String,
}

impl Api {
    pub fn component(namespace: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            resource_type: "component".to_string(),
            subtype: subtype.into(),
        }
    }

    pub fn generic() -> Self {
        Self::component("rdk", "generic")
    }

    pub fn sensor() -> Self {
        Self::component("rdk", "sensor")
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.resource_type, self.subtype)
    }
}

/// Namespace and family half of a model triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelFamily {
    pub namespace: String,
    pub family: String,
}

impl ModelFamily {
    pub fn new(namespace: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            family: family.into(),
        }
    }
}

/// Model triple, e.g. `jeremyrhyde:nlp:chatgpt`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Model {
    pub family: ModelFamily,
    pub name: String,
}

impl Model {
    pub fn new(family: ModelFamily, name: impl Into<String>) -> Self {
        Self {
            family,
            name: name.into(),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.family.namespace, self.family.family, self.name
        )
    }
}

impl FromStr for Model {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [namespace, family, name]
                if !namespace.is_empty() && !family.is_empty() && !name.is_empty() =>
            {
                Ok(Model::new(ModelFamily::new(*namespace, *family), *name))
            }
            _ => Err(ModuleError::parse(format!(
                "model '{}' must have the form namespace:family:name",
                s
            ))),
        }
    }
}

impl Serialize for Model {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Fully-qualified name of a configured resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName {
    pub api: Api,
    pub name: String,
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api, self.name)
    }
}

/// Lifecycle shared by every resource
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    fn name(&self) -> &str;

    /// Applies a new configuration in place
    async fn reconfigure(&self, config: &ComponentConfig, deps: &Dependencies) -> Result<()>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A resource driven entirely through `do_command`
#[async_trait::async_trait]
pub trait Generic: Resource {
    async fn do_command(&self, command: ValueMap) -> Result<ValueMap>;
}

/// A resource that reports readings
#[async_trait::async_trait]
pub trait Sensor: Resource {
    async fn get_readings(&self, extra: Option<ValueMap>) -> Result<ValueMap>;

    async fn do_command(&self, _command: ValueMap) -> Result<ValueMap> {
        Err(ModuleError::unimplemented(self.name(), "do_command"))
    }
}

/// A constructed resource of one of the supported APIs
#[derive(Clone)]
pub enum ResourceHandle {
    Generic(Arc<dyn Generic>),
    Sensor(Arc<dyn Sensor>),
}

impl ResourceHandle {
    pub fn name(&self) -> &str {
        match self {
            ResourceHandle::Generic(r) => r.name(),
            ResourceHandle::Sensor(r) => r.name(),
        }
    }

    pub fn api(&self) -> Api {
        match self {
            ResourceHandle::Generic(_) => Api::generic(),
            ResourceHandle::Sensor(_) => Api::sensor(),
        }
    }

    pub async fn do_command(&self, command: ValueMap) -> Result<ValueMap> {
        match self {
            ResourceHandle::Generic(r) => r.do_command(command).await,
            ResourceHandle::Sensor(r) => r.do_command(command).await,
        }
    }

    pub async fn reconfigure(&self, config: &ComponentConfig, deps: &Dependencies) -> Result<()> {
        match self {
            ResourceHandle::Generic(r) => r.reconfigure(config, deps).await,
            ResourceHandle::Sensor(r) => r.reconfigure(config, deps).await,
        }
    }

    pub async fn close(&self) -> Result<()> {
        match self {
            ResourceHandle::Generic(r) => r.close().await,
            ResourceHandle::Sensor(r) => r.close().await,
        }
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("api", &self.api().to_string())
            .field("name", &self.name())
            .finish()
    }
}

/// Resources a component depends on, keyed by name
pub type Dependencies = HashMap<ResourceName, ResourceHandle>;
