use serde::{Deserialize, Serialize};

use crate::resource::{Api, Model, ValueMap};
use crate::utils::{ModuleError, Result};

fn default_namespace() -> String {
    "rdk".to_string()
}

/// Top-level robot configuration; only the component list is read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

impl RobotConfig {
    pub fn component(&self, name: &str) -> Option<&ComponentConfig> {
        self.components.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// API subtype, e.g. "generic" or "sensor"
    #[serde(rename = "type")]
    pub component_type: String,

    pub model: Model,

    #[serde(default)]
    pub attributes: Attributes,
}

impl ComponentConfig {
    pub fn api(&self) -> Api {
        Api::component(self.namespace.clone(), self.component_type.clone())
    }
}

/// Free-form component attributes with typed accessors
///
/// Accessors return `Ok(None)` when the key is absent and a config error
/// when it is present with the wrong type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(pub ValueMap);

impl Attributes {
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get_string(&self, key: &str) -> Result<Option<&str>> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(type_mismatch(key, "a string", other)),
        }
    }

    pub fn get_number(&self, key: &str) -> Result<Option<f64>> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
            Some(other) => Err(type_mismatch(key, "a number", other)),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(type_mismatch(key, "a boolean", other)),
        }
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.0
            .insert(key.to_string(), serde_json::Value::String(value.into()));
    }
}

fn type_mismatch(key: &str, expected: &str, found: &serde_json::Value) -> ModuleError {
    ModuleError::config(format!(
        "attribute '{}' must be {}, found {}",
        key, expected, found
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_deserialization() {
        let json = r#"{
            "name": "chat",
            "type": "generic",
            "model": "jeremyrhyde:nlp:chatgpt",
            "attributes": {"api_key": "sk-test", "timeout": 30}
        }"#;

        let config: ComponentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name, "chat");
        assert_eq!(config.namespace, "rdk");
        assert_eq!(config.api(), Api::generic());
        assert_eq!(config.model.to_string(), "jeremyrhyde:nlp:chatgpt");
        assert_eq!(config.attributes.get_string("api_key").unwrap(), Some("sk-test"));
        assert_eq!(config.attributes.get_number("timeout").unwrap(), Some(30.0));
    }

    #[test]
    fn test_missing_attributes_default_empty() {
        let json = r#"{"name": "s", "type": "sensor", "model": "jeremyrhyde:sensor:wifi"}"#;
        let config: ComponentConfig = serde_json::from_str(json).unwrap();
        assert!(config.attributes.0.is_empty());
        assert_eq!(config.attributes.get_string("path").unwrap(), None);
    }

    #[test]
    fn test_attribute_type_mismatch() {
        let mut map = ValueMap::new();
        map.insert("timeout".to_string(), serde_json::json!("ten"));
        let attributes = Attributes(map);

        let err = attributes.get_number("timeout").unwrap_err();
        assert!(err.to_string().contains("'timeout' must be a number"));
        assert!(attributes.get_bool("timeout").is_err());
    }

    #[test]
    fn test_robot_config_lookup() {
        let json = r#"{"components": [
            {"name": "a", "type": "generic", "model": "jeremyrhyde:generic:chatgpt"},
            {"name": "b", "type": "sensor", "model": "jeremyrhyde:sensor:wifi"}
        ]}"#;
        let config: RobotConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.components.len(), 2);
        assert_eq!(config.component("b").unwrap().api(), Api::sensor());
        assert!(config.component("c").is_none());
    }
}
