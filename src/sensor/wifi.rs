//! Wireless signal sensor (`jeremyrhyde:sensor:wifi`)
//!
//! Reads `/proc/net/wireless`, which looks like:
//!
//! ```text
//! Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
//!  face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
//!  wlan0: 0000   70.  -40.  -256        0      0      0      0      0        0
//! ```
//!
//! Fields are whitespace separated and read by position.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::ComponentConfig;
use crate::resource::{
    Api, Dependencies, Model, ModelFactory, ModelFamily, Resource, ResourceHandle, Sensor,
    ValueMap,
};
use crate::utils::{ModuleError, Result};

pub const DEFAULT_WIRELESS_PATH: &str = "/proc/net/wireless";

const HEADER_LINES: usize = 2;

pub fn model() -> Model {
    Model::new(ModelFamily::new("jeremyrhyde", "sensor"), "wifi")
}

/// One interface row of the wireless statistics file
#[derive(Debug, Clone, PartialEq)]
pub struct WirelessStats {
    pub interface: String,
    pub status: String,
    pub link: f64,
    pub level: f64,
    pub noise: f64,
    pub discarded_nwid: u64,
    pub discarded_crypt: u64,
    pub discarded_frag: u64,
    pub discarded_retry: u64,
    pub discarded_misc: u64,
    pub missed_beacon: u64,
}

impl WirelessStats {
    pub fn to_readings(&self) -> ValueMap {
        let mut readings = ValueMap::new();
        readings.insert("interface".to_string(), json!(self.interface));
        readings.insert("status".to_string(), json!(self.status));
        readings.insert("link".to_string(), json!(self.link));
        readings.insert("level".to_string(), json!(self.level));
        readings.insert("noise".to_string(), json!(self.noise));
        readings.insert("discarded_nwid".to_string(), json!(self.discarded_nwid));
        readings.insert("discarded_crypt".to_string(), json!(self.discarded_crypt));
        readings.insert("discarded_frag".to_string(), json!(self.discarded_frag));
        readings.insert("discarded_retry".to_string(), json!(self.discarded_retry));
        readings.insert("discarded_misc".to_string(), json!(self.discarded_misc));
        readings.insert("missed_beacon".to_string(), json!(self.missed_beacon));
        readings
    }
}

fn parse_float(field: &str, name: &str) -> Result<f64> {
    field
        .trim_end_matches('.')
        .parse()
        .map_err(|_| ModuleError::parse(format!("{} '{}' is not a number", name, field)))
}

/// Counters missing from a short row read as zero
fn parse_count(field: Option<&str>, name: &str) -> Result<u64> {
    match field {
        None => Ok(0),
        Some(f) => f
            .parse()
            .map_err(|_| ModuleError::parse(format!("{} '{}' is not a counter", name, f))),
    }
}

/// Parses a single interface row
pub fn parse_line(line: &str) -> Result<WirelessStats> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return Err(ModuleError::parse(format!(
            "expected at least 5 fields, found {} in '{}'",
            fields.len(),
            line.trim()
        )));
    }

    Ok(WirelessStats {
        interface: fields[0].trim_end_matches(':').to_string(),
        status: fields[1].to_string(),
        link: parse_float(fields[2], "link")?,
        level: parse_float(fields[3], "level")?,
        noise: parse_float(fields[4], "noise")?,
        discarded_nwid: parse_count(fields.get(5).copied(), "discarded_nwid")?,
        discarded_crypt: parse_count(fields.get(6).copied(), "discarded_crypt")?,
        discarded_frag: parse_count(fields.get(7).copied(), "discarded_frag")?,
        discarded_retry: parse_count(fields.get(8).copied(), "discarded_retry")?,
        discarded_misc: parse_count(fields.get(9).copied(), "discarded_misc")?,
        missed_beacon: parse_count(fields.get(10).copied(), "missed_beacon")?,
    })
}

/// Parses every interface row, skipping the two header lines
pub fn parse_wireless(content: &str) -> Result<Vec<WirelessStats>> {
    content
        .lines()
        .skip(HEADER_LINES)
        .filter(|l| !l.trim().is_empty())
        .map(parse_line)
        .collect()
}

/// Picks the named interface, or the first one listed
pub fn select_interface(stats: Vec<WirelessStats>, interface: Option<&str>) -> Result<WirelessStats> {
    match interface {
        Some(name) => stats
            .into_iter()
            .find(|s| s.interface == name)
            .ok_or_else(|| ModuleError::not_found("interface", name)),
        None => stats
            .into_iter()
            .next()
            .ok_or_else(|| ModuleError::not_found("interface", "any wireless interface")),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WifiConfig {
    pub path: PathBuf,
    pub interface: Option<String>,
}

impl WifiConfig {
    pub fn from_component(config: &ComponentConfig) -> Result<Self> {
        Ok(Self {
            path: PathBuf::from(
                config
                    .attributes
                    .get_string("path")?
                    .unwrap_or(DEFAULT_WIRELESS_PATH),
            ),
            interface: config.attributes.get_string("interface")?.map(str::to_string),
        })
    }
}

pub struct Wifi {
    name: String,
    config: RwLock<WifiConfig>,
}

impl Wifi {
    pub fn new(config: &ComponentConfig) -> Result<Self> {
        Ok(Self {
            name: config.name.clone(),
            config: RwLock::new(WifiConfig::from_component(config)?),
        })
    }

    async fn read_file(path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ModuleError::io(path, e))
    }
}

#[async_trait::async_trait]
impl Resource for Wifi {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reconfigure(&self, config: &ComponentConfig, _deps: &Dependencies) -> Result<()> {
        *self.config.write().await = WifiConfig::from_component(config)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sensor for Wifi {
    async fn get_readings(&self, _extra: Option<ValueMap>) -> Result<ValueMap> {
        let config = self.config.read().await.clone();
        let content = Self::read_file(&config.path).await?;
        let stats = select_interface(parse_wireless(&content)?, config.interface.as_deref())?;

        debug!(
            name = %self.name,
            interface = %stats.interface,
            link = stats.link,
            level = stats.level,
            "Read wireless statistics"
        );
        Ok(stats.to_readings())
    }
}

pub struct WifiFactory;

#[async_trait::async_trait]
impl ModelFactory for WifiFactory {
    fn api(&self) -> Api {
        Api::sensor()
    }

    fn model(&self) -> Model {
        model()
    }

    fn validate(&self, config: &ComponentConfig) -> Result<Vec<String>> {
        WifiConfig::from_component(config)?;
        Ok(vec![])
    }

    async fn create(
        &self,
        config: &ComponentConfig,
        _deps: &Dependencies,
    ) -> Result<ResourceHandle> {
        Ok(ResourceHandle::Sensor(Arc::new(Wifi::new(config)?)))
    }
}
