use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use super::calendar::ZonePolicy;

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub storage: StorageConfig,
    pub calendar: CalendarConfig,
    pub log: LogConfig,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    pub default_model: Option<String>,
    pub default_provider: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct CalendarConfig {
    pub zone: ZonePolicy,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. `assist_core=debug`.
    pub filter: Option<String>,
}
