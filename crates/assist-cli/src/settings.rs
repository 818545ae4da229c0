use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use assist_core::config::Config;
use assist_core::config::LogConfig;
use assist_core::config::StorageConfig;
use snafu::ResultExt;
use snafu::Snafu;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ASSIST_LOG";
const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("failed to read config {}", path.display()))]
    ReadConfig { path: PathBuf, source: io::Error },

    #[snafu(display("invalid config {}", path.display()))]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[snafu(display("no data directory available; pass --data-dir"))]
    NoDataDir,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("assist").join("config.toml"))
}

/// An explicit path must exist; a missing default file yields defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(Config::default()),
        },
    };
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            return Ok(Config::default());
        }
        Err(err) => return Err(err).context(ReadConfigSnafu { path }),
    };
    parse_config(&raw).context(ParseConfigSnafu { path })
}

pub fn parse_config(raw: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(raw)
}

/// `--data-dir`, then `[storage] data_dir`, then the platform data directory.
pub fn resolve_data_dir(
    flag: Option<&Path>,
    storage: &StorageConfig,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = &storage.data_dir {
        return Ok(dir.clone());
    }
    dirs::data_dir()
        .map(|dir| dir.join("assist"))
        .ok_or(ConfigError::NoDataDir)
}

pub fn log_filter(env_value: Option<String>, log: &LogConfig) -> String {
    env_value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| log.filter.clone())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Logs go to stderr so command output stays clean.
pub fn init_logging(log: &LogConfig) {
    let directive = log_filter(std::env::var(LOG_ENV).ok(), log);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
