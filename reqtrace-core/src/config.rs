use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::StoreOptions;
use crate::error::ConfigError;

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "REQTRACE_CONFIG";

/// Environment variable overriding the database path
pub const DB_ENV_VAR: &str = "REQTRACE_DB";

/// Database file used when nothing else is configured
pub const DEFAULT_DATABASE: &str = "requirements.db";

/// User configuration, read from `~/.reqtrace.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Reject trace links that name requirements which do not exist
    pub enforce_references: bool,

    /// Open the database in write-ahead logging mode
    pub wal_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            enforce_references: true,
            wal_mode: false,
        }
    }
}

impl Config {
    /// Loads the config from the provided path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config, falling back to defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if !path.as_ref().exists() {
            log::debug!("No config file at {:?}, using defaults", path.as_ref());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            enforce_references: self.enforce_references,
            wal_mode: self.wal_mode,
        }
    }
}

/// Gets the path to the config file
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    let home_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home_dir.join(".reqtrace.yaml"))
}

/// Determines the database file to open
///
/// Priority: explicit path, then `REQTRACE_DB`, then the config file, then
/// `requirements.db` in the working directory.
pub fn determine_database_path(explicit: Option<&Path>, config: &Config) -> PathBuf {
    let from_env = env::var_os(DB_ENV_VAR).map(PathBuf::from);
    resolve_database_path(explicit, from_env, config)
}

fn resolve_database_path(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    config: &Config,
) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or(from_env)
        .or_else(|| config.database.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
}
