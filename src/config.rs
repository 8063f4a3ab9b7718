//! Configuration loading for contact-list.
//!
//! Values come from (highest precedence first):
//! 1. Environment variables prefixed with `CONTACT_LIST_`, sections split by
//!    `__` (for example `CONTACT_LIST_UI__LOADING_DELAY_MS=0`)
//! 2. The TOML file at `~/.contact-list/config.toml` or the `--config` path
//! 3. Defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::db::SCHEMA_VERSION;
use crate::error::{Error, Result};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".contact-list";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "contato.db";
const LOG_FILE_NAME: &str = "contact-list.log";
const ENV_PREFIX: &str = "CONTACT_LIST_";

/// Longest cosmetic delay accepted before a background task touches the store.
const MAX_LOADING_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. Defaults to `~/.contact-list/contato.db`.
    pub database_path: Option<PathBuf>,
    /// Expected schema generation. Changing it wipes the contacts table on
    /// the next start.
    pub schema_version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Pause before each background task runs so the loading indicator is
    /// visible. 0 disables it.
    pub loading_delay_ms: u64,
    /// How long the event loop waits for input before redrawing.
    pub tick_rate_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file. Defaults to `~/.contact-list/contact-list.log`.
    pub file: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            schema_version: SCHEMA_VERSION,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            loading_delay_ms: 1_000,
            tick_rate_ms: 100,
        }
    }
}

impl Config {
    /// Load with an optional explicit config file. A missing file is not an
    /// error; defaults and the environment still apply.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        let config: Config = Self::figment(&config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// `~/.contact-list`, where the database, config and log live by default.
    pub fn default_data_dir() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new().ok_or(Error::HomeDirectoryMissing)?;
        Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_data_dir()?.join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.schema_version == 0 {
            return Err(Error::config_validation(
                "storage.schema_version must be at least 1",
            ));
        }

        if self.ui.loading_delay_ms > MAX_LOADING_DELAY_MS {
            return Err(Error::config_validation(format!(
                "ui.loading_delay_ms ({}) cannot exceed {MAX_LOADING_DELAY_MS}",
                self.ui.loading_delay_ms
            )));
        }

        if !(10..=1_000).contains(&self.ui.tick_rate_ms) {
            return Err(Error::config_validation(format!(
                "ui.tick_rate_ms ({}) must be between 10 and 1000",
                self.ui.tick_rate_ms
            )));
        }

        Ok(())
    }

    /// Database path, resolving the default when unset.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::default_data_dir()?.join(DB_FILE_NAME)),
        }
    }

    /// Log file path, resolving the default when unset.
    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.logging.file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::default_data_dir()?.join(LOG_FILE_NAME)),
        }
    }

    #[must_use]
    pub fn loading_delay(&self) -> Duration {
        Duration::from_millis(self.ui.loading_delay_ms)
    }

    #[must_use]
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms)
    }
}
