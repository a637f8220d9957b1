//! codetour configuration.
//!
//! Loaded from `~/.codetour/config.toml`. A missing file means defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur while reading or writing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHome,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// codetour configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Whether the generated onboarding tour is listed alongside the
    /// project's tours.
    pub onboarding_assistant: bool,

    /// Directory, relative to the project root, where new tours are written.
    pub tours_dir: String,

    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            onboarding_assistant: false,
            tours_dir: ".tours".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// The config file path: `~/.codetour/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".codetour").join("config.toml"))
    }

    /// Loads config from `path`, or defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(toml::from_str(&contents)?)
    }

    /// Writes config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }
}

/// Where the engine reads and records user settings.
pub trait SettingsStore {
    fn onboarding_enabled(&self) -> bool;

    fn set_onboarding_enabled(&mut self, enabled: bool) -> Result<(), ConfigError>;
}

/// Settings held in memory only.
impl SettingsStore for Config {
    fn onboarding_enabled(&self) -> bool {
        self.onboarding_assistant
    }

    fn set_onboarding_enabled(&mut self, enabled: bool) -> Result<(), ConfigError> {
        self.onboarding_assistant = enabled;
        Ok(())
    }
}

/// Settings backed by a config file; every change is written through.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    config: Config,
}

impl ConfigFile {
    /// Opens `~/.codetour/config.toml`.
    pub fn open_default() -> Result<Self, ConfigError> {
        let path = Config::path().ok_or(ConfigError::NoHome)?;
        Self::open(path)
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = Config::load_from(&path)?;
        Ok(Self { path, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for ConfigFile {
    fn onboarding_enabled(&self) -> bool {
        self.config.onboarding_assistant
    }

    fn set_onboarding_enabled(&mut self, enabled: bool) -> Result<(), ConfigError> {
        let mut next = self.config.clone();
        next.onboarding_assistant = enabled;
        next.save_to(&self.path)?;
        self.config = next;
        Ok(())
    }
}
