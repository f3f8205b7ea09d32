use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::core::constants::{DEFAULT_MODEL, DEFAULT_PROBE_DELAY_MS};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Model used when `-m` is not given (e.g., "gemini-2.5-flash")
    pub default_model: Option<String>,
    /// System instruction sent with every request
    pub system_instruction: Option<String>,
    /// Override for the Generative Language API base URL
    pub base_url: Option<String>,
    /// Per-request HTTP timeout; requests wait indefinitely when unset
    pub request_timeout_secs: Option<u64>,
    /// Pause between model probes
    pub probe_delay_ms: Option<u64>,
}

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// No home directory to place the config file in.
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), source)
            }
            ConfigError::NoConfigDir => write!(f, "Failed to determine config directory"),
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::NoConfigDir => None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn StdError>> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, Box<dyn StdError>> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn StdError>> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Write atomically through a temp file in the target directory.
    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn StdError>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };

        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file
            .persist(config_path)
            .map_err(|err| -> Box<dyn StdError> { Box::new(err) })?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let proj_dirs =
            ProjectDirs::from("org", "accessai", "accessai").ok_or(ConfigError::NoConfigDir)?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Model from the command line, then config, then the built-in default.
    pub fn resolve_model(&self, cli_model: Option<&str>) -> String {
        cli_model
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .or_else(|| {
                self.default_model
                    .as_deref()
                    .map(str::trim)
                    .filter(|model| !model.is_empty())
            })
            .unwrap_or(DEFAULT_MODEL)
            .to_string()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn probe_delay(&self) -> Duration {
        Duration::from_millis(self.probe_delay_ms.unwrap_or(DEFAULT_PROBE_DELAY_MS))
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        print_entry("default-model", self.default_model.as_deref(), DEFAULT_MODEL);
        print_entry("system-instruction", self.system_instruction.as_deref(), "(unset)");
        print_entry("base-url", self.base_url.as_deref(), "(default)");
        match self.request_timeout_secs {
            Some(secs) if secs > 0 => println!("  request-timeout: {secs}s"),
            _ => println!("  request-timeout: (none)"),
        }
        println!("  probe-delay: {}ms", self.probe_delay().as_millis());
    }
}

fn print_entry(key: &str, value: Option<&str>, fallback: &str) {
    match value {
        Some(value) => println!("  {key}: {value}"),
        None => println!("  {key}: {fallback}"),
    }
}
