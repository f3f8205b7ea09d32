//! `accessai set` / `accessai unset` handling.

use std::fmt;
use std::path::Path;

use crate::core::config::Config;

pub const SETTING_KEYS: [&str; 5] = [
    "default-model",
    "system-instruction",
    "base-url",
    "request-timeout",
    "probe-delay",
];

#[derive(Debug, PartialEq, Eq)]
pub enum SettingError {
    UnknownKey(String),
    /// The value could not be parsed as a whole number.
    InvalidNumber { key: &'static str, input: String },
    MissingValue { example: &'static str },
    ConfigError(String),
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        match self {
            SettingError::UnknownKey(key) => {
                eprintln!("❌ Unknown config key: {key}");
                eprintln!("   Available keys: {}", SETTING_KEYS.join(", "));
            }
            SettingError::InvalidNumber { key, input } => {
                eprintln!("❌ Invalid value for {key}: {input}");
                eprintln!("   Expected a whole number");
            }
            SettingError::MissingValue { example } => {
                eprintln!("⚠️  A value is required");
                eprintln!("Example: {example}");
            }
            SettingError::ConfigError(msg) => {
                eprintln!("❌ Failed to save configuration: {msg}");
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::InvalidNumber { key, input } => {
                write!(f, "Invalid value for {key}: {input}")
            }
            SettingError::MissingValue { example } => write!(f, "Missing value ({example})"),
            SettingError::ConfigError(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for SettingError {}

/// Apply `set <key> <value…>` to `config`, returning a confirmation line.
pub fn apply_set(config: &mut Config, key: &str, value: &[String]) -> Result<String, SettingError> {
    let value = value.join(" ");
    let value = value.trim();

    match key {
        "default-model" => {
            require(value, "accessai set default-model gemini-2.5-flash")?;
            config.default_model = Some(value.to_string());
        }
        "system-instruction" => {
            require(value, "accessai set system-instruction You are a helpful assistant.")?;
            config.system_instruction = Some(value.to_string());
        }
        "base-url" => {
            require(value, "accessai set base-url https://generativelanguage.googleapis.com/v1beta")?;
            config.base_url = Some(value.to_string());
        }
        "request-timeout" => {
            require(value, "accessai set request-timeout 60")?;
            config.request_timeout_secs = Some(parse_number("request-timeout", value)?);
        }
        "probe-delay" => {
            require(value, "accessai set probe-delay 1000")?;
            config.probe_delay_ms = Some(parse_number("probe-delay", value)?);
        }
        other => return Err(SettingError::UnknownKey(other.to_string())),
    }

    Ok(format!("✅ Set {key} to: {value}"))
}

pub fn apply_unset(config: &mut Config, key: &str) -> Result<String, SettingError> {
    match key {
        "default-model" => config.default_model = None,
        "system-instruction" => config.system_instruction = None,
        "base-url" => config.base_url = None,
        "request-timeout" => config.request_timeout_secs = None,
        "probe-delay" => config.probe_delay_ms = None,
        other => return Err(SettingError::UnknownKey(other.to_string())),
    }
    Ok(format!("✅ Unset {key}"))
}

/// Write `config` to `path`, reporting failures as a setting error.
pub fn save_config(config: &Config, path: &Path) -> Result<(), SettingError> {
    config
        .save_to_path(path)
        .map_err(|err| SettingError::ConfigError(err.to_string()))
}

fn require(value: &str, example: &'static str) -> Result<(), SettingError> {
    if value.is_empty() {
        Err(SettingError::MissingValue { example })
    } else {
        Ok(())
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, SettingError> {
    value.parse().map_err(|_| SettingError::InvalidNumber {
        key,
        input: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(value: &str) -> Vec<String> {
        value.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn set_joins_multi_word_values() {
        let mut config = Config::default();
        let message = apply_set(
            &mut config,
            "system-instruction",
            &words("You are a helpful assistant."),
        )
        .expect("set");

        assert_eq!(
            config.system_instruction.as_deref(),
            Some("You are a helpful assistant.")
        );
        assert_eq!(message, "✅ Set system-instruction to: You are a helpful assistant.");
    }

    #[test]
    fn numeric_keys_are_validated() {
        let mut config = Config::default();
        apply_set(&mut config, "request-timeout", &words("45")).expect("set");
        assert_eq!(config.request_timeout_secs, Some(45));

        assert_eq!(
            apply_set(&mut config, "probe-delay", &words("soon")),
            Err(SettingError::InvalidNumber {
                key: "probe-delay",
                input: "soon".into()
            })
        );
    }

    #[test]
    fn unknown_and_empty_inputs_are_rejected() {
        let mut config = Config::default();
        assert_eq!(
            apply_set(&mut config, "theme", &words("dark")),
            Err(SettingError::UnknownKey("theme".into()))
        );
        assert!(matches!(
            apply_set(&mut config, "default-model", &[]),
            Err(SettingError::MissingValue { .. })
        ));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_config_writes_toml() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("accessai").join("config.toml");
        let mut config = Config::default();
        apply_set(&mut config, "probe-delay", &words("250")).expect("set");

        save_config(&config, &path).expect("save");

        let loaded = Config::load_from_path(&path).expect("load");
        assert_eq!(loaded.probe_delay_ms, Some(250));
    }

    #[test]
    fn save_failures_become_config_errors() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").expect("write blocker");

        let err = save_config(&Config::default(), &blocker.join("config.toml"))
            .expect_err("save should fail");

        assert!(matches!(err, SettingError::ConfigError(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn unset_clears_value() {
        let mut config = Config {
            default_model: Some("gemma-3-4b-it".into()),
            ..Config::default()
        };
        apply_unset(&mut config, "default-model").expect("unset");
        assert_eq!(config.default_model, None);
    }
}
