//! Configuration management for appframe.
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use strum_macros::{AsRefStr, EnumString};
use tracing::debug;

use crate::{error::ConfigError, logging::Severity};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "appframe.yaml";

/// Represents the structure of the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Main window parameters.
    pub window: WindowConfig,
    /// Logging service parameters.
    pub logging: LoggingConfig,
    /// Pause between empty event-queue polls, in milliseconds.
    pub idle_interval_ms: u64,
}

impl AppConfig {
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}

/// Parameters handed to the platform when creating the main window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "appframe".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SinkKind {
    #[default]
    File,
    Console,
    Tracing,
}

/// Configuration for the logging service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub sink: SinkKind,
    /// Log file, used by the `file` sink.
    pub path: PathBuf,
    /// Keep existing file content instead of truncating on start.
    pub append: bool,
    /// Messages below this severity are dropped.
    pub min_severity: Severity,
    /// Panic on sink failures instead of reporting them.
    pub fatal_on_sink_error: bool,
    /// Label given to the thread that starts the logging service.
    pub main_thread_label: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::File,
            path: PathBuf::from("appframe.log"),
            append: false,
            min_severity: Severity::Info,
            fatal_on_sink_error: false,
            main_thread_label: "mainThread".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            logging: LoggingConfig::default(),
            idle_interval_ms: 1,
        }
    }
}

/// Expands `$VAR` and `${VAR}` references within a string.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?")
        .expect("static pattern is valid");

    let mut missing = None;
    let result = re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        env::var(var_name).unwrap_or_else(|_| {
            missing.get_or_insert_with(|| var_name.to_string());
            String::new()
        })
    });

    match missing {
        Some(var_name) => Err(ConfigError::MissingEnvVar(var_name)),
        None => Ok(result.into_owned()),
    }
}

/// Parses configuration from YAML text, expanding environment variables.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let expanded = expand_env_vars(content)?;
    if expanded.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    Ok(serde_yaml::from_str(&expanded)?)
}

/// Loads the configuration file.
///
/// An explicit path must exist. Without one, `appframe.yaml` in the working
/// directory is used if present and the built-in defaults otherwise. A
/// relative log path is resolved against the config file's directory.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let config_path = match config_path {
        Some(path) => Path::new(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
        None => {
            debug!("No {DEFAULT_CONFIG_FILE} found; using built-in defaults");
            return Ok(AppConfig::default());
        }
    };

    let content = fs::read_to_string(config_path).map_err(|e| {
        ConfigError::ReadError(std::io::Error::new(
            e.kind(),
            format!("{} ({})", e, config_path.display()),
        ))
    })?;

    let mut config = parse_config(&content)?;

    let base_path = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if config.logging.path.is_relative() {
        config.logging.path = base_path.join(&config.logging.path);
    }

    debug!("Loaded configuration from {}", config_path.display());
    Ok(config)
}
