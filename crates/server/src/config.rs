//! # Application Configuration
//!
//! This module defines the configuration structure for the `slotql-server` and
//! loads it in layers with the `config` crate:
//!
//! 1. Built-in defaults (`#[serde(default)]`).
//! 2. An optional YAML file (`config.yml` unless a path is given), with `${VAR}`
//!    placeholders substituted from the environment.
//! 3. Plain environment variables for top-level keys (`PORT`, `CATALOG_PATH`, ...).
//! 4. `SLOTQL_` prefixed variables for nested keys, with `__` as the separator
//!    (e.g. `SLOTQL_ENGINE__ACCEPTANCE_THRESHOLD=0.4`).

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use slotql::{constants::DEFAULT_QUERY_TIMEOUT_SECS, EngineConfig};
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// The file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// A catalog YAML file to load instead of the built-in catalog.
    #[serde(default)]
    pub catalog_path: Option<String>,
    /// Upper bound on a single warehouse query, in seconds.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    /// The BigQuery project billed for executed queries. Without it, `/query`
    /// and `/schema` are unavailable.
    #[serde(default)]
    pub bigquery_project_id: Option<String>,
    /// Tunables for the resolution engine.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Provides a default value for the `port` field if not set in the environment.
fn default_port() -> u16 {
    9090
}

fn default_query_timeout_secs() -> u64 {
    DEFAULT_QUERY_TIMEOUT_SECS
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// An explicitly given file must exist; the default `config.yml` is optional.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    // Layer 1 is the serde defaults on `AppConfig` and `EngineConfig`.
    let mut builder = ConfigBuilder::builder();

    // Layer 2: YAML file.
    let config_path = config_path_override.unwrap_or(DEFAULT_CONFIG_FILE);
    match read_and_substitute(config_path)? {
        Some(content) => {
            info!("Loading configuration from '{config_path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if config_path_override.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{config_path}'."
            )));
        }
        None => info!("'{config_path}' not found. Using defaults and environment."),
    }

    let settings = builder
        // Layer 3: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("SLOTQL")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
