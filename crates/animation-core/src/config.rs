//! Configuration loading and typed config structures for the animation
//! data service.
//!
//! The configuration lives in `animation-config.yaml` next to the
//! binary by default. Every field has a default, so an empty or missing
//! file yields a working configuration rooted at the current directory.

use std::path::Path;

use serde::Deserialize;

/// Environment variable naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "ANIMATION_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "animation-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Where the study lives and what to activate first.
    #[serde(default)]
    pub study: StudyConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `ANIMATION_STUDY_ROOT` overrides `study.root`
    /// - `ANIMATION_OBSERVER_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    /// Environment overrides apply either way.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects an empty document; treat it as all-defaults.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var("ANIMATION_STUDY_ROOT").ok(),
            std::env::var("ANIMATION_OBSERVER_PORT").ok(),
        );
    }

    /// Apply override values. An unparsable port is ignored.
    fn apply_overrides(&mut self, study_root: Option<String>, observer_port: Option<String>) {
        if let Some(root) = study_root.filter(|r| !r.is_empty()) {
            self.study.root = root;
        }
        if let Some(port) = observer_port.and_then(|p| p.parse::<u16>().ok()) {
            self.observer.port = port;
        }
    }
}

/// Study location configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudyConfig {
    /// Study root directory (contains `replications/`).
    #[serde(default = "default_study_root")]
    pub root: String,

    /// Replication to activate at startup. When unset, the lowest
    /// discovered ID is activated.
    #[serde(default)]
    pub initial_replication: Option<u32>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            root: default_study_root(),
            initial_replication: None,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Address to bind.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_study_root() -> String {
    String::from(".")
}

fn default_observer_host() -> String {
    String::from("0.0.0.0")
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    String::from("info")
}
