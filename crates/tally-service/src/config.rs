//! Server configuration.
//!
//! Read once at startup from a TOML file with a `[server]` and a `[storage]`
//! section. Both are optional; anything left out falls back to its default.
//! Command-line overrides are applied by the binary before [`Config::validate`]
//! runs.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load `server.toml` from the user config directory, or defaults if it
    /// does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every section, reporting all problems at once.
    ///
    /// ```
    /// use tally_service::Config;
    ///
    /// assert!(Config::default().validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors: Vec<ValidationError> = [
            self.server.socket_addr().err(),
            self.storage.validate().err(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address as `ip:port`.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
        }
    }
}

impl ServerConfig {
    /// The listen address. Port 0 is refused so the service always comes up
    /// on a predictable port.
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        match self.bind.parse::<SocketAddr>() {
            Ok(addr) if addr.port() == 0 => {
                Err(ValidationError::new("server.bind", "port cannot be 0"))
            }
            Ok(addr) => Ok(addr),
            Err(_) => Err(ValidationError::new(
                "server.bind",
                format!("'{}' is not an ip:port address", self.bind),
            )),
        }
    }
}

/// Where the aggregate lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Store file; created with empty mappings on first open.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: tally_store::default_store_path(),
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::new("storage.path", "store path cannot be empty"));
        }
        if self.path.is_dir() {
            return Err(ValidationError::new(
                "storage.path",
                format!("{} is a directory", self.path.display()),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid configuration:{}", list_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// One rejected setting.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted key, e.g. `server.bind`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn list_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| format!("\n  - {e}")).collect()
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tally")
        .join("server.toml")
}
