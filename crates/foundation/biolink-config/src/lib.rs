//! # biolink config
//!
//! Settings are resolved in three layers: built-in defaults, then a YAML
//! file, then environment variables.
//!
//! ```yaml
//! server:
//!   bind: 0.0.0.0:8080
//! storage:
//!   data_dir: /var/lib/biolink
//! copy:
//!   model: gemini-3-flash-preview
//! defaults:
//!   bio: Welcome to my page
//!   whatsapp_number: "+62 812 3456 7890"
//! log:
//!   filter: biolink=debug
//!   json: true
//! ```

use std::path::{Path, PathBuf};

use biolink_core::PageDefaults;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LOG_FILTER: &str = "biolink=info,tower_http=info";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub copy: CopyConfig,
    pub defaults: PageDefaults,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON document per collection
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Generative copy service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl CopyConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset
    pub filter: String,
    /// One JSON object per line instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
        }
    }
}

/// `<data_dir>/biolink`, or `./biolink-data` when the platform has none
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("biolink"))
        .unwrap_or_else(|| PathBuf::from("biolink-data"))
}

/// `<config_dir>/biolink/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("biolink").join("config.yaml"))
}

impl Config {
    /// Resolve the full configuration.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// used if a file is there. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Apply `BIOLINK_*` and API key variables from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any lookup. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get("BIOLINK_BIND") {
            self.server.bind = bind;
        }
        if let Some(dir) = get("BIOLINK_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(filter) = get("BIOLINK_LOG") {
            self.log.filter = filter;
        }
        if let Some(format) = get("BIOLINK_LOG_FORMAT") {
            self.log.json = format.eq_ignore_ascii_case("json");
        }
        if let Some(key) = get("GEMINI_API_KEY").or_else(|| get("API_KEY")) {
            self.copy.api_key = Some(key);
        }
        if let Some(model) = get("BIOLINK_COPY_MODEL") {
            self.copy.model = model;
        }
        if let Some(endpoint) = get("BIOLINK_COPY_ENDPOINT") {
            self.copy.endpoint = endpoint;
        }
    }
}
