//! Server configuration.
//!
//! Three layers, later wins:
//!
//! 1. Stock defaults (below)
//! 2. An optional `config.toml`
//! 3. Command-line flags / environment (`PORT`)
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! port = 9000
//! uploads_dir = "/var/lib/photo-wall/uploads"
//!
//! [credentials]
//! username = "admin"
//! password = "hunter2"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Fixed login credentials (see [`crate::auth::FixedCredentials`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// SQLite database file.
    pub database: PathBuf,
    /// Directory holding the normalized uploads.
    pub uploads_dir: PathBuf,
    pub credentials: Credentials,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database: PathBuf::from("photos.db"),
            uploads_dir: PathBuf::from("uploads"),
            credentials: Credentials::default(),
        }
    }
}

impl ServerConfig {
    /// Load a config file, or stock defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
