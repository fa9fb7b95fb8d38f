// (c) 2025 Ross Younger

//! Configuration for cubby
//!
//! Sources, later ones overriding earlier: built-in defaults, an optional
//! `cubby.toml` in the platform config directory, `CUBBY_*` environment
//! variables, then command-line flags (applied by the CLI layer).

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use figment::providers::{Env, Format as _, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Resolved settings for either mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Address to bind (server) or connect to (client)
    pub address: String,
    /// TCP port
    pub port: u16,
    /// Server: top-level directory holding every user's files.
    /// Defaults to `cubby/user_files` under the platform data directory.
    pub storage_dir: Option<PathBuf>,
    /// Server: location of the user database.
    /// Defaults to `cubby/users.db` under the platform data directory.
    pub database: Option<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            storage_dir: None,
            database: None,
        }
    }
}

impl Configuration {
    /// Builds the configuration from defaults, file and environment.
    pub fn fetch() -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Configuration::default()));
        if let Some(dir) = dirs::config_dir() {
            figment = figment.merge(Toml::file(dir.join("cubby.toml")));
        }
        figment
            .merge(Env::prefixed("CUBBY_"))
            .extract()
            .with_context(|| "invalid configuration")
    }

    fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cubby")
    }

    /// Storage directory, defaulted if not configured
    pub(crate) fn storage_path(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("user_files"))
    }

    /// User database location, defaulted if not configured
    pub(crate) fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("users.db"))
    }
}
