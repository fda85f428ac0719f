//! Configuration types.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::onboarding::model::settings_keys;

/// Server configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind the HTTP server to.
    pub bind: String,
    /// HTTP port.
    pub port: u16,
    /// libSQL database file. `:memory:` keeps everything in process.
    pub db_path: PathBuf,
    /// Session the single-user server onboards.
    pub session_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            db_path: PathBuf::from("./data/wealth-hub.db"),
            session_id: settings_keys::DEFAULT_SESSION.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from `WEALTH_HUB_*` environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind = lookup("WEALTH_HUB_BIND").unwrap_or(defaults.bind);

        let port: u16 = lookup("WEALTH_HUB_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let db_path = lookup("WEALTH_HUB_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let session_id = lookup("WEALTH_HUB_SESSION_ID")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.session_id);

        Self {
            bind,
            port,
            db_path,
            session_id,
        }
    }

    /// Whether the database should live in memory only.
    pub fn in_memory(&self) -> bool {
        self.db_path.as_os_str() == ":memory:"
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                key: "WEALTH_HUB_BIND".to_string(),
                message: format!("{}: {e}", self.bind),
            })
    }
}
