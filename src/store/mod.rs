//! Persistence layer — where completed profiles are handed off.

pub mod libsql_backend;
pub mod memory;
mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlProfileStore;
pub use memory::MemoryProfileStore;
pub use traits::ProfileStore;

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::{ConfigError, Result};

/// Open the profile store the server is configured for: in memory for
/// `:memory:`, a local libSQL file otherwise.
pub async fn open(config: &ServerConfig) -> Result<Arc<dyn ProfileStore>> {
    if config.db_path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "WEALTH_HUB_DB_PATH".to_string(),
            message: "path is empty".to_string(),
        }
        .into());
    }

    let store = if config.in_memory() {
        LibSqlProfileStore::new_memory().await?
    } else {
        LibSqlProfileStore::new_local(&config.db_path).await?
    };
    Ok(Arc::new(store))
}
