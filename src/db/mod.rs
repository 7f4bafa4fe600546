//! Database module: models, schema and the two storage backends.
//!
//! Layout:
//! - `models.rs`: entry types and list/stat value types
//! - `schema.rs`: SQL DDL for SQLite and PostgreSQL
//! - `store.rs`: the `UsernameStore` trait the handlers talk to
//! - `sqlite.rs` / `postgres.rs`: embedded and remote implementations

pub mod models;
pub mod postgres;
pub mod schema;
pub mod sqlite;
pub mod store;

use std::sync::Arc;

use tracing::info;

use crate::config::{Backend, DatabaseConfig};
use crate::error::ListsError;

pub use models::{EntryPatch, ListStats, ListType, NewEntry, UsernameEntry};
pub use postgres::RemoteStore;
pub use sqlite::{EmbeddedStore, SqlitePool};
pub use store::UsernameStore;

/// Open the configured backend and make sure the schema exists.
pub async fn connect(cfg: &DatabaseConfig) -> Result<Arc<dyn UsernameStore>, ListsError> {
    let store: Arc<dyn UsernameStore> = match cfg.backend {
        Backend::Embedded => Arc::new(EmbeddedStore::open(&cfg.db_path, cfg.max_connections).await?),
        Backend::Remote => {
            let url = cfg.database_url.as_deref().ok_or_else(|| {
                ListsError::InvalidConfig(
                    "remote backend selected but USERLISTS_DATABASE_URL is not set".to_string(),
                )
            })?;
            Arc::new(RemoteStore::connect(url, cfg.max_connections).await?)
        }
    };
    store.init_schema().await?;
    info!(backend = store.backend(), "database ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn remote_without_url_is_a_config_error() {
        let cfg = DatabaseConfig {
            backend: Backend::Remote,
            database_url: None,
            ..DatabaseConfig::default()
        };
        let err = connect(&cfg).await.err().expect("connect should fail");
        assert!(matches!(err, ListsError::InvalidConfig(_)), "got {err:?}");
    }
}
