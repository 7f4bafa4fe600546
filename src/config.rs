use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ListsError;

/// Which persistence backend the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// SQLite file on local disk, flushed after every mutation.
    #[default]
    Embedded,
    /// Managed PostgreSQL reached over the network.
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub listen_addr: String,
    pub loglevel: String,
    #[serde(flatten)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub db_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            loglevel: "info".to_string(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Embedded,
            db_path: PathBuf::from("data/usernames.db"),
            database_url: None,
            max_connections: 5,
        }
    }
}

impl Config {
    /// Defaults overlaid with `USERLISTS_*` environment variables.
    pub fn load() -> Result<Self, ListsError> {
        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed("USERLISTS_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_embedded_backend() {
        let cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .extract()
            .expect("defaults should extract");
        assert_eq!(cfg.database.backend, Backend::Embedded);
        assert_eq!(cfg.database.db_path, PathBuf::from("data/usernames.db"));
        assert!(cfg.database.database_url.is_none());
        assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    }

    #[test]
    fn overrides_pick_remote_backend() {
        let cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Serialized::default("backend", "remote"))
            .merge(Serialized::default(
                "database_url",
                "postgres://localhost/userlists",
            ))
            .extract()
            .expect("overrides should extract");
        assert_eq!(cfg.database.backend, Backend::Remote);
        assert_eq!(
            cfg.database.database_url.as_deref(),
            Some("postgres://localhost/userlists")
        );
    }
}
