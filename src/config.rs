//! Server configuration from environment variables.

use crate::error::ConfigError;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/cms";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        })
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub storage: StorageBackend,
    /// Drop and recreate the schema on startup.
    pub reset: bool,
    pub body_limit: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset and blank values take the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(ServerConfig {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: parse_or("BIND_ADDR", get("BIND_ADDR"), || {
                SocketAddr::from(([0, 0, 0, 0], 3000))
            })?,
            max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), || {
                DEFAULT_MAX_CONNECTIONS
            })?,
            storage: parse_or("CMS_STORAGE", get("CMS_STORAGE"), StorageBackend::default)?,
            reset: match get("CMS_RESET") {
                None => false,
                Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid { var: "CMS_RESET", value: v })?,
            },
            body_limit: parse_or("BODY_LIMIT_BYTES", get("BODY_LIMIT_BYTES"), || {
                DEFAULT_BODY_LIMIT_BYTES
            })?,
        })
    }
}

fn parse_or<T: FromStr>(
    var: &'static str,
    value: Option<String>,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default()),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { var, value: v }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = config(&[]).unwrap();
        assert_eq!(c.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(c.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(c.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(c.storage, StorageBackend::Postgres);
        assert!(!c.reset);
        assert_eq!(c.body_limit, DEFAULT_BODY_LIMIT_BYTES);
    }

    #[test]
    fn reads_overrides() {
        let c = config(&[
            ("DATABASE_URL", "postgres://db/other"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("CMS_STORAGE", "Memory"),
            ("CMS_RESET", "yes"),
            ("BODY_LIMIT_BYTES", " 2048 "),
        ])
        .unwrap();
        assert_eq!(c.database_url, "postgres://db/other");
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.max_connections, 12);
        assert_eq!(c.storage, StorageBackend::Memory);
        assert!(c.reset);
        assert_eq!(c.body_limit, 2048);
    }

    #[test]
    fn blank_values_take_defaults() {
        let c = config(&[("CMS_STORAGE", "  "), ("CMS_RESET", "")]).unwrap();
        assert_eq!(c.storage, StorageBackend::Postgres);
        assert!(!c.reset);
    }

    #[test]
    fn rejects_bad_values() {
        for (var, value) in [
            ("BIND_ADDR", "nowhere"),
            ("DB_MAX_CONNECTIONS", "-1"),
            ("CMS_STORAGE", "sqlite"),
            ("CMS_RESET", "maybe"),
            ("BODY_LIMIT_BYTES", "1MB"),
        ] {
            let err = config(&[(var, value)]).unwrap_err();
            let ConfigError::Invalid { var: v, value: got } = err;
            assert_eq!((v, got.as_str()), (var, value));
        }
    }
}
