//! Server configuration from environment variables.

use inbox_core::{defaults, Error, Result};

/// Runtime configuration for the API server.
///
/// | Variable | Default |
/// |----------|---------|
/// | `DATABASE_URL` | `postgres://localhost/inbox` |
/// | `HOST` | `0.0.0.0` |
/// | `PORT` | `3000` |
/// | `ALLOWED_ORIGINS` | `http://localhost:3001` (comma-separated) |
/// | `DB_MAX_CONNECTIONS` | `10` |
/// | `MAX_BODY_SIZE_BYTES` | `1048576` |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub db_max_connections: u32,
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: defaults::DATABASE_URL.to_string(),
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            allowed_origins: parse_allowed_origins(defaults::ALLOWED_ORIGINS),
            db_max_connections: defaults::DB_MAX_CONNECTIONS,
            max_body_size: defaults::MAX_BODY_SIZE_BYTES,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base = Self::default();
        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(base.database_url),
            host: lookup("HOST").unwrap_or(base.host),
            port: parse_var(&lookup, "PORT", base.port)?,
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|raw| parse_allowed_origins(&raw))
                .filter(|origins| !origins.is_empty())
                .unwrap_or(base.allowed_origins),
            db_max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS", base.db_max_connections)?,
            max_body_size: parse_var(&lookup, "MAX_BODY_SIZE_BYTES", base.max_body_size)?,
        })
    }

    /// `host:port` bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has invalid value '{}'", key, raw))),
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_allowed_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, "postgres://localhost/inbox");
        assert_eq!(config.allowed_origins, vec!["http://localhost:3001"]);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("ALLOWED_ORIGINS", "https://app.example.com, http://localhost:3001 ,"),
            ("DB_MAX_CONNECTIONS", "4"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(
            config.allowed_origins,
            vec!["https://app.example.com", "http://localhost:3001"]
        );
        assert_eq!(config.db_max_connections, 4);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("PORT")));
    }

    #[test]
    fn test_blank_origins_fall_back_to_default() {
        let config = ServerConfig::from_lookup(lookup_from(&[("ALLOWED_ORIGINS", " , ")])).unwrap();
        assert_eq!(config.allowed_origins, vec!["http://localhost:3001"]);
    }
}
