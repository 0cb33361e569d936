// src/config.rs
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
pub struct ConfigError {
    pub var: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.var, self.message)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub sender_email: String,
    pub sender_name: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub schema_path: String,
    pub bind_addr: SocketAddr,
    pub max_workers: usize,
    pub public_url: String,
    pub cache_ttl: Duration,
    pub log_level: String,
    pub mail: MailConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("laundry.sqlite3"),
            schema_path: "sql/schema.sql".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_workers: 8,
            public_url: "http://127.0.0.1:3000".to_string(),
            cache_ttl: Duration::from_secs(300),
            log_level: "info".to_string(),
            mail: MailConfig {
                api_key: None,
                sender_email: "no-reply@laundryfinder.local".to_string(),
                sender_name: "Laundry Finder".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match get("LAUNDRY_BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|e| ConfigError {
                var: "LAUNDRY_BIND_ADDR",
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.bind_addr,
        };

        let max_workers = match get("LAUNDRY_MAX_WORKERS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError {
                        var: "LAUNDRY_MAX_WORKERS",
                        message: format!("{raw:?} is not a positive integer"),
                    })
                }
            },
            None => defaults.max_workers,
        };

        let cache_ttl = match get("LAUNDRY_CACHE_TTL_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|_| ConfigError {
                var: "LAUNDRY_CACHE_TTL_SECS",
                message: format!("{raw:?} is not a number of seconds"),
            })?),
            None => defaults.cache_ttl,
        };

        let public_url = get("LAUNDRY_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://{bind_addr}"))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            db_path: get("LAUNDRY_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            schema_path: get("LAUNDRY_SCHEMA_PATH").unwrap_or(defaults.schema_path),
            bind_addr,
            max_workers,
            public_url,
            cache_ttl,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            mail: MailConfig {
                api_key: get("BREVO_API_KEY"),
                sender_email: get("MAIL_SENDER_EMAIL").unwrap_or(defaults.mail.sender_email),
                sender_name: get("MAIL_SENDER_NAME").unwrap_or(defaults.mail.sender_name),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("laundry.sqlite3"));
        assert_eq!(cfg.max_workers, 8);
        assert_eq!(cfg.cache_ttl, Duration::from_secs(300));
        assert_eq!(cfg.public_url, "http://127.0.0.1:3000");
        assert!(cfg.mail.api_key.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("LAUNDRY_BIND_ADDR", "0.0.0.0:8080"),
            ("LAUNDRY_MAX_WORKERS", "2"),
            ("LAUNDRY_PUBLIC_URL", "https://laundry.example/"),
            ("BREVO_API_KEY", "key"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.max_workers, 2);
        assert_eq!(cfg.public_url, "https://laundry.example");
        assert_eq!(cfg.mail.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("LAUNDRY_MAX_WORKERS", "0")])).unwrap_err();
        assert_eq!(err.var, "LAUNDRY_MAX_WORKERS");
        assert!(AppConfig::from_lookup(lookup(&[("LAUNDRY_CACHE_TTL_SECS", "soon")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("LAUNDRY_BIND_ADDR", "nowhere")])).is_err());
    }
}
