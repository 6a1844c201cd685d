//! Service configuration - environment loading
//!
//! Configuration is read once at startup into [`Config`] and handed to the
//! server by value. Handlers never consult the environment.
//!
//! Environment variables:
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`
//! - `DB_CONNECTION_LIMIT`: pool size (default: 100)
//! - `DB_QUEUE_LIMIT`: store calls allowed to wait beyond the pool (default: 0 = unbounded)
//! - `SERVICE_HOST`, `SERVICE_PORT`: listen address (default: 127.0.0.1:3000).
//!   `SERVICE_HOST` is an IP literal or `localhost`; other names are not resolved.
//! - `CORS_PERMISSIVE`: allow any origin (default: false)
//! - `REQUEST_TIMEOUT_SECS`: per-request store deadline (default: 5)
//! - `RATE_LIMIT_ENABLED`, `RATE_LIMIT_MAX_REQUESTS`, `RATE_LIMIT_WINDOW_SECS`

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_CONNECTION_LIMIT: u32 = 100;
const DEFAULT_SERVICE_PORT: u16 = 3000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;
const DEFAULT_RATE_LIMIT_MAX_ENTRIES: usize = 10_000;

/// Configuration error, naming the offending variable
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Full service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    /// `None` disables rate limiting
    pub rate_limit: Option<RateLimitConfig>,
}

/// Relational store connection settings
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub name: String,
    /// Maximum pooled connections
    pub connection_limit: u32,
    /// Store calls allowed to wait for a connection (0 = unbounded)
    pub queue_limit: u32,
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    pub cors_permissive: bool,

    /// Deadline applied to every store call
    pub request_timeout: Duration,
}

/// Per-client request quota
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per client per window
    pub max_requests: u32,
    pub window: Duration,
    /// Maximum number of distinct clients tracked at once
    pub max_entries: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_DB_PORT,
            user: "postgres".to_string(),
            password: None,
            name: "ecohabit".to_string(),
            connection_limit: DEFAULT_CONNECTION_LIMIT,
            queue_limit: 0,
        }
    }
}

// Hand-written so the password never reaches logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("connection_limit", &self.connection_limit)
            .field("queue_limit", &self.queue_limit)
            .finish()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_SERVICE_PORT)),
            cors_permissive: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            max_entries: DEFAULT_RATE_LIMIT_MAX_ENTRIES,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            http: HttpConfig::default(),
            rate_limit: Some(RateLimitConfig::default()),
        }
    }
}

impl Config {
    /// Create config from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup (for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            host: lookup("DB_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "DB_PORT", defaults.port)?,
            user: lookup("DB_USER").unwrap_or(defaults.user),
            password: lookup("DB_PASSWORD").filter(|p| !p.is_empty()),
            name: lookup("DB_NAME").unwrap_or(defaults.name),
            connection_limit: positive(&lookup, "DB_CONNECTION_LIMIT", defaults.connection_limit)?,
            queue_limit: parse_var(&lookup, "DB_QUEUE_LIMIT", defaults.queue_limit)?,
        };

        let host: IpAddr = match lookup("SERVICE_HOST") {
            Some(name) if name.trim().eq_ignore_ascii_case("localhost") => {
                IpAddr::V4(Ipv4Addr::LOCALHOST)
            }
            _ => parse_var(&lookup, "SERVICE_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
        };
        let port: u16 = parse_var(&lookup, "SERVICE_PORT", DEFAULT_SERVICE_PORT)?;
        let timeout_secs = positive(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let http = HttpConfig {
            bind_addr: SocketAddr::new(host, port),
            cors_permissive: parse_bool(&lookup, "CORS_PERMISSIVE", false)?,
            request_timeout: Duration::from_secs(timeout_secs),
        };

        let rate_limit = if parse_bool(&lookup, "RATE_LIMIT_ENABLED", true)? {
            Some(RateLimitConfig {
                max_requests: positive(
                    &lookup,
                    "RATE_LIMIT_MAX_REQUESTS",
                    DEFAULT_RATE_LIMIT_MAX_REQUESTS,
                )?,
                window: Duration::from_secs(positive(
                    &lookup,
                    "RATE_LIMIT_WINDOW_SECS",
                    DEFAULT_RATE_LIMIT_WINDOW_SECS,
                )?),
                max_entries: DEFAULT_RATE_LIMIT_MAX_ENTRIES,
            })
        } else {
            None
        };

        Ok(Self {
            database,
            http,
            rate_limit,
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            value,
            reason: "could not be parsed",
        }),
        None => Ok(default),
    }
}

fn positive<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default + fmt::Display,
{
    let value = parse_var(lookup, var, default)?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "must be greater than zero",
        });
    }
    Ok(value)
}

fn parse_bool<F>(lookup: &F, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var,
                value,
                reason: "expected true or false",
            }),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.connection_limit, 100);
        assert_eq!(config.database.queue_limit, 0);
        assert_eq!(config.http.bind_addr.port(), 3000);
        assert!(!config.http.cors_permissive);
        assert_eq!(config.http.request_timeout, Duration::from_secs(5));

        let rate_limit = config.rate_limit.unwrap();
        assert_eq!(rate_limit.max_requests, 100);
        assert_eq!(rate_limit.window, Duration::from_secs(900));
    }

    #[test]
    fn reads_database_options() {
        let config = config_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "eco"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_NAME", "habits"),
            ("DB_PORT", "6543"),
            ("DB_CONNECTION_LIMIT", "15"),
            ("DB_QUEUE_LIMIT", "30"),
            ("SERVICE_PORT", "8080"),
        ])
        .unwrap();

        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.user, "eco");
        assert_eq!(config.database.password.as_deref(), Some("hunter2"));
        assert_eq!(config.database.name, "habits");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.connection_limit, 15);
        assert_eq!(config.database.queue_limit, 30);
        assert_eq!(config.http.bind_addr.port(), 8080);
    }

    #[test]
    fn rejects_non_numeric_port() {
        let err = config_from(&[("DB_PORT", "five")]).unwrap_err();
        assert!(err.to_string().contains("DB_PORT"));
    }

    #[test]
    fn service_host_accepts_localhost_and_ip_literals() {
        let config = config_from(&[("SERVICE_HOST", "localhost")]).unwrap();
        assert_eq!(config.http.bind_addr.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));

        let config = config_from(&[("SERVICE_HOST", "0.0.0.0")]).unwrap();
        assert_eq!(config.http.bind_addr.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let err = config_from(&[("SERVICE_HOST", "api.example.com")]).unwrap_err();
        assert!(err.to_string().contains("SERVICE_HOST"));
    }

    #[test]
    fn rejects_zero_connection_limit() {
        let err = config_from(&[("DB_CONNECTION_LIMIT", "0")]).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn rate_limit_can_be_disabled() {
        let config = config_from(&[("RATE_LIMIT_ENABLED", "false")]).unwrap();
        assert!(config.rate_limit.is_none());

        assert!(config_from(&[("RATE_LIMIT_ENABLED", "maybe")]).is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let config = config_from(&[("DB_PASSWORD", "hunter2")]).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
