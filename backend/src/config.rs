//! Environment-driven configuration.
//!
//! Every setting has a default except the static directory and the admin
//! credentials. A value that is present but cannot be parsed is an error.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:colibri.db";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 86_400;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid { var: &'static str, value: String, reason: String },

    #[error("{0} must be set together with {1}")]
    Incomplete(&'static str, &'static str),
}

/// Credentials for the first account, created when no account exists
#[derive(Debug, Clone, PartialEq)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub database_url: String,
    pub allowed_origin: String,
    pub static_dir: Option<PathBuf>,
    pub session_ttl_seconds: i64,
    pub admin: Option<AdminCredentials>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            static_dir: None,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            admin: None,
        }
    }
}

impl AppConfig {
    /// Read `COLIBRI_*` variables from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let addr = match read("COLIBRI_ADDR") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                var: "COLIBRI_ADDR",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };

        let allowed_origin = read("COLIBRI_ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());
        if axum::http::HeaderValue::from_str(&allowed_origin).is_err() {
            return Err(ConfigError::Invalid {
                var: "COLIBRI_ALLOWED_ORIGIN",
                value: allowed_origin,
                reason: "not a valid header value".to_string(),
            });
        }

        let session_ttl_seconds = match read("COLIBRI_SESSION_TTL_SECONDS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(secs) if secs > 0 => secs,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        var: "COLIBRI_SESSION_TTL_SECONDS",
                        value: raw,
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "COLIBRI_SESSION_TTL_SECONDS",
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_SESSION_TTL_SECONDS,
        };

        let admin = match (read("COLIBRI_ADMIN_EMAIL"), lookup("COLIBRI_ADMIN_PASSWORD").filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => Some(AdminCredentials { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Incomplete("COLIBRI_ADMIN_EMAIL", "COLIBRI_ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Incomplete("COLIBRI_ADMIN_PASSWORD", "COLIBRI_ADMIN_EMAIL")),
        };

        Ok(Self {
            addr,
            database_url: read("COLIBRI_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            allowed_origin,
            static_dir: read("COLIBRI_STATIC_DIR").map(PathBuf::from),
            session_ttl_seconds,
            admin,
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|var| env.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.session_ttl().num_seconds(), 86_400);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("COLIBRI_ADDR", "0.0.0.0:8000"),
            ("COLIBRI_DATABASE_URL", "sqlite:/var/lib/colibri/data.db"),
            ("COLIBRI_STATIC_DIR", "/srv/colibri"),
            ("COLIBRI_SESSION_TTL_SECONDS", "3600"),
            ("COLIBRI_ADMIN_EMAIL", "admin@colibri.mx"),
            ("COLIBRI_ADMIN_PASSWORD", "sendadelcolibri"),
        ])
        .unwrap();

        assert_eq!(config.addr.port(), 8000);
        assert_eq!(config.database_url, "sqlite:/var/lib/colibri/data.db");
        assert_eq!(config.static_dir, Some(PathBuf::from("/srv/colibri")));
        assert_eq!(config.session_ttl_seconds, 3600);
        assert_eq!(config.admin.map(|a| a.email), Some("admin@colibri.mx".to_string()));
    }

    #[test]
    fn test_unparsable_values_are_errors() {
        assert!(matches!(config(&[("COLIBRI_ADDR", "localhost")]), Err(ConfigError::Invalid { .. })));
        assert!(matches!(
            config(&[("COLIBRI_SESSION_TTL_SECONDS", "un día")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(config(&[("COLIBRI_SESSION_TTL_SECONDS", "0")]), Err(ConfigError::Invalid { .. })));
        assert_eq!(
            config(&[("COLIBRI_ADMIN_EMAIL", "admin@colibri.mx")]),
            Err(ConfigError::Incomplete("COLIBRI_ADMIN_EMAIL", "COLIBRI_ADMIN_PASSWORD"))
        );
    }
}
