//! Server configuration.
//!
//! All configuration is loaded from environment variables. The server
//! needs to know where `PostgreSQL` lives, who the administrator is, and
//! optionally how to bound conflict retries.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::time::Duration;

use voteapi_db::{PostgresConfig, RetryPolicy};

/// Default bind address: every interface, port 8080.
pub const DEFAULT_LISTEN: &str = "[::]:8080";

/// Default number of pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("env var missing: {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Parser message.
        reason: String,
    },
}

/// Complete server configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address the HTTP server binds to.
    pub listen: SocketAddr,
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Admin basic-auth user name.
    pub admin_name: String,
    /// Admin basic-auth password.
    pub admin_password: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Serialization conflict retry policy.
    pub retry: RetryPolicy,
}

impl ApiConfig {
    /// Load configuration from the process environment.
    ///
    /// Required variables:
    /// - `VOTEAPI_DB` -- `PostgreSQL` connection URL
    /// - `VOTEAPI_ADMIN_NAME` -- admin user name
    /// - `VOTEAPI_ADMIN_PASSWORD` -- admin password
    ///
    /// Optional variables:
    /// - `VOTEAPI_LISTEN` -- bind address (default `[::]:8080`)
    /// - `VOTEAPI_DB_MAX_CONNECTIONS` -- pool size (default 10)
    /// - `VOTEAPI_TX_MAX_ATTEMPTS` -- retry ceiling (default unbounded)
    /// - `VOTEAPI_TX_BACKOFF_MS` -- pause between retries (default 0)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let database_url = var("VOTEAPI_DB").ok_or(ConfigError::Missing("VOTEAPI_DB"))?;
        let admin_name =
            var("VOTEAPI_ADMIN_NAME").ok_or(ConfigError::Missing("VOTEAPI_ADMIN_NAME"))?;
        let admin_password =
            var("VOTEAPI_ADMIN_PASSWORD").ok_or(ConfigError::Missing("VOTEAPI_ADMIN_PASSWORD"))?;

        let listen: SocketAddr = parse(
            "VOTEAPI_LISTEN",
            var("VOTEAPI_LISTEN").as_deref().unwrap_or(DEFAULT_LISTEN),
        )?;

        let max_connections: u32 = match var("VOTEAPI_DB_MAX_CONNECTIONS") {
            Some(raw) => parse("VOTEAPI_DB_MAX_CONNECTIONS", &raw)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let mut retry = RetryPolicy::unbounded();
        if let Some(raw) = var("VOTEAPI_TX_MAX_ATTEMPTS") {
            let max: NonZeroU32 = parse("VOTEAPI_TX_MAX_ATTEMPTS", &raw)?;
            retry = retry.with_max_attempts(max);
        }
        if let Some(raw) = var("VOTEAPI_TX_BACKOFF_MS") {
            let millis: u64 = parse("VOTEAPI_TX_BACKOFF_MS", &raw)?;
            retry = retry.with_backoff(Duration::from_millis(millis));
        }

        Ok(Self {
            listen,
            database_url,
            admin_name,
            admin_password,
            max_connections,
            retry,
        })
    }

    /// Pool settings derived from this configuration.
    pub fn postgres(&self) -> PostgresConfig {
        PostgresConfig::new(&self.database_url).with_max_connections(self.max_connections)
    }
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("listen", &self.listen)
            .field("admin_name", &self.admin_name)
            .field("max_connections", &self.max_connections)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("VOTEAPI_DB", "postgres://localhost/voteapi"),
        ("VOTEAPI_ADMIN_NAME", "admin"),
        ("VOTEAPI_ADMIN_PASSWORD", "hunter2"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_are_unset() {
        let config = ApiConfig::from_lookup(lookup_from(REQUIRED)).unwrap();
        assert_eq!(config.listen, DEFAULT_LISTEN.parse().unwrap());
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.retry, RetryPolicy::unbounded());
        assert_eq!(config.admin_name, "admin");
    }

    #[test]
    fn missing_required_var_is_reported_by_name() {
        let err = ApiConfig::from_lookup(lookup_from(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("VOTEAPI_ADMIN_PASSWORD")));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("VOTEAPI_DB", "");
        let err = ApiConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("VOTEAPI_DB")));
    }

    #[test]
    fn optional_vars_override_defaults() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("VOTEAPI_LISTEN", "127.0.0.1:9000"),
            ("VOTEAPI_DB_MAX_CONNECTIONS", "4"),
            ("VOTEAPI_TX_MAX_ATTEMPTS", "5"),
            ("VOTEAPI_TX_BACKOFF_MS", "20"),
        ]);
        let config = ApiConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.listen, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.retry.max_attempts, NonZeroU32::new(5));
        assert_eq!(config.retry.backoff, Duration::from_millis(20));
        assert_eq!(config.postgres().max_connections, 4);
    }

    #[test]
    fn zero_attempts_is_invalid() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("VOTEAPI_TX_MAX_ATTEMPTS", "0"));
        let err = ApiConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "VOTEAPI_TX_MAX_ATTEMPTS",
                ..
            }
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = ApiConfig::from_lookup(lookup_from(REQUIRED)).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("postgres://"));
    }
}
