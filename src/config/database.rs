// ABOUTME: Database configuration for the named-parameter SQL clients
// ABOUTME: Dialect, connection target, pooled vs single-connection mode and pool sizing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::{database, env_vars};
use crate::database_plugins::Dialect;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Connection pool sizing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections kept open
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: database::DEFAULT_MAX_CONNECTIONS,
            min_connections: database::DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: database::DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    /// Load pool sizing from environment (or defaults)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but not a number, or the bounds are inverted
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let config = Self {
            max_connections: parse_env_or(
                env_vars::DB_MAX_CONNECTIONS,
                defaults.max_connections,
            )?,
            min_connections: parse_env_or(
                env_vars::DB_MIN_CONNECTIONS,
                defaults.min_connections,
            )?,
            acquire_timeout_secs: parse_env_or(
                env_vars::DB_ACQUIRE_TIMEOUT_SECS,
                defaults.acquire_timeout_secs,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check pool bounds
    ///
    /// # Errors
    ///
    /// Returns an error if `max_connections` is zero or below `min_connections`
    pub fn validate(&self) -> AppResult<()> {
        if self.max_connections == 0 {
            return Err(AppError::config_invalid(
                "DB_MAX_CONNECTIONS must be at least 1",
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(AppError::config_invalid(format!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

/// Database connection configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQL dialect, which also selects the client variant
    pub dialect: Dialect,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login user
    pub user: String,
    /// Login password
    #[serde(skip_serializing)]
    pub password: String,
    /// Database name
    pub database: String,
    /// `true` for a pool, `false` for one lazily-opened connection
    pub pooled: bool,
    /// Pool sizing, ignored in single-connection mode
    pub pool: PoolConfig,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("pooled", &self.pooled)
            .field("pool", &self.pool)
            .finish()
    }
}

impl DatabaseConfig {
    /// Configuration for `dialect` on its default port with default pool sizing
    #[must_use]
    pub fn new(
        dialect: Dialect,
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            dialect,
            host: host.into(),
            port: dialect.default_port(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            pooled: true,
            pool: PoolConfig::default(),
        }
    }

    /// Load database configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> AppResult<Self> {
        let dialect = match env::var(env_vars::DB_DIALECT) {
            Ok(value) => value.parse::<Dialect>().map_err(AppError::config_invalid)?,
            Err(_) => Dialect::default(),
        };

        Ok(Self {
            dialect,
            host: env_var_or(env_vars::DB_HOST, database::DEFAULT_HOST),
            port: parse_env_or(env_vars::DB_PORT, dialect.default_port())?,
            user: required_env(env_vars::DB_USER)?,
            password: env_var_or(env_vars::DB_PASSWORD, ""),
            database: required_env(env_vars::DB_NAME)?,
            pooled: parse_env_or(env_vars::DB_POOLED, true)?,
            pool: PoolConfig::from_env()?,
        })
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Get a required environment variable
pub(crate) fn required_env(key: &str) -> AppResult<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::config_missing(key)),
    }
}

fn parse_env_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config_invalid(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_dialect_port() {
        let config = DatabaseConfig::new(Dialect::MySql, "db", "app", "secret", "main");
        assert_eq!(config.port, 3306);
        assert!(config.pooled);
        assert_eq!(config.pool, PoolConfig::default());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DatabaseConfig::new(Dialect::Postgres, "db", "app", "hunter2", "main");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_pool_bounds_validation() {
        let inverted = PoolConfig {
            max_connections: 2,
            min_connections: 5,
            acquire_timeout_secs: 1,
        };
        assert!(inverted.validate().is_err());

        let empty = PoolConfig {
            max_connections: 0,
            ..PoolConfig::default()
        };
        assert!(empty.validate().is_err());
    }
}
