// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging plus token and database configuration fixtures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `api_starter`

use api_starter::config::{DatabaseConfig, PoolConfig, TokenConfig};
use api_starter::database_plugins::Dialect;
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level, WARN keeps test output quiet
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Token configuration with fixed test secrets
pub fn test_token_config() -> TokenConfig {
    TokenConfig {
        issuer: "api-starter-tests".into(),
        audience: "api-starter-clients".into(),
        subject: "session".into(),
        access_secret: "test-access-secret-0123456789".into(),
        refresh_secret: "test-refresh-secret-9876543210".into(),
        access_lifetime: "15m".into(),
        refresh_lifetime: "7d".into(),
    }
}

/// Database configuration pointing at a port nothing listens on
pub fn unreachable_database_config(dialect: Dialect, pooled: bool) -> DatabaseConfig {
    let mut config = DatabaseConfig::new(dialect, "127.0.0.1", "tester", "secret", "app");
    config.port = 1;
    config.pooled = pooled;
    config.pool = PoolConfig {
        max_connections: 2,
        min_connections: 0,
        acquire_timeout_secs: 2,
    };
    config
}

/// Non-pooled configuration parsed from a connection URL in `var`
///
/// Returns `None` when the variable is unset so live tests can skip. The scheme
/// picks the dialect (`postgres://` or `mysql://`); the password is used as written.
pub fn live_database_config(var: &str) -> Option<DatabaseConfig> {
    let raw = std::env::var(var).ok().filter(|v| !v.trim().is_empty())?;
    let url = url::Url::parse(&raw).unwrap_or_else(|e| panic!("{var} is not a valid URL: {e}"));

    let dialect = match url.scheme() {
        "postgres" | "postgresql" => Dialect::Postgres,
        "mysql" | "mariadb" => Dialect::MySql,
        other => panic!("{var} has unsupported scheme {other}"),
    };
    let mut config = DatabaseConfig::new(
        dialect,
        url.host_str().unwrap_or("localhost"),
        url.username(),
        url.password().unwrap_or_default(),
        url.path().trim_start_matches('/'),
    );
    if let Some(port) = url.port() {
        config.port = port;
    }
    config.pooled = false;
    Some(config)
}
