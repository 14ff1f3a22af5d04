// ABOUTME: Integration tests for environment-driven configuration
// ABOUTME: Defaults, required variables, parse failures and secret redaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use api_starter::config::{DatabaseConfig, TokenConfig};
use api_starter::database_plugins::Dialect;
use api_starter::errors::ErrorCode;
use serial_test::serial;
use std::env;

const DB_VARS: [&str; 10] = [
    "DB_DIALECT",
    "DB_HOST",
    "DB_PORT",
    "DB_USER",
    "DB_PASSWORD",
    "DB_NAME",
    "DB_POOLED",
    "DB_MAX_CONNECTIONS",
    "DB_MIN_CONNECTIONS",
    "DB_ACQUIRE_TIMEOUT_SECS",
];

const JWT_VARS: [(&str, &str); 7] = [
    ("JWT_ISSUER", "api-starter"),
    ("JWT_AUDIENCE", "clients"),
    ("JWT_SUBJECT", "session"),
    ("JWT_ACCESS_SECRET", "access-secret-value"),
    ("JWT_REFRESH_SECRET", "refresh-secret-value"),
    ("JWT_ACCESS_EXPIRES_IN", "15m"),
    ("JWT_REFRESH_EXPIRES_IN", "7d"),
];

fn clear_env() {
    for key in DB_VARS {
        env::remove_var(key);
    }
    for (key, _) in JWT_VARS {
        env::remove_var(key);
    }
}

fn set_required_db_env() {
    env::set_var("DB_USER", "app");
    env::set_var("DB_NAME", "main");
}

fn set_jwt_env() {
    for (key, value) in JWT_VARS {
        env::set_var(key, value);
    }
}

#[test]
#[serial]
fn test_database_defaults() {
    clear_env();
    set_required_db_env();

    let config = DatabaseConfig::from_env().unwrap();
    assert_eq!(config.dialect, Dialect::Postgres);
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 5432);
    assert_eq!(config.password, "");
    assert!(config.pooled);
    assert_eq!(config.pool.max_connections, 10);
    assert_eq!(config.pool.min_connections, 0);
    assert_eq!(config.pool.acquire_timeout_secs, 30);

    clear_env();
}

#[test]
#[serial]
fn test_mysql_dialect_changes_default_port() {
    clear_env();
    set_required_db_env();
    env::set_var("DB_DIALECT", "mysql");
    env::set_var("DB_POOLED", "false");

    let config = DatabaseConfig::from_env().unwrap();
    assert_eq!(config.dialect, Dialect::MySql);
    assert_eq!(config.port, 3306);
    assert!(!config.pooled);

    env::set_var("DB_PORT", "3307");
    assert_eq!(DatabaseConfig::from_env().unwrap().port, 3307);

    clear_env();
}

#[test]
#[serial]
fn test_missing_database_name() {
    clear_env();
    env::set_var("DB_USER", "app");

    let err = DatabaseConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissing);
    assert!(err.message.contains("DB_NAME"));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_values_rejected() {
    clear_env();
    set_required_db_env();

    env::set_var("DB_DIALECT", "oracle");
    assert_eq!(
        DatabaseConfig::from_env().unwrap_err().code,
        ErrorCode::ConfigInvalid
    );

    env::remove_var("DB_DIALECT");
    env::set_var("DB_PORT", "not-a-port");
    assert_eq!(
        DatabaseConfig::from_env().unwrap_err().code,
        ErrorCode::ConfigInvalid
    );

    env::remove_var("DB_PORT");
    env::set_var("DB_MIN_CONNECTIONS", "20");
    assert_eq!(
        DatabaseConfig::from_env().unwrap_err().code,
        ErrorCode::ConfigInvalid
    );

    clear_env();
}

#[test]
#[serial]
fn test_token_config_requires_every_variable() {
    clear_env();
    set_jwt_env();
    assert!(TokenConfig::from_env().is_ok());

    env::remove_var("JWT_REFRESH_SECRET");
    let err = TokenConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissing);
    assert!(err.message.contains("JWT_REFRESH_SECRET"));

    env::set_var("JWT_REFRESH_SECRET", "  ");
    assert!(TokenConfig::from_env().is_err());

    clear_env();
}

#[test]
#[serial]
fn test_debug_output_redacts_secrets() {
    clear_env();
    set_required_db_env();
    set_jwt_env();
    env::set_var("DB_PASSWORD", "hunter2");

    let database = DatabaseConfig::from_env().unwrap();
    let token = TokenConfig::from_env().unwrap();
    let rendered = format!("{database:?} {token:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(!rendered.contains("access-secret-value"));
    assert!(!rendered.contains("refresh-secret-value"));
    assert!(rendered.contains("[REDACTED]"));

    clear_env();
}
