// ABOUTME: MySQL named-parameter client using inline escaped literals
// ABOUTME: Supports a single lazily-opened connection or a sqlx pool
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! MySQL client
//!
//! Placeholders are replaced by escaped literals, following the escaping rules of the
//! classic MySQL client libraries. This is strictly less safe than the positional
//! binding the Postgres client uses: a gap in the escaping routine becomes an
//! injection vector. Prefer the Postgres dialect for untrusted input where you can.

use super::named_params::{scan, BoundQuery, Params, Segment, SqlValue};
use super::rows::{mysql_row, Row};
use super::validation::StatementAdvisory;
use super::{Dialect, SqlClient};
use crate::config::database::DatabaseConfig;
use api_starter_core::errors::DatabaseError;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::Connection;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Escape a value into a MySQL literal
///
/// Strings are single-quoted with `\0`, `\b`, `\t`, `\n`, `\r`, `\x1a`, `"`, `'` and
/// `\` backslash-escaped. Non-finite floats have no SQL literal and become `NULL`.
#[must_use]
pub fn escape_literal(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_owned(),
        SqlValue::Bool(b) => b.to_string(),
        SqlValue::Int(i) => i.to_string(),
        SqlValue::Float(f) if f.is_finite() => f.to_string(),
        SqlValue::Float(_) => "NULL".to_owned(),
        SqlValue::Text(s) => escape_string(s),
        SqlValue::Timestamp(t) => format!("'{}'", t.format("%Y-%m-%d %H:%M:%S%.3f")),
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Replace every known placeholder with its escaped literal
#[must_use]
pub fn bind_inline(template: &str, params: &Params) -> BoundQuery {
    if params.is_empty() {
        return BoundQuery::raw(template);
    }

    let mut sql = String::with_capacity(template.len());
    for segment in scan(template) {
        match segment {
            Segment::Literal(text) => sql.push_str(text),
            Segment::Placeholder(name) => match params.get(name) {
                Some(value) => sql.push_str(&escape_literal(value)),
                None => {
                    let _ = write!(sql, ":{name}");
                }
            },
        }
    }
    debug!("bound MySQL template with inline escaped literals");
    BoundQuery::raw(sql)
}

enum Backend {
    Pool(MySqlPool),
    Single {
        options: MySqlConnectOptions,
        connection: Mutex<Option<MySqlConnection>>,
    },
}

/// Named-parameter client for MySQL
pub struct MySqlClient {
    backend: Backend,
    closed: AtomicBool,
}

impl MySqlClient {
    /// Build a client from configuration
    ///
    /// No connection is made here. The pool connects on first borrow and the
    /// single-connection mode connects on first `execute`.
    #[must_use]
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let backend = if config.pooled {
            info!(
                host = %config.host,
                database = %config.database,
                max_connections = config.pool.max_connections,
                "Creating MySQL connection pool"
            );
            let pool = MySqlPoolOptions::new()
                .max_connections(config.pool.max_connections)
                .min_connections(config.pool.min_connections)
                .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_secs))
                .connect_lazy_with(options);
            Backend::Pool(pool)
        } else {
            Backend::Single {
                options,
                connection: Mutex::new(None),
            }
        };

        Self {
            backend,
            closed: AtomicBool::new(false),
        }
    }

    /// Whether this client borrows from a pool
    #[must_use]
    pub const fn is_pooled(&self) -> bool {
        matches!(self.backend, Backend::Pool(_))
    }
}

#[async_trait]
impl SqlClient for MySqlClient {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn bind(&self, template: &str, params: &Params) -> BoundQuery {
        Dialect::MySql.bind(template, params)
    }

    fn validate(&self, template: &str) -> Result<Vec<StatementAdvisory>, DatabaseError> {
        Dialect::MySql.validate(template)
    }

    async fn execute(&self, query: &BoundQuery) -> Result<Vec<Row>, DatabaseError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DatabaseError::closed());
        }

        let rows = match &self.backend {
            Backend::Pool(pool) => sqlx::query(&query.sql).fetch_all(pool).await?,
            Backend::Single {
                options,
                connection,
            } => {
                let mut guard = connection.lock().await;
                if self.closed.load(Ordering::Acquire) {
                    return Err(DatabaseError::closed());
                }
                if guard.is_none() {
                    debug!("Opening MySQL connection");
                    *guard = Some(MySqlConnection::connect_with(options).await?);
                }
                let Some(conn) = guard.as_mut() else {
                    return Err(DatabaseError::closed());
                };
                sqlx::query(&query.sql).fetch_all(&mut *conn).await?
            }
        };

        Ok(rows.iter().map(mysql_row).collect())
    }

    async fn close(&self) -> Result<(), DatabaseError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        match &self.backend {
            Backend::Pool(pool) => {
                pool.close().await;
                info!("MySQL connection pool closed");
            }
            Backend::Single { connection, .. } => {
                if let Some(conn) = connection.lock().await.take() {
                    conn.close().await?;
                    info!("MySQL connection closed");
                }
            }
        }
        Ok(())
    }
}
