// ABOUTME: PostgreSQL named-parameter client using $n positional markers
// ABOUTME: Values never enter the query text; they are bound through the driver
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! PostgreSQL client
//!
//! Each distinct identifier gets the next `$n` marker on first sighting, repeats reuse
//! it, and the value list is emitted in marker order. At execution each value is
//! converted to the type the server infers for its marker (see [`super::pg_params`]).

use super::named_params::{scan, BoundQuery, Params, Segment};
use super::pg_params::coerce_all;
use super::rows::{postgres_row, Row};
use super::validation::StatementAdvisory;
use super::{Dialect, SqlClient};
use crate::config::database::DatabaseConfig;
use api_starter_core::errors::DatabaseError;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions, PgRow};
use sqlx::{Connection, Either, Executor, Statement};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Rewrite known placeholders into `$n` markers and collect their values
#[must_use]
pub fn bind_positional(template: &str, params: &Params) -> BoundQuery {
    if params.is_empty() {
        return BoundQuery::raw(template);
    }

    let mut sql = String::with_capacity(template.len());
    let mut markers: HashMap<&str, usize> = HashMap::new();
    let mut values = Vec::new();

    for segment in scan(template) {
        match segment {
            Segment::Literal(text) => sql.push_str(text),
            Segment::Placeholder(name) => match params.get(name) {
                Some(value) => {
                    let marker = *markers.entry(name).or_insert_with(|| {
                        values.push(value.clone());
                        values.len()
                    });
                    let _ = write!(sql, "${marker}");
                }
                None => {
                    let _ = write!(sql, ":{name}");
                }
            },
        }
    }

    BoundQuery { sql, values }
}

/// Describe the statement, convert values to the inferred types, then run it
///
/// The describe and the execution share one connection, so the second round trip
/// reuses the statement the first one cached.
async fn run(conn: &mut PgConnection, bound: &BoundQuery) -> Result<Vec<PgRow>, sqlx::Error> {
    if bound.values.is_empty() {
        return sqlx::query(&bound.sql).fetch_all(conn).await;
    }

    let statement = Executor::prepare(&mut *conn, bound.sql.as_str()).await?;
    let inferred = match statement.parameters() {
        Some(Either::Left(types)) => types,
        _ => &[],
    };
    let params = coerce_all(&bound.values, inferred)?;

    params
        .into_iter()
        .fold(sqlx::query(&bound.sql), |query, param| param.bind_to(query))
        .fetch_all(conn)
        .await
}

enum Backend {
    Pool(PgPool),
    Single {
        options: PgConnectOptions,
        connection: Mutex<Option<PgConnection>>,
    },
}

/// Named-parameter client for PostgreSQL
pub struct PostgresClient {
    backend: Backend,
    closed: AtomicBool,
}

impl PostgresClient {
    /// Build a client from configuration
    ///
    /// No connection is made here. The pool connects on first borrow and the
    /// single-connection mode connects on first `execute`.
    #[must_use]
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
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
                "Creating PostgreSQL connection pool"
            );
            let pool = PgPoolOptions::new()
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
impl SqlClient for PostgresClient {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn bind(&self, template: &str, params: &Params) -> BoundQuery {
        Dialect::Postgres.bind(template, params)
    }

    fn validate(&self, template: &str) -> Result<Vec<StatementAdvisory>, DatabaseError> {
        Dialect::Postgres.validate(template)
    }

    async fn execute(&self, query: &BoundQuery) -> Result<Vec<Row>, DatabaseError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DatabaseError::closed());
        }

        let rows = match &self.backend {
            Backend::Pool(pool) => {
                let mut conn = pool.acquire().await?;
                run(&mut conn, query).await?
            }
            Backend::Single {
                options,
                connection,
            } => {
                let mut guard = connection.lock().await;
                if self.closed.load(Ordering::Acquire) {
                    return Err(DatabaseError::closed());
                }
                if guard.is_none() {
                    debug!("Opening PostgreSQL connection");
                    *guard = Some(PgConnection::connect_with(options).await?);
                }
                let Some(conn) = guard.as_mut() else {
                    return Err(DatabaseError::closed());
                };
                run(conn, query).await?
            }
        };

        Ok(rows.iter().map(postgres_row).collect())
    }

    async fn close(&self) -> Result<(), DatabaseError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        match &self.backend {
            Backend::Pool(pool) => {
                pool.close().await;
                info!("PostgreSQL connection pool closed");
            }
            Backend::Single { connection, .. } => {
                if let Some(conn) = connection.lock().await.take() {
                    conn.close().await?;
                    info!("PostgreSQL connection closed");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database_plugins::named_params::SqlValue;

    #[test]
    fn test_distinct_identifiers_get_sequential_markers() {
        let params = Params::new().with("a", 1).with("b", "two");
        let bound = bind_positional("SELECT * FROM t WHERE x = :b AND y = :a", &params);
        assert_eq!(bound.sql, "SELECT * FROM t WHERE x = $1 AND y = $2");
        assert_eq!(
            bound.values,
            vec![SqlValue::Text("two".into()), SqlValue::Int(1)]
        );
    }

    #[test]
    fn test_repeated_identifier_reuses_marker() {
        let params = Params::new().with("id", 9).with("flag", true);
        let bound = bind_positional(
            "SELECT * FROM t WHERE id = :id OR parent_id = :id AND active = :flag",
            &params,
        );
        assert_eq!(
            bound.sql,
            "SELECT * FROM t WHERE id = $1 OR parent_id = $1 AND active = $2"
        );
        assert_eq!(bound.values, vec![SqlValue::Int(9), SqlValue::Bool(true)]);
    }

    #[test]
    fn test_unknown_identifier_does_not_consume_marker() {
        let params = Params::new().with("b", 2);
        let bound = bind_positional("VALUES (:a, :b, :a)", &params);
        assert_eq!(bound.sql, "VALUES (:a, $1, :a)");
        assert_eq!(bound.values, vec![SqlValue::Int(2)]);
    }

    #[test]
    fn test_values_never_enter_query_text() {
        let params = Params::new().with("name", "'; DROP TABLE users; --");
        let bound = bind_positional("SELECT * FROM users WHERE name = :name", &params);
        assert!(!bound.sql.contains("DROP"));
        assert_eq!(bound.sql, "SELECT * FROM users WHERE name = $1");
    }
}
