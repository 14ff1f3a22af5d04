// ABOUTME: Database factory selecting the SQL client variant from configuration
// ABOUTME: The Database enum delegates every SqlClient call to the chosen dialect
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Database factory for creating SQL clients
//!
//! The dialect is fixed at construction time from [`DatabaseConfig`].

use super::mysql::MySqlClient;
use super::postgres::PostgresClient;
use super::{BoundQuery, Dialect, Params, Row, SqlClient, StatementAdvisory};
use crate::config::database::DatabaseConfig;
use api_starter_core::errors::DatabaseError;
use async_trait::async_trait;
use tracing::info;

/// Database instance wrapper that delegates to the appropriate implementation
pub enum Database {
    /// MySQL client, inline escaped literals
    MySql(MySqlClient),
    /// PostgreSQL client, positional markers
    Postgres(PostgresClient),
}

impl Database {
    /// Create the client for the configured dialect
    ///
    /// Connections are opened lazily, so this never touches the network.
    #[must_use]
    pub fn new(config: &DatabaseConfig) -> Self {
        info!(
            dialect = %config.dialect,
            pooled = config.pooled,
            "Initializing SQL client"
        );
        match config.dialect {
            Dialect::MySql => Self::MySql(MySqlClient::new(config)),
            Dialect::Postgres => Self::Postgres(PostgresClient::new(config)),
        }
    }

    /// Get a descriptive string for the current database backend
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::MySql(_) => "MySQL (inline escaped parameters)",
            Self::Postgres(_) => "PostgreSQL (positional parameters)",
        }
    }

    /// Whether the active client borrows from a pool
    #[must_use]
    pub const fn is_pooled(&self) -> bool {
        match self {
            Self::MySql(client) => client.is_pooled(),
            Self::Postgres(client) => client.is_pooled(),
        }
    }
}

#[async_trait]
impl SqlClient for Database {
    fn dialect(&self) -> Dialect {
        match self {
            Self::MySql(client) => client.dialect(),
            Self::Postgres(client) => client.dialect(),
        }
    }

    fn bind(&self, template: &str, params: &Params) -> BoundQuery {
        match self {
            Self::MySql(client) => client.bind(template, params),
            Self::Postgres(client) => client.bind(template, params),
        }
    }

    fn validate(&self, template: &str) -> Result<Vec<StatementAdvisory>, DatabaseError> {
        match self {
            Self::MySql(client) => client.validate(template),
            Self::Postgres(client) => client.validate(template),
        }
    }

    async fn execute(&self, query: &BoundQuery) -> Result<Vec<Row>, DatabaseError> {
        match self {
            Self::MySql(client) => client.execute(query).await,
            Self::Postgres(client) => client.execute(query).await,
        }
    }

    async fn close(&self) -> Result<(), DatabaseError> {
        match self {
            Self::MySql(client) => client.close().await,
            Self::Postgres(client) => client.close().await,
        }
    }
}
