// ABOUTME: Database abstraction layer for named-parameter SQL clients
// ABOUTME: One SqlClient trait with MySQL (inline) and PostgreSQL (positional) variants
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use api_starter_core::errors::DatabaseError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Client selection from configuration
pub mod factory;
/// MySQL client with inline escaped literals
pub mod mysql;
/// Placeholder scanning, parameter values and bound queries
pub mod named_params;
/// Conversion of bound values to PostgreSQL parameter types
pub mod pg_params;
/// PostgreSQL client with `$n` markers
pub mod postgres;
/// Driver rows decoded into JSON objects
pub mod rows;
/// Structural checks and injection advisories for templates
pub mod validation;

pub use named_params::{BoundQuery, Params, SqlValue};
pub use rows::Row;
pub use validation::StatementAdvisory;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL / MariaDB, values inlined as escaped literals
    MySql,
    /// PostgreSQL, values bound through `$n` markers
    #[default]
    Postgres,
}

impl Dialect {
    /// Default TCP port of the dialect's server
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::MySql => 3306,
            Self::Postgres => 5432,
        }
    }

    /// Rewrite placeholders without a client
    #[must_use]
    pub fn bind(self, template: &str, params: &Params) -> BoundQuery {
        match self {
            Self::MySql => mysql::bind_inline(template, params),
            Self::Postgres => postgres::bind_positional(template, params),
        }
    }

    /// Validate a template without a client
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidStatement`] for an empty template or
    /// malformed quoting
    pub fn validate(self, template: &str) -> Result<Vec<StatementAdvisory>, DatabaseError> {
        let rules = match self {
            Self::MySql => validation::QuoteRules::MYSQL,
            Self::Postgres => validation::QuoteRules::POSTGRES,
        };
        validation::validate_statement(template, rules)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MySql => f.write_str("mysql"),
            Self::Postgres => f.write_str("postgres"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(format!(
                "unsupported SQL dialect '{other}', expected 'mysql' or 'postgres'"
            )),
        }
    }
}

/// Core SQL client abstraction
///
/// Both dialects implement the same capability set. Errors surface directly to the
/// caller; nothing is retried here.
#[async_trait]
pub trait SqlClient: Send + Sync {
    /// Dialect this client speaks
    fn dialect(&self) -> Dialect;

    /// Rewrite `:identifier` placeholders for this dialect
    ///
    /// Identifiers missing from `params` are left in place, colon included.
    fn bind(&self, template: &str, params: &Params) -> BoundQuery;

    /// Check a template before use
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidStatement`] for an empty template or
    /// malformed quoting. Injection heuristics never fail; they come back as advisories.
    fn validate(&self, template: &str) -> Result<Vec<StatementAdvisory>, DatabaseError>;

    /// Run a bound query and collect its rows
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Connection`] when the server is unreachable or the
    /// client is closed, and [`DatabaseError::Query`] when the driver rejects the SQL
    async fn execute(&self, query: &BoundQuery) -> Result<Vec<Row>, DatabaseError>;

    /// Release the connection or drain the pool
    ///
    /// Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails while closing a single connection
    async fn close(&self) -> Result<(), DatabaseError>;

    /// Validate, bind and execute in one call
    ///
    /// # Errors
    ///
    /// Returns any error from [`SqlClient::validate`] or [`SqlClient::execute`]
    async fn query(&self, template: &str, params: &Params) -> Result<Vec<Row>, DatabaseError> {
        self.validate(template)?;
        let bound = self.bind(template, params);
        self.execute(&bound).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_parsing() {
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("mariadb".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_dialect_default_ports() {
        assert_eq!(Dialect::MySql.default_port(), 3306);
        assert_eq!(Dialect::Postgres.default_port(), 5432);
    }
}
