// ABOUTME: Database error types for the named-parameter SQL clients
// ABOUTME: Separates statement validation, transport and driver failures

use super::{AppError, ErrorCode};

/// Errors raised by the SQL clients
///
/// None of the variants retries; the caller decides whether to try again.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The query template failed statement validation
    #[error("Invalid statement: {reason}")]
    InvalidStatement {
        /// Why the template was rejected
        reason: String,
    },

    /// The transport could not be reached, or the client has been closed
    #[error("Connection error: {message}")]
    Connection {
        /// What went wrong while connecting
        message: String,
        /// Underlying driver error, absent when the client was closed locally
        #[source]
        source: Option<sqlx::Error>,
    },

    /// The driver rejected the bound query
    #[error("Query error: {source}")]
    Query {
        /// Native driver error
        #[source]
        source: sqlx::Error,
    },
}

impl DatabaseError {
    /// Client used after `close()`
    #[must_use]
    pub fn closed() -> Self {
        Self::Connection {
            message: "client is closed".to_owned(),
            source: None,
        }
    }

    /// Template rejected by validation
    #[must_use]
    pub fn invalid_statement(reason: impl Into<String>) -> Self {
        Self::InvalidStatement {
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, stable across driver versions
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidStatement { .. } => "InvalidStatement",
            Self::Connection { .. } => "ConnectionError",
            Self::Query { .. } => "QueryError",
        }
    }

    /// Whether this error means the backing server is unreachable
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connection {
                message: error.to_string(),
                source: Some(error),
            },
            other => Self::Query { source: other },
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        let code = match &error {
            DatabaseError::InvalidStatement { .. } => ErrorCode::InvalidStatement,
            DatabaseError::Connection { .. } => ErrorCode::ResourceUnavailable,
            DatabaseError::Query { .. } => ErrorCode::DatabaseError,
        };
        let kind = error.kind();
        Self::new(code, error.to_string())
            .with_details(serde_json::json!({ "kind": kind }))
            .with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlx_transport_errors_map_to_connection() {
        let error = DatabaseError::from(sqlx::Error::PoolClosed);
        assert!(error.is_connection());
        assert_eq!(error.kind(), "ConnectionError");

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(DatabaseError::from(sqlx::Error::Io(io)).is_connection());
    }

    #[test]
    fn test_sqlx_driver_errors_map_to_query() {
        let error = DatabaseError::from(sqlx::Error::RowNotFound);
        assert_eq!(error.kind(), "QueryError");
    }

    #[test]
    fn test_conversion_to_app_error() {
        let app: AppError = DatabaseError::closed().into();
        assert_eq!(app.code, ErrorCode::ResourceUnavailable);
        assert_eq!(app.http_status(), 503);
        assert_eq!(
            app.details,
            Some(serde_json::json!({ "kind": "ConnectionError" }))
        );

        let app: AppError = DatabaseError::invalid_statement("unterminated quote").into();
        assert_eq!(app.code, ErrorCode::InvalidStatement);
    }
}
