// ABOUTME: Standardized JSON response envelopes for REST handlers
// ABOUTME: Success carries {success, data, message}; failure carries {success, error, code, data}
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::errors::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};

/// Success envelope returned by every handler
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    /// Always `true` for this envelope
    pub success: bool,
    /// Response payload
    pub data: Option<T>,
    /// Optional human-readable message
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    /// HTTP status used when rendered as a response
    #[serde(skip)]
    pub status: u16,
}

impl<T> ApiResponse<T> {
    /// Wrap `data` in a success envelope
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            status: 200,
        }
    }

    /// Wrap `data` with an accompanying message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            status: 200,
        }
    }

    /// Success envelope with a message and no payload
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            status: 200,
        }
    }

    /// Override the HTTP status (e.g. 201 after a create)
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

/// Failure envelope built from an [`AppError`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    /// Always `false` for this envelope
    pub success: bool,
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Structured details, `null` when the error carries none
    pub data: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorEnvelope {
    fn from(error: &AppError) -> Self {
        Self {
            success: false,
            error: error.message.clone(),
            code: error.code,
            data: error.details.clone(),
        }
    }
}

impl From<AppError> for ErrorEnvelope {
    fn from(error: AppError) -> Self {
        Self {
            success: false,
            error: error.message,
            code: error.code,
            data: error.details,
        }
    }
}

#[cfg(feature = "http-response")]
mod http_response {
    use super::{ApiResponse, ErrorEnvelope};
    use crate::errors::AppError;
    use axum::response::{IntoResponse, Response};
    use axum::Json;
    use http::StatusCode;
    use serde::Serialize;

    impl<T: Serialize> IntoResponse for ApiResponse<T> {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
            (status, Json(self)).into_response()
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                tracing::error!(code = %self.code, error = %self, "request failed");
            } else {
                tracing::debug!(code = %self.code, error = %self, "request rejected");
            }
            (status, Json(ErrorEnvelope::from(self))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::ok(json!({"id": 7}))).unwrap();
        assert_eq!(body, json!({"success": true, "data": {"id": 7}}));

        let body =
            serde_json::to_value(ApiResponse::ok_with_message(1, "created").with_status(201))
                .unwrap();
        assert_eq!(body, json!({"success": true, "data": 1, "message": "created"}));
    }

    #[test]
    fn test_message_only_envelope_has_null_data() {
        let body = serde_json::to_value(ApiResponse::<()>::message_only("pong")).unwrap();
        assert_eq!(body, json!({"success": true, "data": null, "message": "pong"}));
    }

    #[test]
    fn test_error_envelope_shape() {
        let error = AppError::not_found("User").with_details(json!({"id": 42}));
        let body = serde_json::to_value(ErrorEnvelope::from(&error)).unwrap();
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": "User not found",
                "code": "RESOURCE_NOT_FOUND",
                "data": {"id": 42}
            })
        );
    }

    #[cfg(feature = "http-response")]
    #[tokio::test]
    async fn test_app_error_into_response_uses_mapped_status() {
        use axum::response::IntoResponse;
        use http_body_util::BodyExt;

        let response = AppError::auth_invalid("bad token").into_response();
        assert_eq!(response.status().as_u16(), 401);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!("AUTH_INVALID"));
        assert_eq!(body["error"], json!("bad token"));
    }

    #[cfg(feature = "http-response")]
    #[test]
    fn test_success_into_response_honours_status() {
        use axum::response::IntoResponse;

        let response = ApiResponse::ok("done").with_status(201).into_response();
        assert_eq!(response.status().as_u16(), 201);
    }
}
