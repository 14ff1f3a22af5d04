// ABOUTME: Core types for the api_starter workspace
// ABOUTME: Foundation crate with error handling and standardized JSON response envelopes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # API Starter Core
//!
//! Foundation crate providing the types every layer of an `api_starter` service
//! shares. It changes rarely, which keeps incremental builds of the main crate cheap.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode` and `DatabaseError`
//! - **response**: `{success, data, message}` and `{success: false, error, code, data}` envelopes

/// Unified error handling system with standard error codes and HTTP status mapping
pub mod errors;

/// Standardized JSON response envelopes
pub mod response;

pub use errors::{AppError, AppResult, ErrorCode};
pub use response::{ApiResponse, ErrorEnvelope};
