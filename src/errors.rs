// ABOUTME: Re-exports the unified error types from api-starter-core
// ABOUTME: Lets the rest of the crate write crate::errors::{AppError, AppResult}
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Unified Error Handling System
//!
//! The types live in the core crate so they compile once; this module is the
//! stable path the application uses.

pub use api_starter_core::errors::{AppError, AppResult, DatabaseError, ErrorCode};
