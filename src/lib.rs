// ABOUTME: Main library entry point for the api-starter toolkit
// ABOUTME: Named-parameter SQL clients for MySQL and PostgreSQL plus an access/refresh token service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// deny(unsafe_code): zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # API Starter
//!
//! Building blocks for a small web API backend.
//!
//! ## Features
//!
//! - **Named-parameter SQL**: write `:name` placeholders once and run them on MySQL
//!   (inline escaped literals) or PostgreSQL (`$n` positional markers)
//! - **Statement validation**: malformed quoting is rejected before a query reaches
//!   the server, and common injection patterns are reported as advisories
//! - **Token service**: access and refresh tokens with separate secrets, lifetimes
//!   and type tags
//! - **Unified errors**: every failure maps to an [`errors::ErrorCode`] and a
//!   JSON error envelope
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use api_starter::config::DatabaseConfig;
//! use api_starter::database_plugins::{factory::Database, Params, SqlClient};
//! use api_starter::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = DatabaseConfig::from_env()?;
//!     let database = Database::new(&config);
//!
//!     let params = Params::new().with("email", "ada@example.com");
//!     let rows = database
//!         .query("SELECT id, name FROM users WHERE email = :email", &params)
//!         .await?;
//!     println!("{} row(s)", rows.len());
//!
//!     database.close().await?;
//!     Ok(())
//! }
//! ```

/// Access and refresh token service
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Application constants and environment variable names
pub mod constants;

/// Named-parameter SQL clients
pub mod database_plugins;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Shared helpers
pub mod utils;

pub use auth::{TokenClaims, TokenPair, TokenService, TokenType};
pub use database_plugins::{factory::Database, Dialect, Params, SqlClient, SqlValue};
pub use errors::{AppError, AppResult};
