// ABOUTME: Configuration management module, environment-only
// ABOUTME: Database client settings and token service settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module
//!
//! All settings come from environment variables; there is no config file.
//!
//! - **Database**: dialect, connection target, pooled mode and pool sizing
//! - **Token**: issuer/audience/subject, per-class secrets and lifetimes

/// Database client configuration
pub mod database;
/// Token service configuration
pub mod token;

pub use database::{DatabaseConfig, PoolConfig};
pub use token::TokenConfig;
