// ABOUTME: Application constants grouped by domain
// ABOUTME: Environment variable names, defaults and service identifiers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Constants module
//!
//! Constants are grouped into small domain modules rather than one flat list.

/// Service identifiers used in logs and token claims
pub mod service_names {
    /// Name reported by the logging layer
    pub const API_STARTER: &str = "api-starter";
}

/// Environment variable names
pub mod env_vars {
    /// SQL dialect (`mysql` or `postgres`)
    pub const DB_DIALECT: &str = "DB_DIALECT";
    /// Database server host
    pub const DB_HOST: &str = "DB_HOST";
    /// Database server port
    pub const DB_PORT: &str = "DB_PORT";
    /// Database user
    pub const DB_USER: &str = "DB_USER";
    /// Database password
    pub const DB_PASSWORD: &str = "DB_PASSWORD";
    /// Database name
    pub const DB_NAME: &str = "DB_NAME";
    /// `true` for a pool, `false` for a single connection
    pub const DB_POOLED: &str = "DB_POOLED";
    /// Pool upper bound
    pub const DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
    /// Pool lower bound
    pub const DB_MIN_CONNECTIONS: &str = "DB_MIN_CONNECTIONS";
    /// Seconds to wait for a pooled connection
    pub const DB_ACQUIRE_TIMEOUT_SECS: &str = "DB_ACQUIRE_TIMEOUT_SECS";

    /// Token issuer claim
    pub const JWT_ISSUER: &str = "JWT_ISSUER";
    /// Token audience claim
    pub const JWT_AUDIENCE: &str = "JWT_AUDIENCE";
    /// Token subject claim
    pub const JWT_SUBJECT: &str = "JWT_SUBJECT";
    /// HMAC secret for access tokens
    pub const JWT_ACCESS_SECRET: &str = "JWT_ACCESS_SECRET";
    /// HMAC secret for refresh tokens
    pub const JWT_REFRESH_SECRET: &str = "JWT_REFRESH_SECRET";
    /// Access token lifetime, e.g. `15m`
    pub const JWT_ACCESS_EXPIRES_IN: &str = "JWT_ACCESS_EXPIRES_IN";
    /// Refresh token lifetime, e.g. `7d`
    pub const JWT_REFRESH_EXPIRES_IN: &str = "JWT_REFRESH_EXPIRES_IN";
}

/// Database defaults
pub mod database {
    /// Host used when `DB_HOST` is unset
    pub const DEFAULT_HOST: &str = "localhost";
    /// Pool upper bound when unset
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    /// Pool lower bound when unset
    pub const DEFAULT_MIN_CONNECTIONS: u32 = 0;
    /// Acquire timeout when unset
    pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
}

/// Time conversions
pub mod time_constants {
    /// Seconds in a minute
    pub const SECONDS_PER_MINUTE: i64 = 60;
    /// Seconds in an hour
    pub const SECONDS_PER_HOUR: i64 = 3_600;
    /// Hours in a day
    pub const HOURS_PER_DAY: i64 = 24;
}
