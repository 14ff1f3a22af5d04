// ABOUTME: Token service configuration: claims identity, per-class secrets and lifetimes
// ABOUTME: Every field is required; secrets are redacted from Debug output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::database::required_env;
use crate::constants::env_vars;
use crate::errors::AppResult;
use std::fmt;

/// Configuration for [`crate::auth::TokenService`]
#[derive(Clone)]
pub struct TokenConfig {
    /// `iss` claim
    pub issuer: String,
    /// `aud` claim
    pub audience: String,
    /// `sub` claim
    pub subject: String,
    /// HMAC secret for access tokens
    pub access_secret: String,
    /// HMAC secret for refresh tokens
    pub refresh_secret: String,
    /// Access token lifetime, e.g. `"15m"`
    pub access_lifetime: String,
    /// Refresh token lifetime, e.g. `"7d"`
    pub refresh_lifetime: String,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("subject", &self.subject)
            .field("access_secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish()
    }
}

impl TokenConfig {
    /// Load token configuration from environment
    ///
    /// # Errors
    ///
    /// Returns a `CONFIG_MISSING` error naming the first absent variable
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            issuer: required_env(env_vars::JWT_ISSUER)?,
            audience: required_env(env_vars::JWT_AUDIENCE)?,
            subject: required_env(env_vars::JWT_SUBJECT)?,
            access_secret: required_env(env_vars::JWT_ACCESS_SECRET)?,
            refresh_secret: required_env(env_vars::JWT_REFRESH_SECRET)?,
            access_lifetime: required_env(env_vars::JWT_ACCESS_EXPIRES_IN)?,
            refresh_lifetime: required_env(env_vars::JWT_REFRESH_EXPIRES_IN)?,
        })
    }
}
