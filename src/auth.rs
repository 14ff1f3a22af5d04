// ABOUTME: JWT token service issuing and verifying access and refresh tokens
// ABOUTME: Each token class has its own HMAC secret, lifetime and type tag
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Token Service
//!
//! Issues two classes of bearer tokens sharing one claim structure:
//!
//! - **access**: short-lived, signed with the access secret
//! - **refresh**: long-lived, signed with the refresh secret
//!
//! Verification only trusts the secret of the class being verified, so an access
//! token never verifies as a refresh token and vice versa. The `typ` claim is checked
//! as well, which keeps the classes apart even if both secrets are configured equal.

use crate::config::TokenConfig;
use crate::errors::{AppError, ErrorCode};
use crate::constants::time_constants::{HOURS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::utils::duration::parse_duration_secs;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Convert a duration to a human-readable format
fn humanize_duration(duration: Duration) -> String {
    let total_secs = duration.num_seconds().abs();
    let hours = total_secs / SECONDS_PER_HOUR;
    let minutes = (total_secs % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;

    if hours > 0 {
        format!("{hours} hours")
    } else if minutes > 0 {
        format!("{minutes} minutes")
    } else {
        format!("{total_secs} seconds")
    }
}

/// Token class, carried in the `typ` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token presented on every request
    Access,
    /// Long-lived token exchanged for a new access token
    Refresh,
}

impl TokenType {
    /// Claim value for this class
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `JWT` claims shared by both token classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer
    pub iss: String,
    /// Audience (who the token is intended for)
    pub aud: String,
    /// Subject
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Not valid before this timestamp
    pub nbf: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Unique, time-ordered token id
    pub jti: String,
    /// Token class
    pub typ: TokenType,
    /// Caller-supplied payload
    pub data: Value,
}

impl TokenClaims {
    /// Deserialize the embedded payload into a concrete type
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not match `T`
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }

    /// Expiration as a timestamp
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// `JWT` validation error with detailed information
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token `nbf` lies in the future
    TokenNotYetValid {
        /// Reason reported by the verifier
        reason: String,
    },
    /// Token signature or claims are invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
    /// Token verified but belongs to the other class
    WrongTokenType {
        /// Class the caller asked to verify
        expected: TokenType,
        /// Class recorded in the token
        found: TokenType,
    },
}

impl fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let duration_expired = current_time.signed_duration_since(*expired_at);
                if duration_expired.num_hours() < HOURS_PER_DAY {
                    write!(
                        f,
                        "JWT token expired {} ago at {}",
                        humanize_duration(duration_expired),
                        expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                    )
                } else {
                    write!(
                        f,
                        "JWT token expired {} days ago at {}",
                        duration_expired.num_days(),
                        expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                    )
                }
            }
            Self::TokenNotYetValid { reason } => write!(f, "JWT token is not yet valid: {reason}"),
            Self::TokenInvalid { reason } => write!(f, "JWT token is invalid: {reason}"),
            Self::TokenMalformed { details } => write!(f, "JWT token is malformed: {details}"),
            Self::WrongTokenType { expected, found } => {
                write!(f, "expected a {expected} token but got a {found} token")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

impl JwtValidationError {
    /// Whether the failure is only about the token's lifetime
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::TokenExpired { .. })
    }
}

/// Errors raised by [`TokenService`]
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Access token failed verification
    #[error("Invalid access token: {0}")]
    InvalidAccessToken(#[source] JwtValidationError),

    /// Refresh token failed verification
    #[error("Invalid refresh token: {0}")]
    InvalidRefreshToken(#[source] JwtValidationError),

    /// A configured lifetime is not a valid duration string
    #[error("Invalid {class} token lifetime '{value}'")]
    InvalidLifetime {
        /// Class whose lifetime is broken
        class: TokenType,
        /// Configured value
        value: String,
    },

    /// A configured secret is empty
    #[error("The {class} token secret must not be empty")]
    EmptySecret {
        /// Class whose secret is empty
        class: TokenType,
    },

    /// Payload could not be serialized into the claim set
    #[error("Token payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),

    /// Signing failed
    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl TokenError {
    fn invalid(class: TokenType, reason: JwtValidationError) -> Self {
        match class {
            TokenType::Access => Self::InvalidAccessToken(reason),
            TokenType::Refresh => Self::InvalidRefreshToken(reason),
        }
    }

    /// Verification failure reason, if this is a verification error
    #[must_use]
    pub const fn validation_error(&self) -> Option<&JwtValidationError> {
        match self {
            Self::InvalidAccessToken(reason) | Self::InvalidRefreshToken(reason) => Some(reason),
            _ => None,
        }
    }

    /// Short machine-readable kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAccessToken(_) => "InvalidAccessToken",
            Self::InvalidRefreshToken(_) => "InvalidRefreshToken",
            Self::InvalidLifetime { .. } | Self::EmptySecret { .. } => "InvalidTokenConfig",
            Self::Payload(_) => "InvalidTokenPayload",
            Self::Signing(_) => "TokenSigningFailed",
        }
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> Self {
        let code = match &error {
            TokenError::InvalidAccessToken(reason) | TokenError::InvalidRefreshToken(reason) => {
                match reason {
                    JwtValidationError::TokenExpired { .. } => ErrorCode::AuthExpired,
                    JwtValidationError::TokenMalformed { .. } => ErrorCode::AuthMalformed,
                    _ => ErrorCode::AuthInvalid,
                }
            }
            TokenError::InvalidLifetime { .. } | TokenError::EmptySecret { .. } => {
                ErrorCode::ConfigInvalid
            }
            TokenError::Payload(_) => ErrorCode::SerializationError,
            TokenError::Signing(_) => ErrorCode::InternalError,
        };
        let kind = error.kind();
        Self::new(code, error.to_string())
            .with_details(serde_json::json!({ "kind": kind }))
            .with_source(error)
    }
}

/// Both tokens issued for one payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
}

#[derive(Clone)]
struct TokenKeys {
    class: TokenType,
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: String,
}

impl TokenKeys {
    fn new(class: TokenType, secret: &str, lifetime: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret { class });
        }
        let keys = Self {
            class,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: lifetime.to_owned(),
        };
        keys.lifetime_secs()?;
        Ok(keys)
    }

    fn lifetime_secs(&self) -> Result<i64, TokenError> {
        parse_duration_secs(&self.lifetime).ok_or_else(|| TokenError::InvalidLifetime {
            class: self.class,
            value: self.lifetime.clone(),
        })
    }
}

/// Issues and verifies access and refresh tokens
///
/// Pure computation over immutable keys; safe to share across tasks.
#[derive(Clone)]
pub struct TokenService {
    issuer: String,
    audience: String,
    subject: String,
    access: TokenKeys,
    refresh: TokenKeys,
}

impl TokenService {
    /// Create a token service
    ///
    /// Lifetimes are checked here so a typo fails at startup; they are still
    /// resolved to seconds on every issuance.
    ///
    /// # Errors
    ///
    /// Returns an error if a secret is empty or a lifetime does not parse
    pub fn new(config: &TokenConfig) -> Result<Self, TokenError> {
        Ok(Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            subject: config.subject.clone(),
            access: TokenKeys::new(
                TokenType::Access,
                &config.access_secret,
                &config.access_lifetime,
            )?,
            refresh: TokenKeys::new(
                TokenType::Refresh,
                &config.refresh_secret,
                &config.refresh_lifetime,
            )?,
        })
    }

    const fn keys(&self, class: TokenType) -> &TokenKeys {
        match class {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }

    fn issue(&self, class: TokenType, data: Value) -> Result<String, TokenError> {
        let keys = self.keys(class);
        let now = Utc::now().timestamp();
        let lifetime = keys.lifetime_secs()?;

        let claims = TokenClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: self.subject.clone(),
            iat: now,
            nbf: now,
            exp: now.saturating_add(lifetime),
            jti: Uuid::now_v7().to_string(),
            typ: class,
            data,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)?;
        tracing::debug!(typ = %class, jti = %claims.jti, exp = claims.exp, "Issued token");
        Ok(token)
    }

    /// Issue an access token carrying `data`
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be serialized or signing fails
    pub fn issue_access<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, TokenError> {
        self.issue(TokenType::Access, serde_json::to_value(data)?)
    }

    /// Issue a refresh token carrying `data`
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be serialized or signing fails
    pub fn issue_refresh<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, TokenError> {
        self.issue(TokenType::Refresh, serde_json::to_value(data)?)
    }

    /// Issue an access and a refresh token for the same payload
    ///
    /// # Errors
    ///
    /// Returns an error if either issuance fails
    pub fn issue_pair<T: Serialize + ?Sized>(&self, data: &T) -> Result<TokenPair, TokenError> {
        let data = serde_json::to_value(data)?;
        Ok(TokenPair {
            access_token: self.issue(TokenType::Access, data.clone())?,
            refresh_token: self.issue(TokenType::Refresh, data)?,
        })
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::warn!("JWT token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::ImmatureSignature => JwtValidationError::TokenNotYetValid {
                reason: "nbf claim is in the future".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }

    /// Check if token is expired and return error if so
    fn check_token_expiry(
        claims: &TokenClaims,
        current_time: DateTime<Utc>,
    ) -> Result<(), JwtValidationError> {
        if current_time.timestamp() >= claims.exp {
            let expired_at = claims.expires_at().unwrap_or(current_time);
            tracing::warn!(
                "JWT {} token {} expired {} ago at {}",
                claims.typ,
                claims.jti,
                humanize_duration(current_time.signed_duration_since(expired_at)),
                expired_at.to_rfc3339()
            );
            return Err(JwtValidationError::TokenExpired {
                expired_at,
                current_time,
            });
        }
        Ok(())
    }

    fn verify(&self, class: TokenType, token: &str) -> Result<TokenClaims, JwtValidationError> {
        let keys = self.keys(class);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_nbf = true;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.sub = Some(self.subject.clone());
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);

        let claims = decode::<TokenClaims>(token, &keys.decoding, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))?;

        Self::check_token_expiry(&claims, Utc::now())?;

        if claims.typ != class {
            return Err(JwtValidationError::WrongTokenType {
                expected: class,
                found: claims.typ,
            });
        }

        tracing::debug!(typ = %class, jti = %claims.jti, "Token verified");
        Ok(claims)
    }

    /// Verify an access token and return its claims
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidAccessToken`] on a bad signature, wrong issuer,
    /// audience or subject, expiry, `nbf` in the future, malformed input, or a refresh
    /// token
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify(TokenType::Access, token)
            .map_err(|reason| TokenError::invalid(TokenType::Access, reason))
    }

    /// Verify a refresh token and return its claims
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidRefreshToken`] for the same failures as
    /// [`TokenService::verify_access`], or when given an access token
    pub fn verify_refresh(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify(TokenType::Refresh, token)
            .map_err(|reason| TokenError::invalid(TokenType::Refresh, reason))
    }
}
