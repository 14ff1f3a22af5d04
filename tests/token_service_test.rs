// ABOUTME: Integration tests for the access/refresh token service
// ABOUTME: Round trips, cross-class rejection, expiry, nbf, tampering and id uniqueness
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use api_starter::auth::{
    JwtValidationError, TokenClaims, TokenError, TokenService, TokenType,
};
use api_starter::errors::{AppError, ErrorCode};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct SessionData {
    user_id: u64,
    role: String,
}

fn service() -> TokenService {
    TokenService::new(&common::test_token_config()).unwrap()
}

#[test]
fn test_access_round_trip_returns_payload() {
    let service = service();
    let data = SessionData {
        user_id: 42,
        role: "admin".into(),
    };

    let token = service.issue_access(&data).unwrap();
    let claims = service.verify_access(&token).unwrap();

    assert_eq!(claims.typ, TokenType::Access);
    assert_eq!(claims.data_as::<SessionData>().unwrap(), data);
    assert!(claims.exp > claims.iat);
}

#[test]
fn test_refresh_round_trip() {
    let service = service();
    let token = service.issue_refresh(&json!({"user_id": 7})).unwrap();
    let claims = service.verify_refresh(&token).unwrap();

    assert_eq!(claims.typ, TokenType::Refresh);
    assert_eq!(claims.data["user_id"], 7);
    assert_eq!(claims.exp - claims.iat, 7 * 86_400);
}

#[test]
fn test_access_token_rejected_as_refresh() {
    let service = service();
    let access = service.issue_access(&json!({})).unwrap();

    let err = service.verify_refresh(&access).unwrap_err();
    assert!(matches!(err, TokenError::InvalidRefreshToken(_)));
}

#[test]
fn test_refresh_token_rejected_as_access() {
    let service = service();
    let refresh = service.issue_refresh(&json!({})).unwrap();

    let err = service.verify_access(&refresh).unwrap_err();
    assert!(matches!(err, TokenError::InvalidAccessToken(_)));
}

#[test]
fn test_zero_lifetime_token_is_expired() {
    let mut config = common::test_token_config();
    config.access_lifetime = "0s".into();
    let service = TokenService::new(&config).unwrap();

    let token = service.issue_access(&json!({})).unwrap();
    let err = service.verify_access(&token).unwrap_err();

    let reason = err.validation_error().unwrap();
    assert!(reason.is_expired());
    assert!(reason.to_string().contains("expired"));

    let app: AppError = err.into();
    assert_eq!(app.code, ErrorCode::AuthExpired);
    assert_eq!(app.http_status(), 401);
}

#[test]
fn test_token_not_yet_valid() {
    let config = common::test_token_config();
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
        sub: config.subject.clone(),
        iat: now,
        nbf: now + 3_600,
        exp: now + 7_200,
        jti: "future".into(),
        typ: TokenType::Access,
        data: json!({}),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.access_secret.as_bytes()),
    )
    .unwrap();

    let err = service().verify_access(&token).unwrap_err();
    assert!(matches!(
        err.validation_error(),
        Some(JwtValidationError::TokenNotYetValid { .. })
    ));
}

#[test]
fn test_wrong_secret_is_invalid() {
    let mut other = common::test_token_config();
    other.access_secret = "some-other-secret".into();
    let foreign = TokenService::new(&other)
        .unwrap()
        .issue_access(&json!({}))
        .unwrap();

    let err = service().verify_access(&foreign).unwrap_err();
    assert!(matches!(
        err.validation_error(),
        Some(JwtValidationError::TokenInvalid { .. })
    ));
}

#[test]
fn test_wrong_issuer_and_audience_are_invalid() {
    let mut other_issuer = common::test_token_config();
    other_issuer.issuer = "someone-else".into();
    let token = TokenService::new(&other_issuer)
        .unwrap()
        .issue_access(&json!({}))
        .unwrap();
    assert!(service().verify_access(&token).is_err());

    let mut other_audience = common::test_token_config();
    other_audience.audience = "other-clients".into();
    let token = TokenService::new(&other_audience)
        .unwrap()
        .issue_access(&json!({}))
        .unwrap();
    assert!(service().verify_access(&token).is_err());
}

#[test]
fn test_garbage_is_malformed() {
    let err = service().verify_access("not-a-jwt").unwrap_err();
    assert!(matches!(
        err.validation_error(),
        Some(JwtValidationError::TokenMalformed { .. })
    ));
    assert_eq!(AppError::from(err).code, ErrorCode::AuthMalformed);
}

#[test]
fn test_token_ids_never_repeat() {
    let service = service();
    let ids: HashSet<String> = (0..200)
        .map(|_| {
            let token = service.issue_access(&json!({})).unwrap();
            service.verify_access(&token).unwrap().jti
        })
        .collect();
    assert_eq!(ids.len(), 200);
}

#[test]
fn test_pair_shares_payload() {
    let service = service();
    let pair = service.issue_pair(&json!({"user_id": 9})).unwrap();

    let access = service.verify_access(&pair.access_token).unwrap();
    let refresh = service.verify_refresh(&pair.refresh_token).unwrap();
    assert_eq!(access.data, refresh.data);
    assert_ne!(access.jti, refresh.jti);
}

#[test]
fn test_invalid_lifetime_rejected_at_construction() {
    let mut config = common::test_token_config();
    config.access_lifetime = "15 minutes-ish".into();

    let err = TokenService::new(&config).err().unwrap();
    assert!(matches!(err, TokenError::InvalidLifetime { .. }));
    assert_eq!(AppError::from(err).code, ErrorCode::ConfigInvalid);
}
