// ABOUTME: Token commands for api-starter-cli
// ABOUTME: Issue single tokens or pairs and verify tokens against the configured secrets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use api_starter::{
    auth::{TokenService, TokenType},
    config::TokenConfig,
    errors::{AppError, AppResult},
};
use serde_json::{json, Value};
use tracing::info;

fn load_service() -> AppResult<TokenService> {
    let config = TokenConfig::from_env()?;
    Ok(TokenService::new(&config)?)
}

fn parse_data(raw: &str) -> AppResult<Value> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::invalid_input(format!("--data is not valid JSON: {e}")))
}

/// Issue one token of the given class
pub fn issue(kind: TokenType, data: &str) -> AppResult<Value> {
    let service = load_service()?;
    let data = parse_data(data)?;

    let token = match kind {
        TokenType::Access => service.issue_access(&data)?,
        TokenType::Refresh => service.issue_refresh(&data)?,
    };
    info!("Issued {} token", kind);

    Ok(json!({ "kind": kind, "token": token }))
}

/// Issue an access and a refresh token
pub fn pair(data: &str) -> AppResult<Value> {
    let service = load_service()?;
    let pair = service.issue_pair(&parse_data(data)?)?;
    Ok(serde_json::to_value(pair)?)
}

/// Verify a token and return its claims
pub fn verify(kind: TokenType, token: &str) -> AppResult<Value> {
    let service = load_service()?;
    let claims = match kind {
        TokenType::Access => service.verify_access(token)?,
        TokenType::Refresh => service.verify_refresh(token)?,
    };
    Ok(serde_json::to_value(claims)?)
}
