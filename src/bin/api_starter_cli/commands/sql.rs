// ABOUTME: SQL commands for api-starter-cli
// ABOUTME: Offline bind/validate for either dialect and live queries through the configured client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use api_starter::{
    config::DatabaseConfig,
    constants::env_vars,
    database_plugins::{factory::Database, Dialect, Params, SqlClient, StatementAdvisory},
    errors::{AppError, AppResult},
};
use serde_json::{json, Value};
use std::env;
use tracing::{info, warn};

fn resolve_dialect(flag: Option<&str>) -> AppResult<Dialect> {
    match flag.map(str::to_owned).or_else(|| env::var(env_vars::DB_DIALECT).ok()) {
        Some(raw) => raw.parse::<Dialect>().map_err(AppError::invalid_input),
        None => Ok(Dialect::default()),
    }
}

fn parse_params(raw: Option<&str>) -> AppResult<Params> {
    let Some(raw) = raw else {
        return Ok(Params::new());
    };
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::invalid_input(format!("--params is not valid JSON: {e}")))?;
    Params::from_json(value)
}

fn advisory_list(advisories: &[StatementAdvisory]) -> Vec<String> {
    advisories.iter().map(ToString::to_string).collect()
}

/// Show the dialect rewrite of a template
pub fn bind(dialect: Option<&str>, template: &str, params: Option<&str>) -> AppResult<Value> {
    let dialect = resolve_dialect(dialect)?;
    let bound = dialect.bind(template, &parse_params(params)?);
    Ok(json!({
        "dialect": dialect,
        "sql": bound.sql,
        "values": bound.values,
    }))
}

/// Check a template and list any advisories
pub fn validate(dialect: Option<&str>, template: &str) -> AppResult<Value> {
    let dialect = resolve_dialect(dialect)?;
    let advisories = dialect.validate(template)?;
    Ok(json!({
        "dialect": dialect,
        "valid": true,
        "advisories": advisory_list(&advisories),
    }))
}

/// Validate, bind and run a template against the configured database
pub async fn query(template: &str, params: Option<&str>) -> AppResult<Value> {
    let params = parse_params(params)?;
    let config = DatabaseConfig::from_env()?;
    let database = Database::new(&config);
    info!("Running query on {}", database.backend_info());

    let result = database.query(template, &params).await;
    if let Err(e) = database.close().await {
        warn!("Closing the SQL client failed: {}", e);
    }
    let rows = result?;

    Ok(json!({
        "row_count": rows.len(),
        "rows": rows,
    }))
}
