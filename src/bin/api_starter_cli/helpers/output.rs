// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Output formatting helpers for api-starter-cli
// ABOUTME: Wraps command results in the shared success and error envelopes

use api_starter::errors::AppError;
use api_starter_core::{ApiResponse, ErrorEnvelope};
use serde::Serialize;
use serde_json::Value;

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Failed to render output: {e}"),
    }
}

/// Print a success envelope around `data`
pub fn print_success(data: &Value) {
    print_json(&ApiResponse::ok(data));
}

/// Print an error envelope
pub fn print_error(error: &AppError) {
    print_json(&ErrorEnvelope::from(error));
}
