// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Re-exports command modules for api-starter-cli
// ABOUTME: Provides access to token and SQL commands

pub mod sql;
pub mod token;
