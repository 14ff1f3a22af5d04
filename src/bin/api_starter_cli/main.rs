// ABOUTME: api-starter CLI - issue and verify tokens, bind, validate and run SQL templates
// ABOUTME: Prints every result as a JSON response envelope on stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Issue an access token carrying a payload
//! api-starter-cli token issue --kind access --data '{"user_id": 42}'
//!
//! # Issue an access/refresh pair
//! api-starter-cli token pair --data '{"user_id": 42}'
//!
//! # Verify a refresh token
//! api-starter-cli token verify --kind refresh eyJhbGciOi...
//!
//! # Show the dialect rewrite of a template (no connection needed)
//! api-starter-cli sql bind --dialect postgres --template "SELECT * FROM t WHERE id = :id" --params '{"id": 7}'
//!
//! # Check a template for malformed quoting and injection advisories
//! api-starter-cli sql validate --dialect mysql --template "SELECT 'abc"
//!
//! # Run a query against the database configured through DB_* variables
//! api-starter-cli sql query --template "SELECT * FROM users WHERE email = :email" --params '{"email": "a@b.c"}'
//! ```

mod commands;
mod helpers;

use api_starter::auth::TokenType;
use api_starter::logging::LoggingConfig;
use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "api-starter-cli",
    about = "API starter toolkit CLI",
    long_about = "Command-line access to the token service and the named-parameter SQL clients."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Token service commands (reads JWT_* variables)
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },

    /// SQL template commands
    Sql {
        #[command(subcommand)]
        action: SqlCommand,
    },
}

/// Token class selector
#[derive(Clone, Copy, ValueEnum)]
enum TokenKind {
    Access,
    Refresh,
}

impl From<TokenKind> for TokenType {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Access => Self::Access,
            TokenKind::Refresh => Self::Refresh,
        }
    }
}

#[non_exhaustive]
#[derive(Subcommand)]
enum TokenCommand {
    /// Issue one token
    Issue {
        /// Token class
        #[arg(long, value_enum, default_value = "access")]
        kind: TokenKind,

        /// JSON payload embedded in the `data` claim
        #[arg(long, default_value = "{}")]
        data: String,
    },

    /// Issue an access token and a refresh token for the same payload
    Pair {
        /// JSON payload embedded in the `data` claim
        #[arg(long, default_value = "{}")]
        data: String,
    },

    /// Verify a token and print its claims
    Verify {
        /// Token class the token must belong to
        #[arg(long, value_enum, default_value = "access")]
        kind: TokenKind,

        /// Encoded token
        token: String,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum SqlCommand {
    /// Rewrite a template for a dialect without connecting
    Bind {
        /// Dialect (defaults to `DB_DIALECT`, then postgres)
        #[arg(long)]
        dialect: Option<String>,

        /// Query template with `:name` placeholders
        #[arg(long)]
        template: String,

        /// JSON object of parameter values
        #[arg(long)]
        params: Option<String>,
    },

    /// Check a template for malformed quoting and injection advisories
    Validate {
        /// Dialect (defaults to `DB_DIALECT`, then postgres)
        #[arg(long)]
        dialect: Option<String>,

        /// Query template
        #[arg(long)]
        template: String,
    },

    /// Validate, bind and run a template against the configured database
    Query {
        /// Query template with `:name` placeholders
        #[arg(long)]
        template: String,

        /// JSON object of parameter values
        #[arg(long)]
        params: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    if let Err(e) = logging.init() {
        eprintln!("Logging setup failed: {e}");
    }

    let result = match cli.command {
        Command::Token { action } => match action {
            TokenCommand::Issue { kind, data } => commands::token::issue(kind.into(), &data),
            TokenCommand::Pair { data } => commands::token::pair(&data),
            TokenCommand::Verify { kind, token } => commands::token::verify(kind.into(), &token),
        },
        Command::Sql { action } => match action {
            SqlCommand::Bind {
                dialect,
                template,
                params,
            } => commands::sql::bind(dialect.as_deref(), &template, params.as_deref()),
            SqlCommand::Validate { dialect, template } => {
                commands::sql::validate(dialect.as_deref(), &template)
            }
            SqlCommand::Query { template, params } => {
                commands::sql::query(&template, params.as_deref()).await
            }
        },
    };

    match result {
        Ok(data) => {
            helpers::output::print_success(&data);
            ExitCode::SUCCESS
        }
        Err(error) => {
            helpers::output::print_error(&error);
            ExitCode::FAILURE
        }
    }
}
