// ABOUTME: Statement validation for query templates: quoting checks and injection heuristics
// ABOUTME: Malformed quoting is rejected, suspicious patterns only produce advisories
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use api_starter_core::errors::DatabaseError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use tracing::warn;

/// Quoting conventions of a SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteRules {
    /// Bytes that open and close a quoted section
    pub quotes: &'static [u8],
    /// Whether `\` escapes the next byte inside a quoted section
    pub backslash_escapes: bool,
    /// Whether `#` starts a comment running to the end of the line
    pub hash_comments: bool,
}

impl QuoteRules {
    /// MySQL: single, double and backtick quotes; backslash escapes; `#` comments
    pub const MYSQL: Self = Self {
        quotes: b"'\"`",
        backslash_escapes: true,
        hash_comments: true,
    };

    /// Postgres: single and double quotes; only doubled-quote escapes
    ///
    /// `#` is the bitwise XOR operator here, not a comment.
    pub const POSTGRES: Self = Self {
        quotes: b"'\"",
        backslash_escapes: false,
        hash_comments: false,
    };
}

/// Non-fatal signal that a call site may be building SQL from untrusted text
///
/// These are heuristics. They miss real injection vectors and flag safe code; callers
/// log or surface them but must not treat them as failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementAdvisory {
    /// The template contains a `${` interpolation marker
    InterpolationMarker {
        /// Byte offset of the first marker
        offset: usize,
    },
    /// A quote is followed by `+` and a word character, as in `'...' + name`
    StringConcatenation {
        /// Byte offset of the quote that starts the match
        offset: usize,
    },
}

impl fmt::Display for StatementAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InterpolationMarker { offset } => write!(
                f,
                "template contains a '${{' interpolation marker at byte {offset}; bind values with :name placeholders instead"
            ),
            Self::StringConcatenation { offset } => write!(
                f,
                "template looks like string concatenation at byte {offset}; bind values with :name placeholders instead"
            ),
        }
    }
}

fn concatenation_regex() -> Option<&'static Regex> {
    static CONCAT_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    CONCAT_REGEX
        .get_or_init(|| Regex::new(r#"['"]\s*\+\s*\w"#).ok())
        .as_ref()
}

/// Heuristic injection checks; never fails
#[must_use]
pub fn injection_advisories(template: &str) -> Vec<StatementAdvisory> {
    let mut advisories = Vec::new();
    if let Some(offset) = template.find("${") {
        advisories.push(StatementAdvisory::InterpolationMarker { offset });
    }
    if let Some(found) = concatenation_regex().and_then(|re| re.find(template)) {
        advisories.push(StatementAdvisory::StringConcatenation {
            offset: found.start(),
        });
    }
    advisories
}

fn quote_name(quote: u8) -> &'static str {
    match quote {
        b'\'' => "single-quoted string",
        b'"' => "double-quoted identifier",
        b'`' => "backtick-quoted identifier",
        _ => "quoted section",
    }
}

/// Reject templates whose quoting or block comments never close
///
/// # Errors
///
/// Returns [`DatabaseError::InvalidStatement`] naming the unterminated section
pub fn check_quoting(template: &str, rules: QuoteRules) -> Result<(), DatabaseError> {
    let bytes = template.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if rules.quotes.contains(&b) {
            let opened_at = i;
            i += 1;
            let mut closed = false;
            while i < bytes.len() {
                let c = bytes[i];
                if rules.backslash_escapes && c == b'\\' {
                    i += 2;
                    continue;
                }
                if c == b {
                    if bytes.get(i + 1) == Some(&b) {
                        i += 2;
                        continue;
                    }
                    closed = true;
                    i += 1;
                    break;
                }
                i += 1;
            }
            if !closed {
                return Err(DatabaseError::invalid_statement(format!(
                    "unterminated {} starting at byte {opened_at}",
                    quote_name(b)
                )));
            }
            continue;
        }

        let line_comment = (b == b'-' && bytes.get(i + 1) == Some(&b'-'))
            || (rules.hash_comments && b == b'#');
        if line_comment {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            let opened_at = i;
            match template[i + 2..].find("*/") {
                Some(end) => i += 2 + end + 2,
                None => {
                    return Err(DatabaseError::invalid_statement(format!(
                        "unterminated block comment starting at byte {opened_at}"
                    )))
                }
            }
            continue;
        }

        i += 1;
    }

    Ok(())
}

/// Validate a query template
///
/// Hard failures: an empty template, malformed quoting. Everything the injection
/// heuristics find is logged at `warn` and returned as advisories.
///
/// # Errors
///
/// Returns [`DatabaseError::InvalidStatement`] when the template is empty or its
/// quoting is malformed
pub fn validate_statement(
    template: &str,
    rules: QuoteRules,
) -> Result<Vec<StatementAdvisory>, DatabaseError> {
    if template.trim().is_empty() {
        return Err(DatabaseError::invalid_statement("statement is empty"));
    }

    check_quoting(template, rules)?;

    let advisories = injection_advisories(template);
    for advisory in &advisories {
        warn!(%advisory, "possible SQL injection pattern in query template");
    }
    Ok(advisories)
}
