// ABOUTME: Named-parameter scanning shared by both SQL dialects
// ABOUTME: Splits a :identifier template into literal and placeholder segments
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Named-parameter templates
//!
//! A template such as `SELECT * FROM users WHERE id = :id AND org = :org` is scanned
//! once into [`Segment`]s. The dialect binders then walk the segments and decide what
//! each placeholder becomes: an escaped literal for MySQL, a `$n` marker for Postgres.
//! Placeholders whose identifier is absent from the [`Params`] are written back
//! verbatim, colon included.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// One piece of a scanned template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Raw SQL text copied through unchanged
    Literal(&'a str),
    /// `:identifier` occurrence, holding the identifier without its colon
    Placeholder(&'a str),
}

const fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Scan `template` left to right into literal and placeholder segments
///
/// A placeholder is a `:` followed by one or more ASCII word characters. Adjacent
/// literal text is merged, so the output alternates where it can.
#[must_use]
pub fn scan(template: &str) -> Vec<Segment<'_>> {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b':' && i + 1 < bytes.len() && is_word_byte(bytes[i + 1]) {
            let ident_start = i + 1;
            let mut ident_end = ident_start;
            while ident_end < bytes.len() && is_word_byte(bytes[ident_end]) {
                ident_end += 1;
            }
            if literal_start < i {
                segments.push(Segment::Literal(&template[literal_start..i]));
            }
            segments.push(Segment::Placeholder(&template[ident_start..ident_end]));
            i = ident_end;
            literal_start = ident_end;
        } else {
            i += 1;
        }
    }

    if literal_start < bytes.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }
    segments
}

/// Distinct placeholder identifiers in first-occurrence order
#[must_use]
pub fn placeholder_names(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for segment in scan(template) {
        if let Segment::Placeholder(name) = segment {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Scalar value bound to a placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// SQL `NULL`
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text
    Text(String),
    /// Point in time, always UTC
    Timestamp(DateTime<Utc>),
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Value> for SqlValue {
    /// Arrays and objects are carried as their JSON text
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n
                .as_i64()
                .map_or_else(|| n.as_f64().map_or(Self::Null, Self::Float), Self::Int),
            Value::String(s) => Self::Text(s),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::Text(nested.to_string()),
        }
    }
}

/// Values keyed by placeholder identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: HashMap<String, SqlValue>,
}

impl Params {
    /// Empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Value bound to `name`, if any
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.values.get(name)
    }

    /// Number of bound identifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build from a JSON object, the shape request bodies usually arrive in
    ///
    /// `null` is treated as an empty set.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is neither an object nor `null`
    pub fn from_json(value: Value) -> AppResult<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(AppError::invalid_input(format!(
                "query parameters must be a JSON object, got {other}"
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Dialect-specific output of `bind`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundQuery {
    /// Query text handed to the driver
    pub sql: String,
    /// Positional values in marker order; always empty for inline binding
    pub values: Vec<SqlValue>,
}

impl BoundQuery {
    /// Query with no bound values
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            values: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scan_splits_literals_and_placeholders() {
        let segments = scan("SELECT * FROM t WHERE a = :a AND b = :b_2");
        assert_eq!(
            segments,
            vec![
                Segment::Literal("SELECT * FROM t WHERE a = "),
                Segment::Placeholder("a"),
                Segment::Literal(" AND b = "),
                Segment::Placeholder("b_2"),
            ]
        );
    }

    #[test]
    fn test_scan_ignores_lone_colons() {
        assert_eq!(
            scan("SELECT ':' , : x"),
            vec![Segment::Literal("SELECT ':' , : x")]
        );
        assert!(scan("").is_empty());
    }

    #[test]
    fn test_scan_placeholder_at_boundaries() {
        assert_eq!(
            scan(":first,:second"),
            vec![
                Segment::Placeholder("first"),
                Segment::Literal(","),
                Segment::Placeholder("second"),
            ]
        );
    }

    #[test]
    fn test_scan_stops_identifier_at_non_word_character() {
        assert_eq!(
            scan("x=:név"),
            vec![
                Segment::Literal("x="),
                Segment::Placeholder("n"),
                Segment::Literal("év"),
            ]
        );
    }

    #[test]
    fn test_placeholder_names_first_occurrence_order() {
        assert_eq!(
            placeholder_names("SELECT :b, :a, :b, :c, :a"),
            vec!["b", "a", "c"]
        );
    }

    #[test]
    fn test_sql_value_from_json() {
        assert_eq!(SqlValue::from(json!(null)), SqlValue::Null);
        assert_eq!(SqlValue::from(json!(3)), SqlValue::Int(3));
        assert_eq!(SqlValue::from(json!(2.5)), SqlValue::Float(2.5));
        assert_eq!(SqlValue::from(json!("x")), SqlValue::Text("x".into()));
        assert_eq!(
            SqlValue::from(json!([1, 2])),
            SqlValue::Text("[1,2]".into())
        );
    }

    #[test]
    fn test_params_from_json() {
        let params = Params::from_json(json!({"id": 1, "name": "ann"})).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some(&SqlValue::Int(1)));

        assert!(Params::from_json(json!(null)).unwrap().is_empty());
        assert!(Params::from_json(json!([1])).is_err());
    }

    #[test]
    fn test_option_maps_none_to_null() {
        let params = Params::new()
            .with("a", None::<i64>)
            .with("b", Some("set"));
        assert_eq!(params.get("a"), Some(&SqlValue::Null));
        assert_eq!(params.get("b"), Some(&SqlValue::Text("set".into())));
    }
}
