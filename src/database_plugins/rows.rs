// ABOUTME: Converts driver rows into JSON records keyed by column name
// ABOUTME: Tries the decodable Rust types per dialect and falls back to null
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row as _, TypeInfo};
use tracing::debug;

/// A result row: column name to JSON value
pub type Row = Map<String, Value>;

/// Return from the enclosing function with the first type the column decodes as
macro_rules! decode_as {
    ($row:expr, $idx:expr, $ty:ty, $convert:expr) => {
        if let Ok(value) = $row.try_get::<Option<$ty>, _>($idx) {
            return value.map_or(Value::Null, $convert);
        }
    };
}

fn bytes_value(bytes: Vec<u8>) -> Value {
    Value::from(bytes)
}

/// Decimals keep their scale as a string, e.g. `"12.50"`
fn decimal_value(d: Decimal) -> Value {
    Value::String(d.to_string())
}

fn timestamptz_value(t: DateTime<Utc>) -> Value {
    Value::String(t.to_rfc3339())
}

fn timestamp_value(t: NaiveDateTime) -> Value {
    Value::String(t.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
}

fn mysql_column(row: &MySqlRow, idx: usize) -> Value {
    if row.column(idx).type_info().name() == "BOOLEAN" {
        decode_as!(row, idx, bool, Value::Bool);
    }
    decode_as!(row, idx, i64, Value::from);
    decode_as!(row, idx, u64, Value::from);
    decode_as!(row, idx, f64, Value::from);
    decode_as!(row, idx, f32, |f: f32| Value::from(f64::from(f)));
    decode_as!(row, idx, Decimal, decimal_value);
    decode_as!(row, idx, String, Value::String);
    decode_as!(row, idx, DateTime<Utc>, timestamptz_value);
    decode_as!(row, idx, NaiveDateTime, timestamp_value);
    decode_as!(row, idx, NaiveDate, |d: NaiveDate| Value::String(d.to_string()));
    decode_as!(row, idx, NaiveTime, |t: NaiveTime| Value::String(t.to_string()));
    decode_as!(row, idx, Value, |v| v);
    decode_as!(row, idx, Vec<u8>, bytes_value);

    // DECIMAL and friends arrive as text on the wire
    if let Ok(value) = row.try_get_unchecked::<Option<String>, _>(idx) {
        return value.map_or(Value::Null, Value::String);
    }

    debug!(
        column = row.column(idx).name(),
        type_name = row.column(idx).type_info().name(),
        "no JSON mapping for MySQL column type"
    );
    Value::Null
}

fn postgres_column(row: &PgRow, idx: usize) -> Value {
    decode_as!(row, idx, bool, Value::Bool);
    decode_as!(row, idx, i16, Value::from);
    decode_as!(row, idx, i32, Value::from);
    decode_as!(row, idx, i64, Value::from);
    decode_as!(row, idx, f32, |f: f32| Value::from(f64::from(f)));
    decode_as!(row, idx, f64, Value::from);
    decode_as!(row, idx, Decimal, decimal_value);
    decode_as!(row, idx, String, Value::String);
    decode_as!(row, idx, DateTime<Utc>, timestamptz_value);
    decode_as!(row, idx, NaiveDateTime, timestamp_value);
    decode_as!(row, idx, NaiveDate, |d: NaiveDate| Value::String(d.to_string()));
    decode_as!(row, idx, NaiveTime, |t: NaiveTime| Value::String(t.to_string()));
    decode_as!(row, idx, Value, |v| v);
    decode_as!(row, idx, uuid::Uuid, |u: uuid::Uuid| Value::String(u.to_string()));
    decode_as!(row, idx, Vec<u8>, bytes_value);

    debug!(
        column = row.column(idx).name(),
        type_name = row.column(idx).type_info().name(),
        "no JSON mapping for Postgres column type"
    );
    Value::Null
}

/// Convert a MySQL row into a JSON record
#[must_use]
pub fn mysql_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .map(|column| {
            (
                column.name().to_owned(),
                mysql_column(row, column.ordinal()),
            )
        })
        .collect()
}

/// Convert a Postgres row into a JSON record
#[must_use]
pub fn postgres_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .map(|column| {
            (
                column.name().to_owned(),
                postgres_column(row, column.ordinal()),
            )
        })
        .collect()
}
