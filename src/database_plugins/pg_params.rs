// ABOUTME: Converts bound values to the parameter types PostgreSQL infers for each $n marker
// ABOUTME: NULLs and textual or unrecognised types travel untyped so the server decides
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! PostgreSQL parameter encoding
//!
//! The driver sends every parameter in binary format, so a value must be encoded as
//! exactly the type the server expects for its marker. Statements are described
//! first and each [`SqlValue`] is converted to the reported type. NULLs and
//! text-shaped types are sent with OID 0, which leaves the choice to the server.

use super::named_params::SqlValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgArgumentBuffer, PgArguments, PgTypeInfo};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{Encode, Postgres, Type, TypeInfo};
use std::str::FromStr;
use uuid::Uuid;

/// Type name used when the server reports nothing for a marker
const UNKNOWN_TYPE: &str = "UNKNOWN";

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// Parameter sent without a type so PostgreSQL infers it from context
///
/// The payload is the raw UTF-8 text, which matches the binary wire form of
/// `text`, `varchar`, `json`, enum and other text-backed types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Untyped(pub Option<String>);

impl Type<Postgres> for Untyped {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}

impl Encode<'_, Postgres> for Untyped {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        match &self.0 {
            Some(text) => {
                buf.extend_from_slice(text.as_bytes());
                Ok(IsNull::No)
            }
            None => Ok(IsNull::Yes),
        }
    }
}

/// A value converted to the type of its marker
#[derive(Debug, Clone, PartialEq)]
pub enum PgParam {
    /// NULL, or text for a type the server resolves itself
    Untyped(Untyped),
    /// `bool`
    Bool(bool),
    /// `int2`
    Int2(i16),
    /// `int4`
    Int4(i32),
    /// `int8`
    Int8(i64),
    /// `float4`
    Float4(f32),
    /// `float8`
    Float8(f64),
    /// `numeric`
    Numeric(Decimal),
    /// `timestamptz`
    Timestamptz(DateTime<Utc>),
    /// `timestamp`
    Timestamp(NaiveDateTime),
    /// `date`
    Date(NaiveDate),
    /// `time`
    Time(NaiveTime),
    /// `uuid`
    Uuid(Uuid),
    /// `jsonb`
    Jsonb(Value),
}

impl PgParam {
    fn untyped(text: impl Into<String>) -> Self {
        Self::Untyped(Untyped(Some(text.into())))
    }

    /// Append this value to a query
    pub fn bind_to<'q>(
        self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            Self::Untyped(v) => query.bind(v),
            Self::Bool(v) => query.bind(v),
            Self::Int2(v) => query.bind(v),
            Self::Int4(v) => query.bind(v),
            Self::Int8(v) => query.bind(v),
            Self::Float4(v) => query.bind(v),
            Self::Float8(v) => query.bind(v),
            Self::Numeric(v) => query.bind(v),
            Self::Timestamptz(v) => query.bind(v),
            Self::Timestamp(v) => query.bind(v),
            Self::Date(v) => query.bind(v),
            Self::Time(v) => query.bind(v),
            Self::Uuid(v) => query.bind(v),
            Self::Jsonb(v) => query.bind(Json(v)),
        }
    }
}

/// Convert every value to the type the server reported for its marker
///
/// `inferred` is indexed by marker position. Markers without a reported type are
/// sent untyped.
///
/// # Errors
///
/// Returns `sqlx::Error::Encode` naming the marker when a value cannot represent
/// the target type, for example `"abc"` for an `int4` column.
pub fn coerce_all(
    values: &[SqlValue],
    inferred: &[PgTypeInfo],
) -> Result<Vec<PgParam>, sqlx::Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let type_name = inferred.get(index).map_or(UNKNOWN_TYPE, TypeInfo::name);
            coerce(value, type_name).map_err(|reason| {
                sqlx::Error::Encode(format!("parameter ${}: {reason}", index + 1).into())
            })
        })
        .collect()
}

/// Convert one value to the PostgreSQL type called `type_name`
///
/// # Errors
///
/// Returns a description of the mismatch when the value cannot be converted.
pub fn coerce(value: &SqlValue, type_name: &str) -> Result<PgParam, String> {
    if matches!(value, SqlValue::Null) {
        return Ok(PgParam::Untyped(Untyped(None)));
    }

    let param = match type_name {
        "BOOL" => PgParam::Bool(to_bool(value).ok_or_else(|| mismatch(value, type_name))?),
        "INT2" => PgParam::Int2(
            to_i64(value)
                .and_then(|i| i16::try_from(i).ok())
                .ok_or_else(|| mismatch(value, type_name))?,
        ),
        "INT4" => PgParam::Int4(
            to_i64(value)
                .and_then(|i| i32::try_from(i).ok())
                .ok_or_else(|| mismatch(value, type_name))?,
        ),
        "INT8" => PgParam::Int8(to_i64(value).ok_or_else(|| mismatch(value, type_name))?),
        "FLOAT4" => {
            PgParam::Float4(to_f64(value).ok_or_else(|| mismatch(value, type_name))? as f32)
        }
        "FLOAT8" => PgParam::Float8(to_f64(value).ok_or_else(|| mismatch(value, type_name))?),
        "NUMERIC" => {
            PgParam::Numeric(to_decimal(value).ok_or_else(|| mismatch(value, type_name))?)
        }
        "TIMESTAMPTZ" => {
            PgParam::Timestamptz(to_datetime(value).ok_or_else(|| mismatch(value, type_name))?)
        }
        "TIMESTAMP" => PgParam::Timestamp(
            to_naive_datetime(value).ok_or_else(|| mismatch(value, type_name))?,
        ),
        "DATE" => PgParam::Date(to_date(value).ok_or_else(|| mismatch(value, type_name))?),
        "TIME" => PgParam::Time(to_time(value).ok_or_else(|| mismatch(value, type_name))?),
        "UUID" => PgParam::Uuid(
            Uuid::parse_str(text_form(value).trim()).map_err(|_| mismatch(value, type_name))?,
        ),
        "JSONB" => PgParam::Jsonb(to_json(value).ok_or_else(|| mismatch(value, type_name))?),
        _ => PgParam::untyped(text_form(value)),
    };
    Ok(param)
}

fn mismatch(value: &SqlValue, type_name: &str) -> String {
    format!(
        "cannot convert {} to {}",
        serde_json::to_string(value).unwrap_or_else(|_| text_form(value)),
        type_name.to_lowercase()
    )
}

/// Text the server would read for this value
fn text_form(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Bool(b) => b.to_string(),
        SqlValue::Int(i) => i.to_string(),
        SqlValue::Float(f) => f.to_string(),
        SqlValue::Text(s) => s.clone(),
        SqlValue::Timestamp(t) => t.to_rfc3339(),
    }
}

fn to_bool(value: &SqlValue) -> Option<bool> {
    match value {
        SqlValue::Bool(b) => Some(*b),
        SqlValue::Int(0) => Some(false),
        SqlValue::Int(1) => Some(true),
        SqlValue::Text(s) => match s.trim().to_lowercase().as_str() {
            "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
            "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn to_i64(value: &SqlValue) -> Option<i64> {
    match value {
        SqlValue::Int(i) => Some(*i),
        SqlValue::Bool(b) => Some(i64::from(*b)),
        SqlValue::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e18 => Some(*f as i64),
        SqlValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_f64(value: &SqlValue) -> Option<f64> {
    match value {
        SqlValue::Float(f) => Some(*f),
        SqlValue::Int(i) => Some(*i as f64),
        SqlValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_decimal(value: &SqlValue) -> Option<Decimal> {
    match value {
        SqlValue::Int(i) => Some(Decimal::from(*i)),
        SqlValue::Float(f) => Decimal::try_from(*f).ok(),
        SqlValue::Text(s) => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .ok()
        }
        _ => None,
    }
}

fn to_datetime(value: &SqlValue) -> Option<DateTime<Utc>> {
    match value {
        SqlValue::Timestamp(t) => Some(*t),
        SqlValue::Int(secs) => DateTime::from_timestamp(*secs, 0),
        SqlValue::Text(s) => {
            let trimmed = s.trim();
            DateTime::parse_from_rfc3339(trimmed)
                .or_else(|_| DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%#z"))
                .map(|t| t.with_timezone(&Utc))
                .ok()
                .or_else(|| parse_naive(trimmed).map(|t| t.and_utc()))
        }
        _ => None,
    }
}

fn to_naive_datetime(value: &SqlValue) -> Option<NaiveDateTime> {
    match value {
        SqlValue::Text(s) => {
            parse_naive(s.trim()).or_else(|| to_datetime(value).map(|t| t.naive_utc()))
        }
        _ => to_datetime(value).map(|t| t.naive_utc()),
    }
}

fn to_date(value: &SqlValue) -> Option<NaiveDate> {
    match value {
        SqlValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .or_else(|| to_naive_datetime(value).map(|t| t.date())),
        _ => to_naive_datetime(value).map(|t| t.date()),
    }
}

fn to_time(value: &SqlValue) -> Option<NaiveTime> {
    match value {
        SqlValue::Text(s) => {
            let trimmed = s.trim();
            TIME_FORMATS
                .iter()
                .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        }
        SqlValue::Timestamp(t) => Some(t.time()),
        _ => None,
    }
}

fn to_json(value: &SqlValue) -> Option<Value> {
    match value {
        SqlValue::Text(s) => serde_json::from_str(s).ok(),
        other => serde_json::to_value(other).ok(),
    }
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_untyped_parameters_carry_oid_zero() {
        assert_eq!(
            <Untyped as Type<Postgres>>::type_info().oid(),
            Some(Oid(0))
        );
    }

    #[test]
    fn test_null_is_untyped_for_every_column_type() {
        for type_name in ["INT4", "TIMESTAMPTZ", "UUID", "NUMERIC", "TEXT", UNKNOWN_TYPE] {
            assert_eq!(
                coerce(&SqlValue::Null, type_name).unwrap(),
                PgParam::Untyped(Untyped(None)),
                "{type_name}"
            );
        }
    }

    #[test]
    fn test_text_follows_the_inferred_column_type() {
        let text = SqlValue::Text("2024-03-01T12:30:00Z".into());
        assert_eq!(
            coerce(&text, "TIMESTAMPTZ").unwrap(),
            PgParam::Timestamptz(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
        );
        assert_eq!(
            coerce(&SqlValue::Text("2024-03-01".into()), "DATE").unwrap(),
            PgParam::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(
            coerce(&SqlValue::Text("2024-03-01 08:00:00".into()), "TIMESTAMP").unwrap(),
            PgParam::Timestamp(
                NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(8, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            coerce(&SqlValue::Text("42".into()), "INT4").unwrap(),
            PgParam::Int4(42)
        );

        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        assert_eq!(
            coerce(&SqlValue::Text(id.into()), "UUID").unwrap(),
            PgParam::Uuid(Uuid::parse_str(id).unwrap())
        );
    }

    #[test]
    fn test_numbers_widen_and_narrow_to_the_column() {
        assert_eq!(coerce(&SqlValue::Int(7), "INT2").unwrap(), PgParam::Int2(7));
        assert_eq!(coerce(&SqlValue::Int(7), "FLOAT8").unwrap(), PgParam::Float8(7.0));
        assert_eq!(
            coerce(&SqlValue::Text("12.50".into()), "NUMERIC").unwrap(),
            PgParam::Numeric(Decimal::new(1250, 2))
        );
        assert_eq!(
            coerce(&SqlValue::Int(3), "NUMERIC").unwrap(),
            PgParam::Numeric(Decimal::from(3))
        );
        assert!(coerce(&SqlValue::Int(70_000), "INT2").is_err());
        assert!(coerce(&SqlValue::Float(1.5), "INT8").is_err());
    }

    #[test]
    fn test_text_types_and_unknowns_stay_untyped() {
        for type_name in ["TEXT", "VARCHAR", "JSON", "mood", UNKNOWN_TYPE] {
            assert_eq!(
                coerce(&SqlValue::Text("happy".into()), type_name).unwrap(),
                PgParam::untyped("happy"),
                "{type_name}"
            );
        }
        assert_eq!(
            coerce(&SqlValue::Int(5), "TEXT").unwrap(),
            PgParam::untyped("5")
        );
    }

    #[test]
    fn test_jsonb_parses_text_payloads() {
        assert_eq!(
            coerce(&SqlValue::Text(r#"{"a":1}"#.into()), "JSONB").unwrap(),
            PgParam::Jsonb(serde_json::json!({"a": 1}))
        );
        assert!(coerce(&SqlValue::Text("{not json".into()), "JSONB").is_err());
    }

    #[test]
    fn test_mismatch_names_the_marker() {
        let err = coerce_all(
            &[SqlValue::Int(1), SqlValue::Text("abc".into())],
            &[PgTypeInfo::with_name("INT4"), PgTypeInfo::with_name("INT4")],
        )
        .unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("$2"), "{rendered}");
        assert!(rendered.contains("int4"), "{rendered}");
    }

    #[test]
    fn test_missing_type_information_sends_text() {
        let params = coerce_all(&[SqlValue::Text("x".into())], &[]).unwrap();
        assert_eq!(params, vec![PgParam::untyped("x")]);
    }
}
