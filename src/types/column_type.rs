//! This module defines the canonical, type-safe registry of column types used
//! throughout the rowset write path.
//!
//! Each variant owns three rules: how a raw caller string is checked and
//! normalized, how large its rendered form can ever be, and which Arrow type
//! carries it once it is read back for a client. All three are exhaustive
//! `match`es, so adding a variant fails to compile until every rule handles it.

use arrow::datatypes::{DataType as ArrowDataType, TimeUnit};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//==================================================================================
// 0. Size Constants
//==================================================================================

/// Applied to string-like columns that do not declare a `max_size`.
pub const DEFAULT_MAX_STRING_SIZE: usize = 50;

/// `"false"`
const BOOLEAN_MAX_BYTES: usize = 5;
/// `"-9223372036854775808"`
const INTEGER_MAX_BYTES: usize = 20;
/// `"-2.2250738585072014e-308"`
const DOUBLE_MAX_BYTES: usize = 24;
/// `"syn"` + 19 digits + `"."` + 19 digits
const ENTITY_ID_MAX_BYTES: usize = 42;

const ENTITY_ID_PREFIX: &str = "syn";

//==================================================================================
// 1. The ColumnType Enum
//==================================================================================

/// The closed set of column types a table may declare.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Boolean,
    Integer,
    Double,
    /// Epoch milliseconds.
    Date,
    String,
    Link,
    FileHandleId,
    EntityId,
    UserId,
}

impl ColumnType {
    /// Every variant, in declaration order.
    pub const ALL: [ColumnType; 9] = [
        ColumnType::Boolean,
        ColumnType::Integer,
        ColumnType::Double,
        ColumnType::Date,
        ColumnType::String,
        ColumnType::Link,
        ColumnType::FileHandleId,
        ColumnType::EntityId,
        ColumnType::UserId,
    ];

    /// Returns `true` for types whose empty string is a real value and whose
    /// size is bounded by the column's `max_size`.
    pub fn is_string_like(&self) -> bool {
        matches!(self, Self::String | Self::Link)
    }

    /// The canonical upper-case name, e.g. `"FILEHANDLEID"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Double => "DOUBLE",
            Self::Date => "DATE",
            Self::String => "STRING",
            Self::Link => "LINK",
            Self::FileHandleId => "FILEHANDLEID",
            Self::EntityId => "ENTITYID",
            Self::UserId => "USERID",
        }
    }

    /// Checks a raw, non-empty value against this type's syntax and returns its
    /// canonical rendering.
    ///
    /// `Ok(None)` means the value is absent: an empty string for every type that
    /// is not string-like. The `Err` payload is a human-readable reason; the
    /// caller attaches row/column coordinates.
    pub fn validate_syntax(
        &self,
        raw: &str,
        max_size: Option<usize>,
    ) -> Result<Option<String>, String> {
        if raw.is_empty() && !self.is_string_like() {
            return Ok(None);
        }
        let normalized = match self {
            Self::Boolean => {
                if raw.eq_ignore_ascii_case("true") {
                    "true".to_string()
                } else if raw.eq_ignore_ascii_case("false") {
                    "false".to_string()
                } else {
                    return Err(format!("'{}' is not 'true' or 'false'.", raw));
                }
            }
            Self::Integer | Self::FileHandleId | Self::UserId => parse_i64(raw)?.to_string(),
            Self::Date => parse_date_millis(raw)?.to_string(),
            Self::Double => render_double(parse_double(raw)?),
            Self::String | Self::Link => {
                let limit = max_size.unwrap_or(DEFAULT_MAX_STRING_SIZE);
                if raw.len() > limit {
                    return Err(format!(
                        "Value exceeds the maximum length of {} bytes (was {} bytes).",
                        limit,
                        raw.len()
                    ));
                }
                raw.to_string()
            }
            Self::EntityId => parse_entity_id(raw)?,
        };
        Ok(Some(normalized))
    }

    /// The worst-case number of bytes a canonical value of this type occupies.
    ///
    /// `max_size` is only consulted for string-like types.
    pub fn max_byte_size(&self, max_size: Option<usize>) -> usize {
        match self {
            Self::Boolean => BOOLEAN_MAX_BYTES,
            Self::Integer | Self::Date | Self::FileHandleId | Self::UserId => INTEGER_MAX_BYTES,
            Self::Double => DOUBLE_MAX_BYTES,
            Self::String | Self::Link => max_size.unwrap_or(DEFAULT_MAX_STRING_SIZE),
            Self::EntityId => ENTITY_ID_MAX_BYTES,
        }
    }

    /// The Arrow type used when rows are handed to a typed client.
    pub fn to_arrow_type(&self) -> ArrowDataType {
        match self {
            Self::Boolean => ArrowDataType::Boolean,
            Self::Integer | Self::FileHandleId | Self::UserId => ArrowDataType::Int64,
            Self::Double => ArrowDataType::Float64,
            Self::Date => ArrowDataType::Timestamp(TimeUnit::Millisecond, None),
            Self::String | Self::Link | Self::EntityId => ArrowDataType::Utf8,
        }
    }
}

/// Provides the canonical string representation for a `ColumnType`.
impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown column type: {}", s))
    }
}

//==================================================================================
// 2. Per-Type Parsing Helpers
//==================================================================================

fn parse_i64(raw: &str) -> Result<i64, String> {
    raw.parse::<i64>()
        .map_err(|_| format!("'{}' is not a 64-bit integer.", raw))
}

/// Epoch milliseconds, or one of the accepted calendar forms interpreted as UTC.
fn parse_date_millis(raw: &str) -> Result<i64, String> {
    if let Ok(millis) = raw.parse::<i64>() {
        return Ok(millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(dt.and_utc().timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    Err(format!(
        "'{}' is neither epoch milliseconds nor a recognized date.",
        raw
    ))
}

fn parse_double(raw: &str) -> Result<f64, String> {
    let lowered = raw.to_lowercase();
    match lowered.as_str() {
        "nan" => Ok(f64::NAN),
        "-nan" | "+nan" => Err(format!("'{}' is not a number; NaN carries no sign.", raw)),
        "inf" | "+inf" | "infinity" | "+infinity" | "∞" | "+∞" => Ok(f64::INFINITY),
        "-inf" | "-infinity" | "-∞" => Ok(f64::NEG_INFINITY),
        other => other
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number.", raw)),
    }
}

/// Special values use their conventional names; finite values use the shortest
/// form that parses back to the same bits.
fn render_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{:?}", value)
    }
}

/// Accepts `synNNN` and `synNNN.V`.
fn parse_entity_id(raw: &str) -> Result<String, String> {
    let invalid = || format!("'{}' is not an entity id of the form synNNN or synNNN.V.", raw);
    let body = match raw.get(..ENTITY_ID_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(ENTITY_ID_PREFIX) => {
            &raw[ENTITY_ID_PREFIX.len()..]
        }
        _ => return Err(invalid()),
    };
    let digits = |s: &str| -> Result<i64, String> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        s.parse::<i64>().map_err(|_| invalid())
    };
    match body.split_once('.') {
        Some((id, version)) => Ok(format!(
            "{}{}.{}",
            ENTITY_ID_PREFIX,
            digits(id)?,
            digits(version)?
        )),
        None => Ok(format!("{}{}", ENTITY_ID_PREFIX, digits(body)?)),
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(t: ColumnType, raw: &str) -> Option<String> {
        t.validate_syntax(raw, None).unwrap()
    }

    #[test]
    fn test_boolean_is_case_insensitive() {
        assert_eq!(ok(ColumnType::Boolean, "FalSE").as_deref(), Some("false"));
        assert_eq!(ok(ColumnType::Boolean, "TRUE").as_deref(), Some("true"));
        assert!(ColumnType::Boolean.validate_syntax("yes", None).is_err());
        assert!(ColumnType::Boolean.validate_syntax("1", None).is_err());
    }

    #[test]
    fn test_double_abstract_tokens() {
        for nan in ["nan", "NaN", "NAN"] {
            assert_eq!(ok(ColumnType::Double, nan).as_deref(), Some("NaN"));
        }
        for inf in ["inf", "+inf", "Infinity", "+INFINITY", "∞", "+∞"] {
            assert_eq!(ok(ColumnType::Double, inf).as_deref(), Some("Infinity"));
        }
        for neg in ["-inf", "-Infinity", "-∞"] {
            assert_eq!(ok(ColumnType::Double, neg).as_deref(), Some("-Infinity"));
        }
    }

    #[test]
    fn test_signed_nan_is_rejected() {
        for signed in ["-nan", "+NaN", "-NAN"] {
            assert!(ColumnType::Double.validate_syntax(signed, None).is_err(), "{}", signed);
        }
    }

    #[test]
    fn test_double_canonical_form_is_stable() {
        let first = ok(ColumnType::Double, "0.5e1");
        assert_eq!(first.as_deref(), Some("5.0"));
        assert_eq!(ok(ColumnType::Double, "0.5e1"), first);
        assert_eq!(ok(ColumnType::Double, "5"), first);
        assert_eq!(ok(ColumnType::Double, "-1.25").as_deref(), Some("-1.25"));
        assert!(ColumnType::Double.validate_syntax("1.2.3", None).is_err());
    }

    #[test]
    fn test_integer_like_types_normalize() {
        for t in [ColumnType::Integer, ColumnType::FileHandleId, ColumnType::UserId] {
            assert_eq!(ok(t, "+007").as_deref(), Some("7"));
            assert_eq!(
                ok(t, "-9223372036854775808").as_deref(),
                Some("-9223372036854775808")
            );
            assert!(t.validate_syntax("9223372036854775808", None).is_err());
            assert!(t.validate_syntax("1.5", None).is_err());
        }
    }

    #[test]
    fn test_date_accepts_millis_and_calendar_forms() {
        assert_eq!(ok(ColumnType::Date, "1234").as_deref(), Some("1234"));
        assert_eq!(ok(ColumnType::Date, "1970-01-02").as_deref(), Some("86400000"));
        assert_eq!(
            ok(ColumnType::Date, "1970-01-01 00:00:01.500").as_deref(),
            Some("1500")
        );
        assert_eq!(
            ok(ColumnType::Date, "1970-01-01T00:00:02Z").as_deref(),
            Some("2000")
        );
        assert!(ColumnType::Date.validate_syntax("tomorrow", None).is_err());
    }

    #[test]
    fn test_empty_value_law() {
        for t in ColumnType::ALL {
            let result = t.validate_syntax("", None).unwrap();
            if t.is_string_like() {
                assert_eq!(result.as_deref(), Some(""), "{} must keep empty", t);
            } else {
                assert_eq!(result, None, "{} must treat empty as absent", t);
            }
        }
    }

    #[test]
    fn test_string_limit_is_in_utf8_bytes() {
        // Four characters, eight bytes.
        let value = "éééé";
        assert!(ColumnType::String.validate_syntax(value, Some(8)).is_ok());
        let err = ColumnType::String
            .validate_syntax(value, Some(7))
            .unwrap_err();
        assert!(err.contains("7"), "message should cite the limit: {}", err);
        let err = ColumnType::Link
            .validate_syntax(&"x".repeat(51), None)
            .unwrap_err();
        assert!(err.contains("50"));
    }

    #[test]
    fn test_entity_id_forms() {
        assert_eq!(ok(ColumnType::EntityId, "syn123").as_deref(), Some("syn123"));
        assert_eq!(ok(ColumnType::EntityId, "SYN123.4").as_deref(), Some("syn123.4"));
        for bad in ["123", "syn", "syn12a", "syn1.", "syn1.2.3", "syn-1"] {
            assert!(
                ColumnType::EntityId.validate_syntax(bad, None).is_err(),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_max_byte_sizes() {
        assert_eq!(ColumnType::Boolean.max_byte_size(None), 5);
        assert_eq!(
            ColumnType::Integer.max_byte_size(Some(1000)),
            i64::MIN.to_string().len()
        );
        assert_eq!(ColumnType::Date.max_byte_size(None), 20);
        assert_eq!(
            ColumnType::Double.max_byte_size(None),
            render_double(-f64::MIN_POSITIVE).len()
        );
        assert_eq!(ColumnType::String.max_byte_size(Some(13)), 13);
        assert_eq!(ColumnType::Link.max_byte_size(None), DEFAULT_MAX_STRING_SIZE);
        assert_eq!(
            ColumnType::EntityId.max_byte_size(None),
            format!("syn{}.{}", i64::MAX, i64::MAX).len()
        );
    }

    #[test]
    fn test_name_round_trips_through_from_str_and_serde() {
        for t in ColumnType::ALL {
            assert_eq!(t.to_string().parse::<ColumnType>().unwrap(), t);
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t));
        }
        assert_eq!("filehandleid".parse::<ColumnType>(), Ok(ColumnType::FileHandleId));
    }
}
