//! Conversion of raw argument text into typed [`Value`]s.
//!
//! Every primitive is read with one fixed, culture-independent grammar. A
//! literal either parses into exactly the requested width or is rejected;
//! nothing is truncated, wrapped or guessed.

use crate::value::{Decimal, TypeTag, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::str::FromStr;

/// Why a raw argument was not turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The text is not a valid literal of the requested type.
    Malformed,
    /// The requested type has no textual form the console can parse.
    Unsupported,
}

const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse `raw` as a value of `declared_type`.
pub fn coerce(declared_type: TypeTag, raw: &str) -> Result<Value, Rejection> {
    let trimmed = raw.trim();
    match declared_type {
        TypeTag::String => Ok(Value::String(raw.to_string())),
        TypeTag::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(Rejection::Malformed),
            }
        }
        TypeTag::Bool => {
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(Rejection::Malformed)
            }
        }
        TypeTag::Byte => parse_exact(trimmed).map(Value::Byte),
        TypeTag::Int16 => parse_exact(trimmed).map(Value::Int16),
        TypeTag::Int32 => parse_exact(trimmed).map(Value::Int32),
        TypeTag::Int64 => parse_exact(trimmed).map(Value::Int64),
        TypeTag::UInt16 => parse_exact(trimmed).map(Value::UInt16),
        TypeTag::UInt32 => parse_exact(trimmed).map(Value::UInt32),
        TypeTag::UInt64 => parse_exact(trimmed).map(Value::UInt64),
        TypeTag::Single => {
            let x: f32 = parse_exact(trimmed)?;
            reject_overflow(x.is_infinite(), trimmed)?;
            Ok(Value::Single(x))
        }
        TypeTag::Double => {
            let x: f64 = parse_exact(trimmed)?;
            reject_overflow(x.is_infinite(), trimmed)?;
            Ok(Value::Double(x))
        }
        TypeTag::Decimal => parse_exact::<Decimal>(trimmed).map(Value::Decimal),
        TypeTag::DateTime => parse_date_time(trimmed).map(Value::DateTime),
        TypeTag::Object => Err(Rejection::Unsupported),
    }
}

fn parse_exact<T: FromStr>(text: &str) -> Result<T, Rejection> {
    text.parse().map_err(|_| Rejection::Malformed)
}

// Finite literals too large for the type come back as infinity.
fn reject_overflow(is_infinite: bool, text: &str) -> Result<(), Rejection> {
    if is_infinite && !text.to_ascii_lowercase().contains("inf") {
        return Err(Rejection::Malformed);
    }
    Ok(())
}

fn parse_date_time(text: &str) -> Result<NaiveDateTime, Rejection> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_utc());
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or(Rejection::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_is_identity() {
        assert_eq!(
            coerce(TypeTag::String, "  New York "),
            Ok(Value::String("  New York ".to_string()))
        );
        assert_eq!(coerce(TypeTag::String, ""), Ok(Value::String(String::new())));
    }

    #[test]
    fn test_int32_parses_and_rejects() {
        assert_eq!(coerce(TypeTag::Int32, "42"), Ok(Value::Int32(42)));
        assert_eq!(coerce(TypeTag::Int32, "-7"), Ok(Value::Int32(-7)));
        assert_eq!(coerce(TypeTag::Int32, "abc"), Err(Rejection::Malformed));
        assert_eq!(coerce(TypeTag::Int32, "4.0"), Err(Rejection::Malformed));
        assert_eq!(coerce(TypeTag::Int32, "2147483648"), Err(Rejection::Malformed));
    }

    #[test]
    fn test_integer_widths_are_exact() {
        assert_eq!(coerce(TypeTag::Byte, "255"), Ok(Value::Byte(255)));
        assert_eq!(coerce(TypeTag::Byte, "256"), Err(Rejection::Malformed));
        assert_eq!(coerce(TypeTag::Int16, "-32768"), Ok(Value::Int16(i16::MIN)));
        assert_eq!(coerce(TypeTag::UInt16, "-1"), Err(Rejection::Malformed));
        assert_eq!(coerce(TypeTag::UInt32, "4294967295"), Ok(Value::UInt32(u32::MAX)));
        assert_eq!(
            coerce(TypeTag::UInt64, "18446744073709551615"),
            Ok(Value::UInt64(u64::MAX))
        );
        assert_eq!(
            coerce(TypeTag::Int64, "9223372036854775808"),
            Err(Rejection::Malformed)
        );
    }

    #[test]
    fn test_bool_is_case_insensitive_and_strict() {
        assert_eq!(coerce(TypeTag::Bool, "true"), Ok(Value::Bool(true)));
        assert_eq!(coerce(TypeTag::Bool, "FALSE"), Ok(Value::Bool(false)));
        assert_eq!(coerce(TypeTag::Bool, "True"), Ok(Value::Bool(true)));
        assert_eq!(coerce(TypeTag::Bool, "yes"), Err(Rejection::Malformed));
        assert_eq!(coerce(TypeTag::Bool, "1"), Err(Rejection::Malformed));
    }

    #[test]
    fn test_char_needs_exactly_one_character() {
        assert_eq!(coerce(TypeTag::Char, "x"), Ok(Value::Char('x')));
        assert_eq!(coerce(TypeTag::Char, "ж"), Ok(Value::Char('ж')));
        assert_eq!(coerce(TypeTag::Char, ""), Err(Rejection::Malformed));
        assert_eq!(coerce(TypeTag::Char, "xy"), Err(Rejection::Malformed));
    }

    #[test]
    fn test_floats() {
        assert_eq!(coerce(TypeTag::Double, "2.5"), Ok(Value::Double(2.5)));
        assert_eq!(coerce(TypeTag::Double, "-1e3"), Ok(Value::Double(-1000.0)));
        assert_eq!(coerce(TypeTag::Single, "0.25"), Ok(Value::Single(0.25)));
        assert_eq!(coerce(TypeTag::Single, "1e39"), Err(Rejection::Malformed));
        assert_eq!(
            coerce(TypeTag::Double, "inf"),
            Ok(Value::Double(f64::INFINITY))
        );
        assert_eq!(coerce(TypeTag::Double, "1,5"), Err(Rejection::Malformed));
    }

    #[test]
    fn test_decimal() {
        let expected = Decimal::new(1050, 2).unwrap();
        assert_eq!(coerce(TypeTag::Decimal, "10.50"), Ok(Value::Decimal(expected)));
        assert_eq!(coerce(TypeTag::Decimal, "1e2"), Err(Rejection::Malformed));
    }

    #[test]
    fn test_date_time_formats() {
        let noon = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(
            coerce(TypeTag::DateTime, "2024-03-01T12:30:00"),
            Ok(Value::DateTime(noon))
        );
        assert_eq!(
            coerce(TypeTag::DateTime, "2024-03-01 12:30:00"),
            Ok(Value::DateTime(noon))
        );
        assert_eq!(
            coerce(TypeTag::DateTime, "2024-03-01T14:30:00+02:00"),
            Ok(Value::DateTime(noon))
        );
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            coerce(TypeTag::DateTime, "2024-03-01"),
            Ok(Value::DateTime(midnight))
        );
        assert_eq!(coerce(TypeTag::DateTime, "2024-02-30"), Err(Rejection::Malformed));
        assert_eq!(coerce(TypeTag::DateTime, "03/01/2024"), Err(Rejection::Malformed));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored_for_numbers() {
        assert_eq!(coerce(TypeTag::Int32, " 42 "), Ok(Value::Int32(42)));
    }

    #[test]
    fn test_object_is_unsupported() {
        assert_eq!(coerce(TypeTag::Object, "anything"), Err(Rejection::Unsupported));
    }
}
