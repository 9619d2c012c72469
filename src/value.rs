//! Typed values that arguments are coerced into before an operation is invoked.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Declared type of an operation parameter.
///
/// All variants except [`TypeTag::Object`] are primitives the coercer knows how
/// to parse. `Object` stands for anything else an operation may want to declare;
/// dispatching to such a parameter fails with an unsupported-type error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Bool,
    Byte,
    Char,
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Single,
    Double,
    Decimal,
    DateTime,
    Object,
}

impl TypeTag {
    /// Name shown in help listings and error messages.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::String => "String",
            TypeTag::Bool => "Bool",
            TypeTag::Byte => "Byte",
            TypeTag::Char => "Char",
            TypeTag::Int16 => "Int16",
            TypeTag::Int32 => "Int32",
            TypeTag::Int64 => "Int64",
            TypeTag::UInt16 => "UInt16",
            TypeTag::UInt32 => "UInt32",
            TypeTag::UInt64 => "UInt64",
            TypeTag::Single => "Single",
            TypeTag::Double => "Double",
            TypeTag::Decimal => "Decimal",
            TypeTag::DateTime => "DateTime",
            TypeTag::Object => "Object",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A coerced argument or a parameter's default value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Byte(u8),
    Char(char),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
}

impl Value {
    /// The tag a parameter must declare to hold this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::String(_) => TypeTag::String,
            Value::Bool(_) => TypeTag::Bool,
            Value::Byte(_) => TypeTag::Byte,
            Value::Char(_) => TypeTag::Char,
            Value::Int16(_) => TypeTag::Int16,
            Value::Int32(_) => TypeTag::Int32,
            Value::Int64(_) => TypeTag::Int64,
            Value::UInt16(_) => TypeTag::UInt16,
            Value::UInt32(_) => TypeTag::UInt32,
            Value::UInt64(_) => TypeTag::UInt64,
            Value::Single(_) => TypeTag::Single,
            Value::Double(_) => TypeTag::Double,
            Value::Decimal(_) => TypeTag::Decimal,
            Value::DateTime(_) => TypeTag::DateTime,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Byte(n) => write!(f, "{}", n),
            Value::Char(c) => write!(f, "{}", c),
            Value::Int16(n) => write!(f, "{}", n),
            Value::Int32(n) => write!(f, "{}", n),
            Value::Int64(n) => write!(f, "{}", n),
            Value::UInt16(n) => write!(f, "{}", n),
            Value::UInt32(n) => write!(f, "{}", n),
            Value::UInt64(n) => write!(f, "{}", n),
            Value::Single(x) => write!(f, "{}", x),
            Value::Double(x) => write!(f, "{}", x),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Conversion from a bound [`Value`] back to a plain Rust type.
///
/// Operations use this through [`crate::command::Arguments`] to read their
/// parameters without matching on `Value` themselves.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_value! {
    String => String,
    Bool => bool,
    Byte => u8,
    Char => char,
    Int16 => i16,
    Int32 => i32,
    Int64 => i64,
    UInt16 => u16,
    UInt32 => u32,
    UInt64 => u64,
    Single => f32,
    Double => f64,
    Decimal => Decimal,
    DateTime => NaiveDateTime,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// Fixed-point decimal number: `mantissa * 10^-scale`.
///
/// Holds a 96-bit signed magnitude and up to 28 fractional digits. Parsing never
/// rounds: literals that don't fit are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

const MAX_SCALE: u32 = 28;
const MAX_MANTISSA: i128 = (1 << 96) - 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid decimal literal")]
pub struct ParseDecimalError;

impl Decimal {
    /// Build a decimal from its raw parts, or `None` if they are out of range.
    pub fn new(mantissa: i128, scale: u32) -> Option<Self> {
        if scale > MAX_SCALE || mantissa.unsigned_abs() > MAX_MANTISSA as u128 {
            return None;
        }
        Some(Self { mantissa, scale })
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Round to `digits` fractional digits, halves away from zero.
    pub fn round(self, digits: u32) -> Self {
        if digits >= self.scale {
            return self;
        }
        let divisor = 10i128.pow(self.scale - digits);
        let mut quotient = self.mantissa / divisor;
        let remainder = self.mantissa % divisor;
        if remainder.abs() * 2 >= divisor {
            quotient += self.mantissa.signum();
        }
        Self {
            mantissa: quotient,
            scale: digits,
        }
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParseDecimalError);
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(ParseDecimalError);
        }
        let scale = u32::try_from(frac_part.len()).map_err(|_| ParseDecimalError)?;
        if scale > MAX_SCALE {
            return Err(ParseDecimalError);
        }

        let mut mantissa: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(b - b'0')))
                .filter(|m| *m <= MAX_MANTISSA)
                .ok_or(ParseDecimalError)?;
        }
        if negative {
            mantissa = -mantissa;
        }
        Ok(Self { mantissa, scale })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if self.mantissa < 0 {
            f.write_str("-")?;
        }
        if scale == 0 {
            return f.write_str(&digits);
        }
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{}.{}", int_part, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_decimal_parse_and_display() {
        assert_eq!(dec("12.50").to_string(), "12.50");
        assert_eq!(dec("-0.05").to_string(), "-0.05");
        assert_eq!(dec("+7").to_string(), "7");
        assert_eq!(dec(".5").to_string(), "0.5");
        assert_eq!(dec("3.").scale(), 0);
    }

    #[test]
    fn test_decimal_rejects_malformed_literals() {
        for bad in ["", "-", ".", "1e5", "1,5", "abc", "1.2.3", " 1"] {
            assert!(bad.parse::<Decimal>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_decimal_rejects_out_of_range() {
        // 2^96 has 29 digits and is one past the largest mantissa
        assert!("79228162514264337593543950336".parse::<Decimal>().is_err());
        assert!("79228162514264337593543950335".parse::<Decimal>().is_ok());
        assert!("0.00000000000000000000000000001".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_decimal_round_half_away_from_zero() {
        assert_eq!(dec("2.345").round(2), dec("2.35"));
        assert_eq!(dec("-2.345").round(2), dec("-2.35"));
        assert_eq!(dec("2.344").round(2), dec("2.34"));
        assert_eq!(dec("9.99").round(0), dec("10"));
        assert_eq!(dec("1.5").round(4), dec("1.5"));
    }

    #[test]
    fn test_from_value_checks_variant() {
        assert_eq!(i32::from_value(&Value::Int32(4)), Some(4));
        assert_eq!(i64::from_value(&Value::Int32(4)), None);
        assert_eq!(
            String::from_value(&Value::from("x")),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_value_reports_its_tag() {
        assert_eq!(Value::from(3u16).type_tag(), TypeTag::UInt16);
        assert_eq!(Value::from('c').type_tag(), TypeTag::Char);
        assert_eq!(TypeTag::Bool.to_string(), "Bool");
    }
}
