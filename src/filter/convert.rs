//! Built-in type conversions
//!
//! Conversions are addressed by a numeric code in definitions. They are pure
//! coercions: they can never be inverted.
//!
//! | Code | Conversion | Target |
//! |---|---|---|
//! | 1 | [`Conversion::ToInt`] | `int` |
//! | 2 | [`Conversion::ToFloat`] | `float` |
//! | 3 | [`Conversion::ToStr`] | `string` |
//! | 4 | [`Conversion::ToBool`] | `bool` |
//!
//! A source kind with no conversion to the target at all fails with
//! `UNSUPPORTED_CONVERSION`; a supported kind whose particular value does not
//! convert (`"x"` to int) fails with `INCONVERTABLE`.

use super::Filter;
use crate::{ErrorKind, ErrorRecord, Value, ValueKind};

/// A built-in conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    /// Convert to `Int`
    ToInt,
    /// Convert to `Float`
    ToFloat,
    /// Convert to `Str`
    ToStr,
    /// Convert to `Bool`
    ToBool,
}

/// Convert to an integer.
pub fn to_int() -> Conversion {
    Conversion::ToInt
}

/// Convert to a float.
pub fn to_float() -> Conversion {
    Conversion::ToFloat
}

/// Convert to a string.
pub fn to_str() -> Conversion {
    Conversion::ToStr
}

/// Convert to a boolean.
pub fn to_bool() -> Conversion {
    Conversion::ToBool
}

impl Conversion {
    /// Look up a conversion by code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Conversion::ToInt),
            2 => Some(Conversion::ToFloat),
            3 => Some(Conversion::ToStr),
            4 => Some(Conversion::ToBool),
            _ => None,
        }
    }

    /// The code of this conversion.
    pub fn code(self) -> i64 {
        match self {
            Conversion::ToInt => 1,
            Conversion::ToFloat => 2,
            Conversion::ToStr => 3,
            Conversion::ToBool => 4,
        }
    }

    /// The kind produced by this conversion.
    pub fn target(self) -> ValueKind {
        match self {
            Conversion::ToInt => ValueKind::Int,
            Conversion::ToFloat => ValueKind::Float,
            Conversion::ToStr => ValueKind::Str,
            Conversion::ToBool => ValueKind::Bool,
        }
    }

    /// Registry name of this conversion.
    pub fn name(self) -> &'static str {
        match self {
            Conversion::ToInt => "to_int",
            Conversion::ToFloat => "to_float",
            Conversion::ToStr => "to_string",
            Conversion::ToBool => "to_bool",
        }
    }

    fn unsupported(self, value: &Value) -> ErrorRecord {
        ErrorRecord::new(
            ErrorKind::UnsupportedConversion,
            format!("cannot convert {} to {}", value.kind(), self.target()),
        )
        .with_context("target", self.target().name())
    }

    fn inconvertable(self, value: &Value) -> ErrorRecord {
        ErrorRecord::new(
            ErrorKind::Inconvertable,
            format!("{} cannot be converted to {}", value, self.target()),
        )
        .with_context("target", self.target().name())
    }

    fn convert_int(self, value: Value) -> Result<Value, ErrorRecord> {
        match &value {
            Value::Int(_) => Ok(value),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            // i64::MAX is not representable; as f64 it rounds up to 2^63
            Value::Float(x) if x.fract() == 0.0 && *x >= i64::MIN as f64 && *x < i64::MAX as f64 => {
                Ok(Value::Int(*x as i64))
            }
            Value::Float(_) => Err(self.inconvertable(&value)),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.inconvertable(&value)),
            Value::Null | Value::List(_) | Value::Map(_) => Err(self.unsupported(&value)),
        }
    }

    fn convert_float(self, value: Value) -> Result<Value, ErrorRecord> {
        match &value {
            Value::Float(_) => Ok(value),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
            Value::Str(s) => match s.trim().parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(Value::Float(x)),
                _ => Err(self.inconvertable(&value)),
            },
            Value::Null | Value::List(_) | Value::Map(_) => Err(self.unsupported(&value)),
        }
    }

    fn convert_str(self, value: Value) -> Result<Value, ErrorRecord> {
        match value {
            Value::Str(_) => Ok(value),
            Value::Int(i) => Ok(Value::Str(i.to_string())),
            Value::Float(x) => Ok(Value::Str(x.to_string())),
            Value::Bool(b) => Ok(Value::Str(b.to_string())),
            Value::Null | Value::List(_) | Value::Map(_) => Err(self.unsupported(&value)),
        }
    }

    fn convert_bool(self, value: Value) -> Result<Value, ErrorRecord> {
        match &value {
            Value::Bool(_) => Ok(value),
            Value::Int(0) => Ok(Value::Bool(false)),
            Value::Int(1) => Ok(Value::Bool(true)),
            Value::Int(_) => Err(self.inconvertable(&value)),
            Value::Float(x) if *x == 0.0 => Ok(Value::Bool(false)),
            Value::Float(x) if *x == 1.0 => Ok(Value::Bool(true)),
            Value::Float(_) => Err(self.inconvertable(&value)),
            Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(self.inconvertable(&value)),
            },
            Value::Null | Value::List(_) | Value::Map(_) => Err(self.unsupported(&value)),
        }
    }
}

impl Filter for Conversion {
    fn filter(&self, value: Value) -> Result<Value, ErrorRecord> {
        match self {
            Conversion::ToInt => self.convert_int(value),
            Conversion::ToFloat => self.convert_float(value),
            Conversion::ToStr => self.convert_str(value),
            Conversion::ToBool => self.convert_bool(value),
        }
    }

    fn invertible(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        self.name().to_string()
    }
}
