//! Scalar values and on-disk type tags

use crate::error::{QexError, QexResult};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// 속성 타입 태그 — 헤더 페이지에 1바이트로 저장됨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// 64-bit signed integer
    Integer = 1,
    /// Length-prefixed text (at most 255 bytes)
    Text = 2,
    /// Day number held as a float
    Date = 3,
    /// Second of day held as a float
    Time = 4,
    /// Generic 64-bit float
    Float = 5,
}

impl TypeTag {
    /// Decode a header type byte.
    pub fn from_byte(byte: u8) -> QexResult<Self> {
        match byte {
            1 => Ok(TypeTag::Integer),
            2 => Ok(TypeTag::Text),
            3 => Ok(TypeTag::Date),
            4 => Ok(TypeTag::Time),
            5 => Ok(TypeTag::Float),
            other => Err(QexError::CorruptPage(format!("unknown type tag {}", other))),
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// SUM/AVG are only defined for these tags.
    pub fn is_numeric(self) -> bool {
        matches!(self, TypeTag::Integer | TypeTag::Float)
    }

    /// Date, time and float all travel as an 8-byte float.
    pub fn is_float_like(self) -> bool {
        matches!(self, TypeTag::Date | TypeTag::Time | TypeTag::Float)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Integer => "Integer",
            TypeTag::Text => "Text",
            TypeTag::Date => "Date",
            TypeTag::Time => "Time",
            TypeTag::Float => "Float",
        };
        f.write_str(name)
    }
}

/// Represents a scalar value carried in a tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    /// Materialized sub-query result; never written to a page
    File(PathBuf),
}

impl Value {
    /// Variant name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Text(_) => "Text",
            Value::File(_) => "File",
        }
    }

    /// Whether this value can be stored in a column of the given tag.
    pub fn matches_tag(&self, tag: TypeTag) -> bool {
        match self {
            Value::Integer(_) => tag == TypeTag::Integer,
            Value::Float(_) => tag.is_float_like(),
            Value::Text(_) => tag == TypeTag::Text,
            Value::File(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Strict comparison: both values must carry the same tag.
    ///
    /// Floats use IEEE total order so that sorting never sees an
    /// incomparable pair; `-0.0` and `0.0` compare equal.
    pub fn compare(&self, other: &Value) -> QexResult<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => Ok(float_cmp(*a, *b)),
            (Value::Text(a), Value::Text(b)) => Ok(a.as_bytes().cmp(b.as_bytes())),
            (Value::File(a), Value::File(b)) => Ok(a.cmp(b)),
            (a, b) => Err(QexError::type_mismatch(a.kind(), b.kind())),
        }
    }

    /// Comparison with Integer↔Float promotion.
    pub fn compare_promoted(&self, other: &Value) -> QexResult<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Float(b)) => Ok(float_cmp(*a as f64, *b)),
            (Value::Float(a), Value::Integer(b)) => Ok(float_cmp(*a, *b as f64)),
            _ => self.compare(other),
        }
    }

    /// Same-tag addition used by SUM; integers are overflow-checked.
    pub fn checked_add(&self, other: &Value) -> QexResult<Value> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a
                .checked_add(*b)
                .map(Value::Integer)
                .ok_or_else(|| QexError::ArithmeticOverflow(format!("{} + {}", a, b))),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
            (a, b) => Err(QexError::type_mismatch(a.kind(), b.kind())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Text(v) => f.write_str(v),
            Value::File(p) => write!(f, "<{}>", p.display()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// IEEE total order with both zeros folded together.
fn float_cmp(a: f64, b: f64) -> Ordering {
    let zero = |v: f64| if v == 0.0 { 0.0 } else { v };
    zero(a).total_cmp(&zero(b))
}
