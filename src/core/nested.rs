//! Purpose: Script-side nested sequence values and their JSON boundary.
//! Exports: `Nested` plus `from_json`/`to_json` conversions.
//! Role: The caller-owned representation the marshalling layer reads and
//! writes; never retained by this crate after a call returns.
//! Invariants: A complex leaf maps to exactly `{"re": .., "im": ..}`;
//! `null` and any other object shape are rejected at the boundary.

use serde_json::Value;

use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Complex, Scalar};

/// A leaf scalar or an ordered collection of sub-values.
///
/// Rectangularity is a convention, not an invariant of this type; the
/// writer enforces it against the inferred shape and rejects ragged input.
#[derive(Clone, Debug, PartialEq)]
pub enum Nested {
    Leaf(Scalar),
    Seq(Vec<Nested>),
}

impl Nested {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Nested::Leaf(_))
    }

    pub fn as_seq(&self) -> Option<&[Nested]> {
        match self {
            Nested::Seq(items) => Some(items),
            Nested::Leaf(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Nested::Leaf(scalar) => Some(scalar),
            Nested::Seq(_) => None,
        }
    }

    /// Decode a JSON value. Numbers become `Integer` when they are exact
    /// 64-bit integers and `Real` otherwise (unsigned values above
    /// `i64::MAX` included).
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Bool(v) => Ok(Nested::Leaf(Scalar::Boolean(*v))),
            Value::Number(number) => {
                if let Some(v) = number.as_i64() {
                    Ok(Nested::Leaf(Scalar::Integer(v)))
                } else if let Some(v) = number.as_f64() {
                    Ok(Nested::Leaf(Scalar::Real(v)))
                } else {
                    Err(Error::new(ErrorKind::UnsupportedKind)
                        .with_message(format!("number {number} fits no supported kind")))
                }
            }
            Value::String(v) => Ok(Nested::Leaf(Scalar::Text(v.clone()))),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(Nested::from_json(item)?);
                }
                Ok(Nested::Seq(out))
            }
            Value::Object(_) => serde_json::from_value::<Complex>(value.clone())
                .map(|complex| Nested::Leaf(Scalar::Complex(complex)))
                .map_err(|err| {
                    Error::new(ErrorKind::UnsupportedKind)
                        .with_message("objects other than {\"re\", \"im\"} have no variant kind")
                        .with_source(err)
                }),
            Value::Null => Err(Error::new(ErrorKind::UnsupportedKind)
                .with_message("null has no variant kind")),
        }
    }

    /// Encode back to JSON. Non-finite reals have no JSON number form and
    /// encode as `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Nested::Leaf(Scalar::Boolean(v)) => Value::from(*v),
            Nested::Leaf(Scalar::Integer(v)) => Value::from(*v),
            Nested::Leaf(Scalar::Real(v)) => Value::from(*v),
            Nested::Leaf(Scalar::Complex(v)) => serde_json::json!({ "re": v.re, "im": v.im }),
            Nested::Leaf(Scalar::Text(v)) => Value::from(v.as_str()),
            Nested::Seq(items) => Value::Array(items.iter().map(Nested::to_json).collect()),
        }
    }
}

impl From<Scalar> for Nested {
    fn from(value: Scalar) -> Self {
        Nested::Leaf(value)
    }
}

impl From<bool> for Nested {
    fn from(value: bool) -> Self {
        Nested::Leaf(Scalar::Boolean(value))
    }
}

impl From<i64> for Nested {
    fn from(value: i64) -> Self {
        Nested::Leaf(Scalar::Integer(value))
    }
}

impl From<f64> for Nested {
    fn from(value: f64) -> Self {
        Nested::Leaf(Scalar::Real(value))
    }
}

impl From<Complex> for Nested {
    fn from(value: Complex) -> Self {
        Nested::Leaf(Scalar::Complex(value))
    }
}

impl From<&str> for Nested {
    fn from(value: &str) -> Self {
        Nested::Leaf(Scalar::Text(value.to_string()))
    }
}
