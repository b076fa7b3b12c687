use core::fmt;

use serde::{Deserialize, Serialize};

/// A value read from or written to the engine.
///
/// The automation interface is string-typed on the wire; numbers and text are
/// kept apart here so numeric reads fail loudly instead of parsing garbage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OracleValue {
    Number(f64),
    Text(String),
}

impl OracleValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for OracleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for OracleValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for OracleValue {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for OracleValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for OracleValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
