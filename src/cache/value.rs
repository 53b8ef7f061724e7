//! Cache Value Module
//!
//! Tagged payload stored by every backend, and the `Caster` typed accessor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

// == Cache Value ==
/// A value held by a cache backend.
///
/// Serialized untagged, so JSON `5` is an `Int`, `2.5` a `Float`, `"abc"` a
/// `Str` and `[1, 2]` a `Bytes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl CacheValue {
    /// Short name of the variant, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheValue::Int(_) => "int",
            CacheValue::Float(_) => "float",
            CacheValue::Str(_) => "string",
            CacheValue::Bytes(_) => "bytes",
        }
    }

    /// Builds a value from raw bytes, preferring `Str` when they are UTF-8.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(s) => CacheValue::Str(s),
            Err(e) => CacheValue::Bytes(e.into_bytes()),
        }
    }

    /// Integer view of the value, if it has one.
    pub(crate) fn as_i64(&self) -> Option<i64> {
        match self {
            CacheValue::Int(n) => Some(*n),
            CacheValue::Float(f) => integral(*f),
            CacheValue::Str(s) => parse_i64(s),
            CacheValue::Bytes(b) => std::str::from_utf8(b).ok().and_then(parse_i64),
        }
    }

    /// Float view of the value, if it has one.
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            CacheValue::Int(n) => Some(*n as f64),
            CacheValue::Float(f) => Some(*f),
            CacheValue::Str(s) => s.trim().parse().ok(),
            CacheValue::Bytes(b) => std::str::from_utf8(b)
                .ok()
                .and_then(|s| s.trim().parse().ok()),
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    // 2^63 is the first float outside i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_i64(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(integral))
}

impl fmt::Display for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheValue::Int(n) => write!(f, "{n}"),
            CacheValue::Float(x) => write!(f, "{x}"),
            CacheValue::Str(s) => f.write_str(s),
            CacheValue::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

impl From<i64> for CacheValue {
    fn from(v: i64) -> Self {
        CacheValue::Int(v)
    }
}

impl From<i32> for CacheValue {
    fn from(v: i32) -> Self {
        CacheValue::Int(v.into())
    }
}

impl From<u32> for CacheValue {
    fn from(v: u32) -> Self {
        CacheValue::Int(v.into())
    }
}

impl From<f64> for CacheValue {
    fn from(v: f64) -> Self {
        CacheValue::Float(v)
    }
}

impl From<String> for CacheValue {
    fn from(v: String) -> Self {
        CacheValue::Str(v)
    }
}

impl From<&str> for CacheValue {
    fn from(v: &str) -> Self {
        CacheValue::Str(v.to_string())
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(v: Vec<u8>) -> Self {
        CacheValue::Bytes(v)
    }
}

// == Caster ==
/// Typed accessor over a possibly-absent cache value.
///
/// Conversions fail with [`CacheError::TypeMismatch`] instead of guessing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Caster {
    value: Option<CacheValue>,
}

impl Caster {
    pub fn new(value: Option<CacheValue>) -> Self {
        Self { value }
    }

    /// True when the key was absent.
    pub fn is_nil(&self) -> bool {
        self.value.is_none()
    }

    pub fn value(&self) -> Option<&CacheValue> {
        self.value.as_ref()
    }

    pub fn into_inner(self) -> Option<CacheValue> {
        self.value
    }

    /// Reads the value as an integer. Floats must be integral.
    pub fn to_i64(&self) -> CacheResult<i64> {
        self.convert("i64", CacheValue::as_i64)
    }

    pub fn to_f64(&self) -> CacheResult<f64> {
        self.convert("f64", CacheValue::as_f64)
    }

    /// Reads the value as text. Numbers are formatted, bytes must be UTF-8.
    pub fn to_string_value(&self) -> CacheResult<String> {
        self.convert("string", |v| match v {
            CacheValue::Bytes(b) => String::from_utf8(b.clone()).ok(),
            other => Some(other.to_string()),
        })
    }

    fn convert<T>(
        &self,
        expected: &'static str,
        f: impl FnOnce(&CacheValue) -> Option<T>,
    ) -> CacheResult<T> {
        let value = self.value.as_ref().ok_or(CacheError::TypeMismatch {
            expected,
            found: "nil",
        })?;
        f(value).ok_or(CacheError::TypeMismatch {
            expected,
            found: value.kind(),
        })
    }
}

impl From<Option<CacheValue>> for Caster {
    fn from(value: Option<CacheValue>) -> Self {
        Self::new(value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn cast(v: impl Into<CacheValue>) -> Caster {
        Caster::new(Some(v.into()))
    }

    #[test]
    fn test_int_from_numeric_variants() {
        assert_eq!(cast(42i64).to_i64().unwrap(), 42);
        assert_eq!(cast(3.0).to_i64().unwrap(), 3);
        assert_eq!(cast(" -7 ").to_i64().unwrap(), -7);
        assert_eq!(cast("12.0").to_i64().unwrap(), 12);
        assert_eq!(cast(b"19".to_vec()).to_i64().unwrap(), 19);
    }

    #[test]
    fn test_int_rejects_fractional_and_text() {
        assert!(matches!(
            cast(2.5).to_i64(),
            Err(CacheError::TypeMismatch { found: "float", .. })
        ));
        assert!(matches!(
            cast("abc").to_i64(),
            Err(CacheError::TypeMismatch { found: "string", .. })
        ));
        assert!(cast(f64::NAN).to_i64().is_err());
        assert!(cast(1e300).to_i64().is_err());
    }

    #[test]
    fn test_float_conversions() {
        assert_eq!(cast(4i64).to_f64().unwrap(), 4.0);
        assert_eq!(cast("2.25").to_f64().unwrap(), 2.25);
        assert!(cast("two").to_f64().is_err());
    }

    #[test]
    fn test_string_conversions() {
        assert_eq!(cast("code").to_string_value().unwrap(), "code");
        assert_eq!(cast(12i64).to_string_value().unwrap(), "12");
        assert_eq!(cast(1.5).to_string_value().unwrap(), "1.5");
        assert!(cast(vec![0xff, 0xfe]).to_string_value().is_err());
    }

    #[test]
    fn test_nil_caster() {
        let caster = Caster::default();
        assert!(caster.is_nil());
        assert!(matches!(
            caster.to_i64(),
            Err(CacheError::TypeMismatch { found: "nil", .. })
        ));
    }

    #[test]
    fn test_from_bytes_prefers_string() {
        assert_eq!(
            CacheValue::from_bytes(b"hello".to_vec()),
            CacheValue::Str("hello".to_string())
        );
        assert_eq!(
            CacheValue::from_bytes(vec![0xff]),
            CacheValue::Bytes(vec![0xff])
        );
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<CacheValue> = serde_json::from_str(r#"[5, 2.5, "x", [1, 2]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CacheValue::Int(5),
                CacheValue::Float(2.5),
                CacheValue::Str("x".to_string()),
                CacheValue::Bytes(vec![1, 2]),
            ]
        );
    }
}
