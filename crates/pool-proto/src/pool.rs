//! Pool data model and the validation rules every registry applies.
//!
//! A pool is a named capacity bucket. Names are unique within a registry,
//! and [`DEFAULT_POOL_NAME`] always exists.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProtoError;

/// Name of the system default pool.
pub const DEFAULT_POOL_NAME: &str = "default_pool";

/// Slot count given to the default pool when a registry creates it.
pub const DEFAULT_POOL_SLOTS: u32 = 128;

/// Description given to the default pool when a registry creates it.
pub const DEFAULT_POOL_DESCRIPTION: &str = "Default pool";

/// Longest accepted pool name, in characters.
pub const MAX_POOL_NAME_LEN: usize = 256;

/// A named, capacity-bounded pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Pool {
    /// Unique pool name.
    pub name: String,
    /// Slot capacity.
    pub slots: u32,
    /// Free-form description, possibly empty.
    #[serde(default)]
    pub description: String,
}

impl Pool {
    /// Create a pool value.
    #[must_use]
    pub fn new(name: impl Into<String>, slots: u32, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots,
            description: description.into(),
        }
    }

    /// The default pool as a fresh registry creates it.
    #[must_use]
    pub fn default_pool() -> Self {
        Self::new(DEFAULT_POOL_NAME, DEFAULT_POOL_SLOTS, DEFAULT_POOL_DESCRIPTION)
    }

    /// Whether this is the system default pool.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_POOL_NAME
    }
}

/// Validate a pool name.
///
/// # Errors
///
/// Returns [`ProtoError::Validation`] if the name is blank or longer than
/// [`MAX_POOL_NAME_LEN`] characters.
pub fn validate_name(name: &str) -> Result<(), ProtoError> {
    if name.trim().is_empty() {
        return Err(ProtoError::Validation("pool name shouldn't be empty".into()));
    }
    let len = name.chars().count();
    if len > MAX_POOL_NAME_LEN {
        return Err(ProtoError::Validation(format!(
            "pool name can't be more than {MAX_POOL_NAME_LEN} characters (got {len})"
        )));
    }
    Ok(())
}

/// Convert an integer-like JSON value into a slot count.
///
/// Integers, integral floats (`5.0`) and strings holding a base-10 integer
/// are accepted. Everything else, including negatives and booleans, is
/// rejected.
///
/// # Errors
///
/// Returns [`ProtoError::Validation`] when the value is not integer-like
/// or does not fit a non-negative `u32`.
pub fn parse_slots(value: &Value) -> Result<u32, ProtoError> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).map_err(|_| bad_slots(value));
            }
            if n.as_i64().is_some() {
                return Err(bad_slots(value));
            }
            match n.as_f64() {
                Some(f)
                    if f.is_finite()
                        && f.fract().abs() < f64::EPSILON
                        && (0.0..=f64::from(u32::MAX)).contains(&f) =>
                {
                    Ok(f as u32)
                }
                _ => Err(bad_slots(value)),
            }
        }
        Value::String(s) => parse_slots_str(s),
        _ => Err(bad_slots(value)),
    }
}

/// Parse a slot count given as text, as typed on a command line.
///
/// # Errors
///
/// Returns [`ProtoError::Validation`] when the text is not a non-negative
/// integer that fits a `u32`.
pub fn parse_slots_str(raw: &str) -> Result<u32, ProtoError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| ProtoError::Validation(format!("bad value for `slots`: {raw:?}")))
}

fn bad_slots(value: &Value) -> ProtoError {
    ProtoError::Validation(format!("bad value for `slots`: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn default_pool_shape() {
        let pool = Pool::default_pool();
        assert_eq!(pool.name, "default_pool");
        assert_eq!(pool.slots, 128);
        assert_eq!(pool.description, "Default pool");
        assert!(pool.is_default());
    }

    #[test]
    fn pool_ignores_unknown_fields_on_decode() {
        let pool: Pool = serde_json::from_str(
            r#"{"name":"gpu","slots":4,"description":"x","occupied_slots":2}"#,
        )
        .expect("should decode");
        assert_eq!(pool, Pool::new("gpu", 4, "x"));
    }

    #[test]
    fn pool_description_defaults_to_empty() {
        let pool: Pool =
            serde_json::from_str(r#"{"name":"gpu","slots":4}"#).expect("should decode");
        assert!(pool.description.is_empty());
    }

    #[test_case(json!(5) => Ok(5); "integer")]
    #[test_case(json!(0) => Ok(0); "zero")]
    #[test_case(json!(5.0) => Ok(5); "integral float")]
    #[test_case(json!(1e3) => Ok(1000); "exponent float")]
    #[test_case(json!("12") => Ok(12); "numeric string")]
    #[test_case(json!(" 7 ") => Ok(7); "padded string")]
    #[test_case(json!(4_294_967_295_u64) => Ok(u32::MAX); "u32 max")]
    fn parse_slots_accepts(value: Value) -> Result<u32, ProtoError> {
        parse_slots(&value)
    }

    #[test_case(json!(-1); "negative")]
    #[test_case(json!(2.5); "fractional")]
    #[test_case(json!(7.000_001); "nearly integral")]
    #[test_case(json!(true); "boolean")]
    #[test_case(json!(null); "null")]
    #[test_case(json!("ten"); "word")]
    #[test_case(json!([1]); "array")]
    #[test_case(json!(4_294_967_296_u64); "overflow")]
    fn parse_slots_rejects(value: Value) {
        let err = parse_slots(&value).expect_err("should reject");
        assert!(matches!(err, ProtoError::Validation(_)));
        assert!(err.to_string().contains("bad value for `slots`"));
    }

    #[test]
    fn parse_slots_str_rejects_negative() {
        assert!(parse_slots_str("-3").is_err());
        assert_eq!(parse_slots_str("+3"), Ok(3));
    }

    #[test]
    fn validate_name_rules() {
        assert!(validate_name("gpu").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"p".repeat(MAX_POOL_NAME_LEN)).is_ok());
        let err = validate_name(&"p".repeat(MAX_POOL_NAME_LEN + 1)).expect_err("too long");
        assert!(err.to_string().contains("257"));
    }
}
