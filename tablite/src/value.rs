///
/// The closed primitive value model.
///
/// A `Value` is used uniformly for parameter binding and for row
/// decoding. Exactly one tag is active and the textual rendering is
/// unambiguous per tag.
///
/// Conversion rules:
/// - ToValue widens on the write path: all signed widths to Signed(i64),
///   all unsigned widths to Unsigned(u64), both float widths to
///   Real(f64). Nothing is truncated on the way in.
/// - FromValue narrows on the read path and is checked: an engine value
///   that does not fit the caller's field fails with DecodeError::Narrow
///   instead of wrapping. Integers widen into float fields; Text never
///   parses into numbers.
///

use std::fmt;

use crate::errors::DecodeError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Real(f64),
    Text(String),
}

impl Value {
    /// The tag name, used in decode mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Signed(_) => "signed",
            Value::Unsigned(_) => "unsigned",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Signed(i) => write!(f, "{}", i),
            Value::Unsigned(u) => write!(f, "{}", u),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for i8 {
    fn to_value(&self) -> Value {
        Value::Signed(i64::from(*self))
    }
}

impl ToValue for i16 {
    fn to_value(&self) -> Value {
        Value::Signed(i64::from(*self))
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Signed(i64::from(*self))
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Signed(*self)
    }
}

impl ToValue for u8 {
    fn to_value(&self) -> Value {
        Value::Unsigned(u64::from(*self))
    }
}

impl ToValue for u16 {
    fn to_value(&self) -> Value {
        Value::Unsigned(u64::from(*self))
    }
}

impl ToValue for u32 {
    fn to_value(&self) -> Value {
        Value::Unsigned(u64::from(*self))
    }
}

impl ToValue for u64 {
    fn to_value(&self) -> Value {
        Value::Unsigned(*self)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, DecodeError>;
}

/// Pulls the integer payload out of a value, or reports what was found.
fn integer_of(value: &Value, target: &'static str) -> Result<i64, DecodeError> {
    match value {
        Value::Signed(i) => Ok(*i),
        Value::Unsigned(u) => i64::try_from(*u).map_err(|_| {
            DecodeError::Narrow {
                value: u.to_string(),
                target,
            }
            .logged()
        }),
        Value::Bool(b) => Ok(i64::from(*b)),
        other => Err(DecodeError::Mismatch {
            found: other.kind_name(),
            target,
        }
        .logged()),
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        integer_of(&value, "i64")
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        let wide = integer_of(&value, "i32")?;
        i32::try_from(wide).map_err(|_| {
            DecodeError::Narrow {
                value: wide.to_string(),
                target: "i32",
            }
            .logged()
        })
    }
}

impl FromValue for i16 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        let wide = integer_of(&value, "i16")?;
        i16::try_from(wide).map_err(|_| {
            DecodeError::Narrow {
                value: wide.to_string(),
                target: "i16",
            }
            .logged()
        })
    }
}

impl FromValue for i8 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        let wide = integer_of(&value, "i8")?;
        i8::try_from(wide).map_err(|_| {
            DecodeError::Narrow {
                value: wide.to_string(),
                target: "i8",
            }
            .logged()
        })
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Unsigned(u) => Ok(u),
            other => {
                let wide = integer_of(&other, "u64")?;
                u64::try_from(wide).map_err(|_| {
                    DecodeError::Narrow {
                        value: wide.to_string(),
                        target: "u64",
                    }
                    .logged()
                })
            }
        }
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        let wide = u64::from_value(value)?;
        u32::try_from(wide).map_err(|_| {
            DecodeError::Narrow {
                value: wide.to_string(),
                target: "u32",
            }
            .logged()
        })
    }
}

impl FromValue for u16 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        let wide = u64::from_value(value)?;
        u16::try_from(wide).map_err(|_| {
            DecodeError::Narrow {
                value: wide.to_string(),
                target: "u16",
            }
            .logged()
        })
    }
}

impl FromValue for u8 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        let wide = u64::from_value(value)?;
        u8::try_from(wide).map_err(|_| {
            DecodeError::Narrow {
                value: wide.to_string(),
                target: "u8",
            }
            .logged()
        })
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Signed(i) => Ok(i != 0),
            Value::Unsigned(u) => Ok(u != 0),
            other => Err(DecodeError::Mismatch {
                found: other.kind_name(),
                target: "bool",
            }
            .logged()),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Real(r) => Ok(r),
            Value::Signed(i) => Ok(i as f64),
            Value::Unsigned(u) => Ok(u as f64),
            other => Err(DecodeError::Mismatch {
                found: other.kind_name(),
                target: "f64",
            }
            .logged()),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        // rounding conversion, not a range check
        Ok(f64::from_value(value)? as f32)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(DecodeError::Mismatch {
                found: other.kind_name(),
                target: "String",
            }
            .logged()),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => Ok(Some(T::from_value(other)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_unambiguous_per_tag() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Signed(-7).to_string(), "-7");
        assert_eq!(Value::Unsigned(7).to_string(), "7");
        assert_eq!(Value::Real(1.5).to_string(), "1.5");
        assert_eq!(Value::Text("ok".to_string()).to_string(), "ok");
    }

    #[test]
    fn test_widening_to_value() {
        assert_eq!(42i8.to_value(), Value::Signed(42));
        assert_eq!(42i16.to_value(), Value::Signed(42));
        assert_eq!(42i32.to_value(), Value::Signed(42));
        assert_eq!(42i64.to_value(), Value::Signed(42));
        assert_eq!(42u8.to_value(), Value::Unsigned(42));
        assert_eq!(42u64.to_value(), Value::Unsigned(42));
        assert_eq!(1.5f32.to_value(), Value::Real(1.5));
        assert_eq!(true.to_value(), Value::Bool(true));
        assert_eq!("hi".to_value(), Value::Text("hi".to_string()));
        assert_eq!(None::<i64>.to_value(), Value::Null);
        assert_eq!(Some(3i64).to_value(), Value::Signed(3));
    }

    #[test]
    fn test_checked_narrowing_rejects_overflow() {
        let err = u16::from_value(Value::Signed(70_000)).unwrap_err();
        assert!(
            matches!(err, DecodeError::Narrow { .. }),
            "70000 must not fit in u16, got {:?}",
            err
        );

        let err = u32::from_value(Value::Signed(-1)).unwrap_err();
        assert!(
            matches!(err, DecodeError::Narrow { .. }),
            "negative values must not decode as unsigned"
        );

        let err = i8::from_value(Value::Signed(200)).unwrap_err();
        assert!(matches!(err, DecodeError::Narrow { .. }));

        let err = i64::from_value(Value::Unsigned(u64::MAX)).unwrap_err();
        assert!(matches!(err, DecodeError::Narrow { .. }));
    }

    #[test]
    fn test_narrowing_accepts_in_range_values() {
        assert_eq!(i16::from_value(Value::Signed(-300)).unwrap(), -300);
        assert_eq!(u8::from_value(Value::Signed(255)).unwrap(), 255);
        assert_eq!(i64::from_value(Value::Signed(i64::MAX)).unwrap(), i64::MAX);
        assert_eq!(u64::from_value(Value::Unsigned(u64::MAX)).unwrap(), u64::MAX);
    }

    #[test]
    fn test_integers_widen_into_float_fields() {
        assert_eq!(f64::from_value(Value::Signed(3)).unwrap(), 3.0);
        assert_eq!(f32::from_value(Value::Real(1.5)).unwrap(), 1.5f32);
    }

    #[test]
    fn test_cross_kind_decoding_is_rejected() {
        let err = i64::from_value(Value::Text("12".to_string())).unwrap_err();
        assert!(matches!(err, DecodeError::Mismatch { .. }));

        let err = String::from_value(Value::Signed(12)).unwrap_err();
        assert!(matches!(err, DecodeError::Mismatch { .. }));

        let err = i64::from_value(Value::Real(1.5)).unwrap_err();
        assert!(
            matches!(err, DecodeError::Mismatch { .. }),
            "reals must not silently truncate into integers"
        );
    }

    #[test]
    fn test_bool_decodes_any_nonzero_integer() {
        assert!(bool::from_value(Value::Signed(1)).unwrap());
        assert!(bool::from_value(Value::Signed(-3)).unwrap());
        assert!(!bool::from_value(Value::Signed(0)).unwrap());
    }

    #[test]
    fn test_optional_decodes_null_to_none() {
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i64>::from_value(Value::Signed(9)).unwrap(),
            Some(9)
        );

        let err = i64::from_value(Value::Null).unwrap_err();
        assert!(
            matches!(err, DecodeError::Mismatch { .. }),
            "null must not decode into a required field"
        );
    }
}
