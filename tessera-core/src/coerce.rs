//! Scalar coercion between value kinds.
//!
//! | target | strict            | lenient also accepts                      |
//! |--------|-------------------|-------------------------------------------|
//! | int    | int               | numeric string, whole float, bool         |
//! | float  | float, int        | numeric string                            |
//! | string | string            | int, float                                |
//! | bool   | bool              | int 0/1, `"true"`/`"false"`/`"1"`/`"0"`   |

use alloc::string::ToString;

use crate::{ScalarKind, Value, ValueKind};

/// A value that could not be coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// The requested kind.
    pub expected: ScalarKind,
    /// What was found.
    pub found: ValueKind,
}

/// Converts a scalar value to `target`.
///
/// Int always widens to float; every other conversion needs `strict` off.
pub fn coerce(value: Value, target: ScalarKind, strict: bool) -> Result<Value, Mismatch> {
    let found = value.kind();
    let mismatch = Mismatch {
        expected: target,
        found,
    };

    let coerced = match (target, value) {
        (ScalarKind::Int, v @ Value::Int(_))
        | (ScalarKind::Float, v @ Value::Float(_))
        | (ScalarKind::Bool, v @ Value::Bool(_))
        | (ScalarKind::String, v @ Value::String(_)) => Some(v),
        (ScalarKind::Float, Value::Int(i)) => Some(Value::Float(i as f64)),
        _ if strict => None,
        (ScalarKind::Int, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::Int),
        (ScalarKind::Int, Value::Float(f)) => whole(f).map(Value::Int),
        (ScalarKind::Int, Value::Bool(b)) => Some(Value::Int(i64::from(b))),
        (ScalarKind::Float, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float),
        (ScalarKind::String, Value::Int(i)) => Some(Value::String(i.to_string())),
        (ScalarKind::String, Value::Float(f)) => Some(Value::String(f.to_string())),
        (ScalarKind::Bool, Value::Int(0)) => Some(Value::Bool(false)),
        (ScalarKind::Bool, Value::Int(1)) => Some(Value::Bool(true)),
        (ScalarKind::Bool, Value::String(s)) => match s.as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    };
    coerced.ok_or(mismatch)
}

fn whole(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_only_widens_ints() {
        assert_eq!(coerce(Value::Int(5), ScalarKind::Int, true), Ok(Value::Int(5)));
        assert_eq!(coerce(Value::Int(5), ScalarKind::Float, true), Ok(Value::Float(5.0)));
        assert_eq!(
            coerce(Value::String("5".into()), ScalarKind::Int, true),
            Err(Mismatch {
                expected: ScalarKind::Int,
                found: ValueKind::String
            })
        );
        assert!(coerce(Value::Float(1.0), ScalarKind::Int, true).is_err());
    }

    #[test]
    fn lenient_parses_strings() {
        assert_eq!(coerce(Value::String("5".into()), ScalarKind::Int, false), Ok(Value::Int(5)));
        assert_eq!(
            coerce(Value::String(" 2.5 ".into()), ScalarKind::Float, false),
            Ok(Value::Float(2.5))
        );
        assert_eq!(
            coerce(Value::String("true".into()), ScalarKind::Bool, false),
            Ok(Value::Bool(true))
        );
        assert!(coerce(Value::String("five".into()), ScalarKind::Int, false).is_err());
        assert!(coerce(Value::String("NaN".into()), ScalarKind::Float, false).is_err());
    }

    #[test]
    fn lenient_converts_numbers() {
        assert_eq!(coerce(Value::Float(3.0), ScalarKind::Int, false), Ok(Value::Int(3)));
        assert!(coerce(Value::Float(3.5), ScalarKind::Int, false).is_err());
        assert_eq!(coerce(Value::Int(7), ScalarKind::String, false), Ok(Value::String("7".into())));
        assert_eq!(coerce(Value::Int(0), ScalarKind::Bool, false), Ok(Value::Bool(false)));
        assert!(coerce(Value::Int(2), ScalarKind::Bool, false).is_err());
        assert_eq!(coerce(Value::Bool(true), ScalarKind::Int, false), Ok(Value::Int(1)));
    }

    #[test]
    fn non_scalars_never_coerce() {
        assert!(coerce(Value::Sequence(vec![]), ScalarKind::String, false).is_err());
        assert!(coerce(Value::Null, ScalarKind::Int, false).is_err());
    }
}
