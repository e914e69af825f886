//! Total ordering over possibly missing values.
//!
//! Query comparisons must never fail on mixed types, so values are ordered in
//! three steps:
//!
//! 1. identical values are equal
//! 2. otherwise the native relational order decides, with strings compared to
//!    strings lexically and everything else compared numerically
//! 3. values that are neither less nor greater (a numeric string against a
//!    number, `NaN`, missing values) fall back to comparing their string forms

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::numeric::parse_js_number;
use crate::value::{Value, js_string};

/// Compares two values; `None` stands for a missing (undefined) value.
///
/// ```
/// use rql_engine::{Value, compare::compare};
/// use std::cmp::Ordering;
///
/// let one = Value::Integer(1);
/// let one_str = Value::String("1".to_string());
/// assert_eq!(compare(Some(&one), Some(&one_str)), Ordering::Equal);
/// assert_eq!(compare(Some(&Value::Integer(2)), Some(&Value::Integer(10))), Ordering::Less);
/// ```
pub fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    if strict_equals(a, b) {
        return Ordering::Equal;
    }

    match relational(a, b) {
        Some(Ordering::Less) => Ordering::Less,
        Some(Ordering::Greater) => Ordering::Greater,
        _ => utf16_cmp(&js_string(a), &js_string(b)),
    }
}

fn strict_equals(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(Value::Null), Some(Value::Null)) => true,
        (Some(Value::Boolean(x)), Some(Value::Boolean(y))) => x == y,
        (Some(Value::Integer(x)), Some(Value::Integer(y))) => x == y,
        (Some(x @ (Value::Integer(_) | Value::Float(_))), Some(y @ (Value::Integer(_) | Value::Float(_)))) => {
            x.as_float() == y.as_float()
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x == y,
        (Some(x @ Value::Array(_)), Some(y @ Value::Array(_))) => x == y,
        (Some(x @ Value::Object(_)), Some(y @ Value::Object(_))) => x == y,
        _ => false,
    }
}

enum Primitive<'a> {
    Undefined,
    Scalar(&'a Value),
    Text(Cow<'a, str>),
}

fn to_primitive(value: Option<&Value>) -> Primitive<'_> {
    match value {
        None => Primitive::Undefined,
        Some(Value::String(s)) => Primitive::Text(Cow::Borrowed(s)),
        Some(v @ (Value::Array(_) | Value::Object(_))) => Primitive::Text(Cow::Owned(v.to_js_string())),
        Some(v) => Primitive::Scalar(v),
    }
}

impl Primitive<'_> {
    fn to_number(&self) -> f64 {
        match self {
            Primitive::Undefined => f64::NAN,
            Primitive::Scalar(v) => v.to_js_number(),
            Primitive::Text(s) => parse_js_number(s),
        }
    }
}

/// The `<` / `>` relation; `None` when the values are unordered.
fn relational(a: Option<&Value>, b: Option<&Value>) -> Option<Ordering> {
    if let (Some(Value::Integer(x)), Some(Value::Integer(y))) = (a, b) {
        return Some(x.cmp(y));
    }

    match (to_primitive(a), to_primitive(b)) {
        (Primitive::Text(x), Primitive::Text(y)) => Some(utf16_cmp(&x, &y)),
        (x, y) => x.to_number().partial_cmp(&y.to_number()),
    }
}

/// Lexical order by UTF-16 code units.
pub fn utf16_cmp(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}
