use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::ast::Node;

/// One argument of a [`Node`].
///
/// Only values the wire encoder can represent are expressible: scalars,
/// dates, nested nodes and arrays of those. Plain objects are rejected when
/// converting from JSON (see [`Arg::try_from`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// An absent value. Never encodable.
    ///
    /// Produced by `Option::None`, so passing a missing optional to the
    /// builder fails at encoding time instead of silently dropping the
    /// condition.
    Undefined,

    /// Null literal
    Null,

    /// Boolean literal
    Boolean(bool),

    /// Integer literal
    Integer(i64),

    /// Floating point literal
    Float(f64),

    /// String literal
    String(String),

    /// Point in time, encoded as ISO-8601
    Date(DateTime<Utc>),

    /// Parenthesized list of values
    Array(Vec<Arg>),

    /// Nested operator application
    Node(Node),
}

/// Error returned for argument values the query grammar cannot carry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArgError {
    #[error("Argument cannot be an object, must be primitive, array or date: {0}")]
    Object(String),

    #[error("Expected a query node object, found {0}")]
    NotANode(String),
}

impl Arg {
    /// Normalizes a nested node; every other argument is already canonical.
    pub fn normalize(self) -> Arg {
        match self {
            Arg::Node(node) => node.normalize(),
            other => other,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Arg::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::String(s) => Some(s),
            _ => None,
        }
    }

    /// JavaScript truthiness, used for flag arguments such as the
    /// descending flag of a sort key.
    pub fn is_truthy(&self) -> bool {
        match self {
            Arg::Undefined | Arg::Null => false,
            Arg::Boolean(b) => *b,
            Arg::Integer(n) => *n != 0,
            Arg::Float(n) => *n != 0.0 && !n.is_nan(),
            Arg::String(s) => !s.is_empty(),
            Arg::Date(_) | Arg::Array(_) | Arg::Node(_) => true,
        }
    }

    /// A short human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Arg::Undefined => "undefined".to_string(),
            Arg::Null => "null".to_string(),
            Arg::Boolean(b) => format!("boolean {b}"),
            Arg::Integer(n) => format!("number {n}"),
            Arg::Float(n) => format!("number {n}"),
            Arg::String(s) => format!("string {s:?}"),
            Arg::Date(d) => format!("date {}", iso_string(d)),
            Arg::Array(items) => format!("array of {} values", items.len()),
            Arg::Node(node) => format!("{} node", node.name),
        }
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_string(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl TryFrom<serde_json::Value> for Arg {
    type Error = ArgError;

    /// Converts a JSON value into an argument.
    ///
    /// Objects shaped like `{"name": "...", "args": [...]}` are nodes; any
    /// other object is an error.
    fn try_from(v: serde_json::Value) -> Result<Self, Self::Error> {
        match v {
            serde_json::Value::Null => Ok(Arg::Null),
            serde_json::Value::Bool(b) => Ok(Arg::Boolean(b)),
            serde_json::Value::Number(n) => Ok(match n.as_i64() {
                Some(i) => Arg::Integer(i),
                None => Arg::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            serde_json::Value::String(s) => Ok(Arg::String(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Arg::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Arg::Array),
            object @ serde_json::Value::Object(_) => Node::from_json(object).map(Arg::Node),
        }
    }
}

impl Serialize for Arg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Arg::Undefined | Arg::Null => serializer.serialize_unit(),
            Arg::Boolean(b) => serializer.serialize_bool(*b),
            Arg::Integer(n) => serializer.serialize_i64(*n),
            Arg::Float(n) => serializer.serialize_f64(*n),
            Arg::String(s) => serializer.serialize_str(s),
            Arg::Date(d) => serializer.serialize_str(&iso_string(d)),
            Arg::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Arg::Node(node) => node.serialize(serializer),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::String(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::String(s)
    }
}

impl From<&String> for Arg {
    fn from(s: &String) -> Self {
        Arg::String(s.clone())
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Boolean(b)
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Integer(i64::from(n))
    }
}

impl From<u32> for Arg {
    fn from(n: u32) -> Self {
        Arg::Integer(i64::from(n))
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Integer(n)
    }
}

impl From<usize> for Arg {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Arg::Float(n as f64), Arg::Integer)
    }
}

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Float(n)
    }
}

impl From<DateTime<Utc>> for Arg {
    fn from(d: DateTime<Utc>) -> Self {
        Arg::Date(d)
    }
}

impl From<Node> for Arg {
    fn from(node: Node) -> Self {
        Arg::Node(node)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        v.map_or(Arg::Undefined, Into::into)
    }
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
    fn from(items: Vec<T>) -> Self {
        Arg::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Arg>, const N: usize> From<[T; N]> for Arg {
    fn from(items: [T; N]) -> Self {
        Arg::Array(items.into_iter().map(Into::into).collect())
    }
}
