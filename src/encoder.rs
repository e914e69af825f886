//! Wire encoding of query trees.
//!
//! Produces the textual query appended to REST requests. The output is
//! byte-for-byte what query endpoints expect:
//!
//! - operators as `name(arg,arg,...)`, with the top-level conjunction written
//!   as `&`-joined conjuncts
//! - arrays as `(v,v,...)`
//! - strings and dates percent-encoded like `encodeURIComponent`, with `(`
//!   and `)` escaped as well since they are structural
//! - strings that would otherwise read back as a keyword, a number or a date
//!   prefixed with `string:`
//!
//! # Examples
//!
//! ```
//! use rql_engine::{Arg, encoder::encode_value};
//!
//! assert_eq!(encode_value(&Arg::from("hello world")).unwrap(), "hello%20world");
//! assert_eq!(encode_value(&Arg::from("123")).unwrap(), "string:123");
//! assert_eq!(encode_value(&Arg::from(123)).unwrap(), "123");
//! ```

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::ast::{Arg, Node, Operator, arg::iso_string};
use crate::numeric::{format_js_number, is_number_like};

/// Everything `encodeURIComponent` escapes, plus parentheses.
const RQL_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'');

const RESERVED_VALUES: [&str; 5] = ["true", "false", "null", "Infinity", "-Infinity"];

/// Errors that can occur while encoding a query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    /// An argument had no value
    #[error("Value cannot be undefined")]
    Undefined,
}

/// The canonical wire form of a tree.
pub fn to_rql(node: &Node) -> Result<String, EncodeError> {
    if node.name == Operator::And {
        encode_arguments(&node.args, "&")
    } else {
        encode_node(node)
    }
}

/// Encodes a node as `name(args)`.
pub fn encode_node(node: &Node) -> Result<String, EncodeError> {
    Ok(format!("{}({})", node.name, encode_arguments(&node.args, ",")?))
}

fn encode_arguments(args: &[Arg], delimiter: &str) -> Result<String, EncodeError> {
    let encoded = args.iter().map(encode_value).collect::<Result<Vec<_>, _>>()?;
    Ok(encoded.join(delimiter))
}

/// Encodes a single argument value.
pub fn encode_value(val: &Arg) -> Result<String, EncodeError> {
    match val {
        Arg::Undefined => Err(EncodeError::Undefined),
        Arg::Node(node) => encode_node(node),
        Arg::Array(items) => Ok(format!("({})", encode_arguments(items, ",")?)),
        Arg::Date(date) => Ok(encode_string(&iso_string(date))),
        Arg::String(s) => {
            if is_reserved_value(s) || is_date_like(s) || is_number_like(s) {
                Ok(format!("string:{}", encode_string(s)))
            } else {
                Ok(encode_string(s))
            }
        }
        Arg::Null => Ok("null".to_string()),
        Arg::Boolean(b) => Ok(b.to_string()),
        Arg::Integer(n) => Ok(n.to_string()),
        Arg::Float(n) => Ok(encode_string(&format_js_number(*n))),
    }
}

/// Percent-encodes a string, parentheses included.
pub fn encode_string(s: &str) -> String {
    utf8_percent_encode(s, RQL_VALUE).to_string()
}

/// Whether the string is one of the literal keywords of the grammar.
pub fn is_reserved_value(val: &str) -> bool {
    RESERVED_VALUES.contains(&val)
}

/// Whether the string starts with a `YYYY-MM-DD` date.
pub fn is_date_like(val: &str) -> bool {
    let bytes = val.as_bytes();
    bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}
