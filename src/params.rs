//! Request parameter serialization for query endpoints.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left as they are in parameter keys and values.
const PARAM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'@')
    .remove(b':')
    .remove(b'$')
    .remove(b',')
    .remove(b';');

/// Serializes `params` as `key=value` pairs joined by `&`, keys in sorted
/// order, then appends `rql` unchanged.
///
/// The query string is already wire-encoded, so it is appended raw rather
/// than encoded a second time.
///
/// ```
/// use std::collections::BTreeMap;
/// use rql_engine::params::serialize_params;
///
/// let mut params = BTreeMap::new();
/// params.insert("format".to_string(), "json csv".to_string());
/// assert_eq!(
///     serialize_params(&params, Some("eq(name,pump)")),
///     "format=json%20csv&eq(name,pump)"
/// );
/// assert_eq!(serialize_params(&BTreeMap::new(), Some("limit(5)")), "limit(5)");
/// ```
pub fn serialize_params(params: &BTreeMap<String, String>, rql: Option<&str>) -> String {
    let mut parts: Vec<String> = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, PARAM_VALUE),
                utf8_percent_encode(value, PARAM_VALUE)
            )
        })
        .collect();

    if let Some(rql) = rql.filter(|q| !q.is_empty()) {
        parts.push(rql.to_string());
    }

    parts.join("&")
}
