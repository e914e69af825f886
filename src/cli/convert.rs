//! JSON input handling for the command line

use crate::{Node, Value, VisitorOptions};

use super::CliError;

/// Reads a query tree from its JSON form.
pub fn node_from_json(json: &str) -> Result<Node, CliError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok(Node::from_json(value)?)
}

/// Reads the collection a filter is applied to.
pub fn items_from_json(json: &str) -> Result<Vec<Value>, CliError> {
    match serde_json::from_str::<serde_json::Value>(json)? {
        serde_json::Value::Array(items) => Ok(items.into_iter().map(Value::from).collect()),
        _ => Err(CliError::NotAnArray),
    }
}

/// Combines an options document with `alias=path` mappings. Mappings given
/// on the command line override the document.
pub fn visitor_options(json: Option<&str>, mappings: &[String]) -> Result<VisitorOptions, CliError> {
    let mut options = match json {
        Some(json) => serde_json::from_str::<VisitorOptions>(json)?,
        None => VisitorOptions::default(),
    };

    for mapping in mappings {
        let Some((alias, path)) = mapping.split_once('=') else {
            return Err(CliError::InvalidMapping(mapping.clone()));
        };
        if alias.is_empty() || path.is_empty() {
            return Err(CliError::InvalidMapping(mapping.clone()));
        }
        options = options.with_property_alias(alias, path);
    }

    Ok(options)
}
