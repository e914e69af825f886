//! Conversion between the JSON and wire forms of a query

use crate::{Query, parser};

use super::{CliError, node_from_json};

/// Normalizes a JSON query tree and returns its wire form.
pub fn execute_encode(json: &str) -> Result<String, CliError> {
    let query = Query::from(node_from_json(json)?);
    Ok(query.to_rql()?)
}

/// Options for the parse command
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// The wire query to parse
    pub query: String,
    /// Pretty-print the output
    pub pretty: bool,
}

/// Parses a wire query and returns the normalized tree as JSON.
pub fn execute_parse(options: &ParseOptions) -> Result<String, CliError> {
    let query = Query::from(parser::parse(&options.query)?);
    let json = query.to_json();
    let output = if options.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    Ok(output)
}
