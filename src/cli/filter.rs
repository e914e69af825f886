//! Apply wire queries to JSON collections

use crate::{Query, parser};

use super::{CliError, items_from_json, visitor_options};

/// Options for the filter command
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// The wire query to apply
    pub query: String,
    /// JSON array of items
    pub input: Option<String>,
    /// Visitor options document (`{"propertyNameMap": {...}}`)
    pub options: Option<String>,
    /// Extra `alias=path` property mappings
    pub mappings: Vec<String>,
}

/// Filters the input collection and returns `{"items": [...], "total": n}`.
pub fn execute_filter(options: &FilterOptions) -> Result<serde_json::Value, CliError> {
    let visitor_options = visitor_options(options.options.as_deref(), &options.mappings)?;
    let query = Query::from(parser::parse(&options.query)?);
    let filter = query.copy().with_visitor_options(visitor_options).create_filter()?;

    let input = options.input.as_deref().ok_or(CliError::NoInput)?;
    let items = items_from_json(input)?;

    Ok(filter.apply(&items)?.to_json())
}
