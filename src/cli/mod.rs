//! Command-line operations, usable without the `rql` binary.

mod convert;
mod encode;
mod filter;

pub use convert::{items_from_json, node_from_json, visitor_options};
pub use encode::{ParseOptions, execute_encode, execute_parse};
pub use filter::{FilterOptions, execute_filter};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Invalid query node: {0}")]
    Arg(#[from] crate::ArgError),

    #[error("Encoding error: {0}")]
    Encode(#[from] crate::EncodeError),

    #[error("Evaluation error: {0}")]
    Visit(#[from] crate::VisitError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Input must be a JSON array of items")]
    NotAnArray,

    #[error("Invalid property mapping '{0}', expected alias=path")]
    InvalidMapping(String),
}
