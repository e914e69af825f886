//! RQL query engine.
//!
//! Build query trees fluently with [`RqlBuilder`], encode them to the RQL wire
//! format for REST endpoints, parse wire queries back, and evaluate queries
//! locally over JSON collections with [`Filter`].

pub mod ast;
pub mod builder;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compare;
pub mod encoder;
pub mod executor;
pub mod filter;
pub mod glob;
pub mod lexer;
pub mod numeric;
pub mod params;
pub mod parser;
pub mod value;
pub mod visitor;

pub use ast::{Arg, ArgError, Node, Operator, Token};
pub use builder::{Query, RqlBuilder};
pub use encoder::EncodeError;
pub use executor::{LocalExecutor, QueryError, QueryExecutor, QueryOptions};
pub use filter::{Filter, Page};
pub use lexer::Lexer;
pub use parser::{ParseError, Parser, parse};
pub use value::Value;
pub use visitor::{PropertyPath, VisitError, Visitor, VisitorOptions};
