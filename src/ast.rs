//! # RQL - Abstract Syntax Tree
//!
//! A query is a tree of [`Node`]s. Each node applies one [`Operator`] to an
//! ordered list of [`Arg`]s, and an argument may itself be a node.
//!
//! - **[operators]** - the closed operator set
//! - **[arg]** - argument values (scalars, dates, arrays, nested nodes)
//! - **[node]** - nodes, normalization and the JSON node form
//! - **[tokens]** - lexical tokens of the wire format
//!
//! ## Wire form
//!
//! ```text
//! eq(status,active)&or(gt(age,18),eq(verified,true))&sort(-age)&limit(10,20)
//! ```
//!
//! The top-level conjunction is written as `&`-joined conjuncts; every other
//! node is written as `name(args)`.
//!
//! ## Normalization
//!
//! - `and(and(a,b),c)` becomes `and(a,b,c)`, likewise for `or`
//! - `and(x)` and `or(x)` become `x`
//! - `and()` and `or()` stay as they are
pub mod arg;
pub mod node;
pub mod operators;
pub mod tokens;

pub use arg::{Arg, ArgError};
pub use node::Node;
pub use operators::Operator;
pub use tokens::Token;
