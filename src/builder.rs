//! Fluent construction of query trees.
//!
//! An [`RqlBuilder`] keeps a cursor into the tree it is building. Combinators
//! opened without arguments move the cursor into the new node, [`up`] moves
//! it back out, and every other call appends a leaf at the cursor:
//!
//! ```
//! use rql_engine::RqlBuilder;
//!
//! let query = RqlBuilder::new()
//!     .or()
//!         .eq("name", "pump")
//!         .gt("age", 3)
//!     .up()
//!     .sort(["-age"])
//!     .limit(10)
//!     .build();
//!
//! assert_eq!(query.to_rql().unwrap(), "or(eq(name,pump),gt(age,3))&sort(-age)&limit(10)");
//! ```
//!
//! [`build`](RqlBuilder::build) consumes the builder and returns a normalized
//! [`Query`], so a finished tree can no longer be changed. [`Query::copy`]
//! starts a new builder from it.
//!
//! [`up`]: RqlBuilder::up

use std::fmt;
use std::sync::Arc;

use crate::{
    ast::{Arg, Node, Operator},
    encoder::EncodeError,
    executor::{QueryError, QueryExecutor, QueryOptions},
    filter::{Filter, Page},
    visitor::{VisitError, Visitor, VisitorOptions},
};

/// An open query tree and a cursor into it.
#[derive(Clone, Default)]
pub struct RqlBuilder {
    root: Node,
    /// Child indices from the root down to the node under the cursor. Every
    /// index names an `Arg::Node`; arguments are only ever appended, so
    /// recorded indices stay valid.
    path: Vec<usize>,
    visitor_options: VisitorOptions,
    executor: Option<Arc<dyn QueryExecutor>>,
}

impl RqlBuilder {
    /// A builder over an empty `and`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder that continues an existing tree, with the cursor at its root.
    pub fn with_root(root: Node) -> Self {
        RqlBuilder {
            root,
            ..Self::default()
        }
    }

    /// Options handed to the visitor of every filter created from this query.
    pub fn with_visitor_options(mut self, options: VisitorOptions) -> Self {
        self.visitor_options = options;
        self
    }

    /// Attaches the executor that [`Query::query`] delegates to.
    pub fn with_executor(mut self, executor: impl QueryExecutor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Runs `f` on the node under the cursor.
    fn with_current<R>(&mut self, f: impl FnOnce(&mut Node) -> R) -> R {
        descend(&mut self.root, &self.path, f)
    }

    /// Appends `node` as a leaf under the cursor.
    pub fn add(mut self, node: Node) -> Self {
        self.with_current(|current| current.args.push(Arg::Node(node)));
        self
    }

    /// Appends `node` under the cursor and moves the cursor into it.
    pub fn add_and_enter(mut self, node: Node) -> Self {
        let index = self.with_current(|current| {
            current.args.push(Arg::Node(node));
            current.args.len() - 1
        });
        self.path.push(index);
        self
    }

    /// Opens an `and` scope.
    pub fn and(self) -> Self {
        self.add_and_enter(Node::new(Operator::And, Vec::new()))
    }

    /// Appends `and(args)` as a leaf, or opens a scope when `args` is empty.
    pub fn and_with(self, args: Vec<Arg>) -> Self {
        if args.is_empty() {
            return self.and();
        }
        self.add(Node::new(Operator::And, args))
    }

    /// Opens an `or` scope.
    pub fn or(self) -> Self {
        self.add_and_enter(Node::new(Operator::Or, Vec::new()))
    }

    /// Appends `or(args)` as a leaf, or opens a scope when `args` is empty.
    pub fn or_with(self, args: Vec<Arg>) -> Self {
        if args.is_empty() {
            return self.or();
        }
        self.add(Node::new(Operator::Or, args))
    }

    /// Appends `not(args)` as a leaf.
    pub fn not(self, args: Vec<Arg>) -> Self {
        self.add(Node::new(Operator::Not, args))
    }

    fn comparison(self, operator: Operator, property: impl Into<Arg>, value: impl Into<Arg>) -> Self {
        self.add(Node::new(operator, vec![property.into(), value.into()]))
    }

    pub fn eq(self, property: impl Into<Arg>, value: impl Into<Arg>) -> Self {
        self.comparison(Operator::Eq, property, value)
    }

    pub fn ne(self, property: impl Into<Arg>, value: impl Into<Arg>) -> Self {
        self.comparison(Operator::Ne, property, value)
    }

    pub fn le(self, property: impl Into<Arg>, value: impl Into<Arg>) -> Self {
        self.comparison(Operator::Le, property, value)
    }

    pub fn ge(self, property: impl Into<Arg>, value: impl Into<Arg>) -> Self {
        self.comparison(Operator::Ge, property, value)
    }

    pub fn lt(self, property: impl Into<Arg>, value: impl Into<Arg>) -> Self {
        self.comparison(Operator::Lt, property, value)
    }

    pub fn gt(self, property: impl Into<Arg>, value: impl Into<Arg>) -> Self {
        self.comparison(Operator::Gt, property, value)
    }

    /// `in(property, (values...))`
    pub fn in_(self, property: impl Into<Arg>, values: impl Into<Arg>) -> Self {
        self.comparison(Operator::In, property, values)
    }

    /// Case-insensitive wildcard match.
    pub fn matches(self, property: impl Into<Arg>, pattern: impl Into<Arg>) -> Self {
        self.comparison(Operator::Match, property, pattern)
    }

    pub fn matches_case_sensitive(self, property: impl Into<Arg>, pattern: impl Into<Arg>) -> Self {
        self.add(Node::new(
            Operator::Match,
            vec![property.into(), pattern.into(), Arg::Boolean(true)],
        ))
    }

    pub fn contains(self, property: impl Into<Arg>, value: impl Into<Arg>) -> Self {
        self.comparison(Operator::Contains, property, value)
    }

    /// Moves the cursor to the parent node. At the root this only logs a
    /// warning.
    pub fn up(mut self) -> Self {
        if self.path.pop().is_none() {
            tracing::warn!("tried to go up from the root of the query");
        }
        self
    }

    /// Appends `sort(keys...)`. Keys are `property`, `-property` for
    /// descending order, or `+property`.
    pub fn sort<I>(self, keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let keys = keys.into_iter().map(Into::into).collect();
        self.sort_limit(Node::new(Operator::Sort, keys))
    }

    pub fn limit(self, limit: usize) -> Self {
        self.sort_limit(Node::new(Operator::Limit, vec![limit.into()]))
    }

    pub fn limit_offset(self, limit: usize, offset: usize) -> Self {
        self.sort_limit(Node::new(Operator::Limit, vec![limit.into(), offset.into()]))
    }

    /// Appends a result-shaping node. Those belong in an `and`, so any other
    /// node under the cursor is first wrapped in one, in place.
    fn sort_limit(mut self, node: Node) -> Self {
        if !self.path.is_empty() {
            tracing::warn!(operator = %node.name, depth = self.path.len(), "adding result shaping below the root of the query");
        }

        self.with_current(|current| {
            if current.name != Operator::And {
                let previous = std::mem::take(current);
                *current = Node::and(vec![Arg::Node(previous)]);
            }
        });
        self.add(node)
    }

    /// Normalizes the tree and closes it.
    pub fn build(self) -> Query {
        Query {
            root: normalize_root(self.root),
            visitor_options: self.visitor_options,
            executor: self.executor,
        }
    }

    /// The wire form the tree would have once built.
    pub fn to_rql(&self) -> Result<String, EncodeError> {
        normalize_root(self.root.clone()).to_rql()
    }

    /// Builds the query and compiles it for local evaluation.
    pub fn create_filter(self) -> Result<Filter, VisitError> {
        self.build().create_filter()
    }
}

/// Follows `path` down from `node` and runs `f` on the node it ends at. An
/// index that does not name a child node stops the walk at its parent.
fn descend<R>(node: &mut Node, path: &[usize], f: impl FnOnce(&mut Node) -> R) -> R {
    if let Some((&index, rest)) = path.split_first()
        && let Some(Arg::Node(child)) = node.args.get_mut(index)
    {
        return descend(child, rest, f);
    }
    f(node)
}

/// A normalized root that collapsed to a bare value is kept as `and(value)`.
fn normalize_root(root: Node) -> Node {
    match root.normalize() {
        Arg::Node(node) => node,
        other => Node::and(vec![other]),
    }
}

impl fmt::Debug for RqlBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RqlBuilder")
            .field("root", &self.root)
            .field("path", &self.path)
            .field("visitor_options", &self.visitor_options)
            .field("has_executor", &self.executor.is_some())
            .finish()
    }
}

/// A built, normalized query.
#[derive(Clone)]
pub struct Query {
    root: Node,
    visitor_options: VisitorOptions,
    executor: Option<Arc<dyn QueryExecutor>>,
}

impl Query {
    pub fn node(&self) -> &Node {
        &self.root
    }

    pub fn into_node(self) -> Node {
        self.root
    }

    pub fn visitor_options(&self) -> &VisitorOptions {
        &self.visitor_options
    }

    pub fn with_executor(mut self, executor: impl QueryExecutor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    pub fn to_rql(&self) -> Result<String, EncodeError> {
        self.root.to_rql()
    }

    pub fn encode(&self) -> Result<String, EncodeError> {
        self.root.encode()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.root.to_json()
    }

    /// A new open builder over a copy of this tree, keeping the visitor
    /// options and executor.
    pub fn copy(&self) -> RqlBuilder {
        RqlBuilder {
            root: self.root.clone(),
            path: Vec::new(),
            visitor_options: self.visitor_options.clone(),
            executor: self.executor.clone(),
        }
    }

    pub fn create_filter(&self) -> Result<Filter, VisitError> {
        Filter::new(&self.root, Visitor::new(self.visitor_options.clone()))
    }

    /// Runs the query through the attached executor.
    pub fn query(&self, options: &QueryOptions) -> Result<Page, QueryError> {
        match &self.executor {
            Some(executor) => executor.execute(self, options),
            None => Err(QueryError::NotImplemented),
        }
    }
}

impl From<Node> for Query {
    fn from(root: Node) -> Self {
        RqlBuilder::with_root(root).build()
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("root", &self.root)
            .field("visitor_options", &self.visitor_options)
            .field("has_executor", &self.executor.is_some())
            .finish()
    }
}
