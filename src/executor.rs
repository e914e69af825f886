use std::collections::BTreeMap;

use crate::{
    builder::Query,
    encoder::EncodeError,
    filter::Page,
    params::serialize_params,
    value::Value,
    visitor::VisitError,
};

/// Errors that can occur while running a query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// No executor is attached to the query
    #[error("Query is not implemented")]
    NotImplemented,

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Visit(#[from] VisitError),

    /// Failure reported by the backing service
    #[error("Query failed: {0}")]
    Backend(String),
}

/// Extra request parameters sent alongside a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub params: BTreeMap<String, String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The full query string for `query`: encoded parameters followed by the
    /// wire form of the query.
    pub fn to_query_string(&self, query: &Query) -> Result<String, EncodeError> {
        let rql = query.to_rql()?;
        Ok(serialize_params(&self.params, Some(&rql)))
    }
}

/// Runs built queries, usually against a remote collection.
///
/// Any `Fn(&Query, &QueryOptions) -> Result<Page, QueryError>` closure is an
/// executor.
pub trait QueryExecutor: Send + Sync {
    fn execute(&self, query: &Query, options: &QueryOptions) -> Result<Page, QueryError>;
}

impl<F> QueryExecutor for F
where
    F: Fn(&Query, &QueryOptions) -> Result<Page, QueryError> + Send + Sync,
{
    fn execute(&self, query: &Query, options: &QueryOptions) -> Result<Page, QueryError> {
        self(query, options)
    }
}

/// Evaluates queries against an in-memory collection.
#[derive(Debug, Clone, Default)]
pub struct LocalExecutor {
    items: Vec<Value>,
}

impl LocalExecutor {
    pub fn new(items: Vec<Value>) -> Self {
        LocalExecutor { items }
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

impl QueryExecutor for LocalExecutor {
    fn execute(&self, query: &Query, _options: &QueryOptions) -> Result<Page, QueryError> {
        Ok(query.create_filter()?.apply(&self.items)?)
    }
}
