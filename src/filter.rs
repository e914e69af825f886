use std::cmp::Ordering;
use std::fmt;

use serde_json::json;

use crate::{
    ast::Node,
    value::Value,
    visitor::{Comparator, Predicate, VisitError, Visitor},
};

/// One page of results and the number of items that matched before paging.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub total: usize,
}

impl Page {
    /// `{"items": [...], "total": n}`
    pub fn to_json(&self) -> serde_json::Value {
        let items: Vec<serde_json::Value> = self.items.iter().cloned().map(Into::into).collect();
        json!({ "items": items, "total": self.total })
    }
}

/// A query compiled for local evaluation.
///
/// The tree is visited once, when the filter is created; applying the filter
/// any number of times afterwards reuses the compiled predicate, sort order
/// and page window.
///
/// # Examples
///
/// ```
/// use rql_engine::{Filter, Node, Value, Visitor};
///
/// let filter = Filter::new(&Node::new("gt", vec!["a".into(), 1.into()]), Visitor::default()).unwrap();
/// let items: Vec<Value> = (1..=3)
///     .map(|a| serde_json::json!({ "a": a }).into())
///     .collect();
///
/// let page = filter.apply(&items).unwrap();
/// assert_eq!(page.total, 2);
/// assert_eq!(page.items, items[1..].to_vec());
/// ```
pub struct Filter {
    test: Predicate,
    limit: Option<usize>,
    offset: usize,
    sort: Option<Comparator>,
}

impl Filter {
    pub fn new(node: &Node, mut visitor: Visitor) -> Result<Self, VisitError> {
        let test = visitor.visit(node)?;
        Ok(Filter {
            test,
            limit: visitor.limit_value(),
            offset: visitor.offset(),
            sort: visitor.take_sort_comparator(),
        })
    }

    /// Tests a single item against the compiled predicate.
    pub fn matches(&self, item: &Value) -> Result<bool, VisitError> {
        (self.test)(item)
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_sorted(&self) -> bool {
        self.sort.is_some()
    }

    /// Filters, counts, sorts and pages `items`, in that order.
    ///
    /// `total` is the number of matches before the page window is applied.
    /// Sorting is stable, so items that compare equal keep their input order.
    /// Mixed-type sort keys need not be ordered consistently; such items end
    /// up in some permutation of the matches.
    pub fn apply(&self, items: &[Value]) -> Result<Page, VisitError> {
        let mut matched = Vec::new();
        for item in items {
            if self.matches(item)? {
                matched.push(item.clone());
            }
        }
        let total = matched.len();

        if let Some(sort) = &self.sort {
            matched = merge_sort(matched, &**sort);
        }

        let page: Vec<Value> = match self.limit {
            Some(limit) => matched.into_iter().skip(self.offset).take(limit).collect(),
            None => matched.into_iter().skip(self.offset).collect(),
        };

        tracing::debug!(
            input = items.len(),
            matched = total,
            returned = page.len(),
            "applied filter"
        );

        Ok(Page { items: page, total })
    }
}

/// Stable top-down merge sort. Only ever asks `compare` about pairs, so a
/// comparator that is not a total order still yields a permutation.
fn merge_sort(mut items: Vec<Value>, compare: &dyn Fn(&Value, &Value) -> Ordering) -> Vec<Value> {
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare);
    let right = merge_sort(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        let next = if compare(l, r).is_gt() { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);
    merged
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("sorted", &self.sort.is_some())
            .finish_non_exhaustive()
    }
}
