use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Deserialize;

use crate::{
    ast::{Arg, Node, Operator, arg::iso_string},
    compare::compare,
    glob,
    value::{Value, js_string, js_type_name},
};

/// A compiled membership test.
pub type Predicate = Box<dyn Fn(&Value) -> Result<bool, VisitError> + Send + Sync>;

/// A compiled sort order.
pub type Comparator = Box<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// Errors that can occur while compiling or evaluating a query locally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VisitError {
    /// The operator has no local implementation
    #[error("Unsupported node type: {0}")]
    UnsupportedNode(String),

    /// A combinator argument that is not a node
    #[error("Expected a query node, found {0}")]
    NotANode(String),

    /// An argument of the wrong type for its operator
    #[error("Invalid argument for {operator}: {message}")]
    InvalidArgument { operator: String, message: String },

    /// `contains` applied to a value that is neither a string nor an array
    #[error("Cant search inside {0}")]
    CannotSearchInside(&'static str),

    /// A `match` pattern that does not compile
    #[error("Invalid match pattern: {0}")]
    Pattern(String),
}

/// Visitor configuration.
///
/// Deserializes from the option bag used by query callers:
///
/// ```
/// use rql_engine::VisitorOptions;
///
/// let options: VisitorOptions = serde_json::from_str(
///     r#"{"propertyNameMap": {"eventType": "eventType.eventType"}}"#,
/// ).unwrap();
/// assert_eq!(options.property_name_map["eventType"], "eventType.eventType");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorOptions {
    /// Maps property names used in queries to dotted paths in the items
    #[serde(default)]
    pub property_name_map: HashMap<String, String>,
}

impl VisitorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property_alias(mut self, alias: impl Into<String>, path: impl Into<String>) -> Self {
        self.property_name_map.insert(alias.into(), path.into());
        self
    }
}

/// A resolved property reference: a dotted path, or the item itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPath {
    segments: Option<Vec<String>>,
}

impl PropertyPath {
    /// The item itself.
    pub fn item() -> Self {
        PropertyPath { segments: None }
    }

    pub fn parse(path: &str) -> Self {
        PropertyPath {
            segments: Some(path.split('.').map(str::to_string).collect()),
        }
    }

    /// Walks the path through `item`. Any missing or null intermediate value
    /// yields `None`.
    pub fn resolve<'a>(&self, item: &'a Value) -> Option<&'a Value> {
        let Some(segments) = &self.segments else {
            return Some(item);
        };

        let mut current = Some(item);
        for segment in segments {
            current = match current {
                Some(Value::Null) | None => return None,
                Some(value) => value.get(segment),
            };
        }
        current
    }
}

/// Compiles a query tree into a predicate, collecting the sort order and
/// page window as it goes.
///
/// A visitor interprets one tree once; the collected state is read back by
/// [`Filter`](crate::Filter) after [`visit`](Visitor::visit) returns.
pub struct Visitor {
    options: VisitorOptions,
    limit: Option<usize>,
    offset: usize,
    sort: Option<Comparator>,
}

impl Default for Visitor {
    fn default() -> Self {
        Visitor::new(VisitorOptions::default())
    }
}

fn always_true() -> Predicate {
    Box::new(|_: &Value| Ok(true))
}

impl Visitor {
    pub fn new(options: VisitorOptions) -> Self {
        Visitor {
            options,
            limit: None,
            offset: 0,
            sort: None,
        }
    }

    /// The page size set by a `limit` node, if any.
    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn take_sort_comparator(&mut self) -> Option<Comparator> {
        self.sort.take()
    }

    /// Compiles a node into a predicate.
    ///
    /// # Examples
    ///
    /// ```
    /// use rql_engine::{Node, Value, Visitor, VisitError};
    ///
    /// let mut visitor = Visitor::default();
    /// let test = visitor.visit(&Node::new("gt", vec!["a".into(), 1.into()])).unwrap();
    /// assert!(test(&Value::from(serde_json::json!({"a": 2}))).unwrap());
    /// assert!(!test(&Value::from(serde_json::json!({"a": 1}))).unwrap());
    ///
    /// let err = visitor.visit(&Node::new("bogus", vec![])).err().unwrap();
    /// assert_eq!(err, VisitError::UnsupportedNode("bogus".to_string()));
    /// ```
    pub fn visit(&mut self, node: &Node) -> Result<Predicate, VisitError> {
        let args = node.args.as_slice();
        match &node.name {
            Operator::And => self.visit_and(args),
            Operator::Or => self.visit_or(args),
            Operator::Not => self.visit_not(args),
            Operator::Sort => self.visit_sort(args),
            Operator::Limit => self.visit_limit(args),
            Operator::In => self.visit_in(args),
            Operator::Match => self.visit_match(args),
            Operator::Contains => self.visit_contains(args),
            Operator::Eq => self.visit_comparison("eq", Ordering::is_eq, args),
            Operator::Ne => self.visit_comparison("ne", Ordering::is_ne, args),
            Operator::Le => self.visit_comparison("le", Ordering::is_le, args),
            Operator::Ge => self.visit_comparison("ge", Ordering::is_ge, args),
            Operator::Lt => self.visit_comparison("lt", Ordering::is_lt, args),
            Operator::Gt => self.visit_comparison("gt", Ordering::is_gt, args),
            Operator::Other(name) => Err(VisitError::UnsupportedNode(name.clone())),
        }
    }

    fn visit_children(&mut self, args: &[Arg]) -> Result<Vec<Predicate>, VisitError> {
        args.iter()
            .map(|arg| match arg {
                Arg::Node(node) => self.visit(node),
                other => Err(VisitError::NotANode(other.describe())),
            })
            .collect()
    }

    fn visit_and(&mut self, args: &[Arg]) -> Result<Predicate, VisitError> {
        let children = self.visit_children(args)?;
        Ok(Box::new(move |item: &Value| -> Result<bool, VisitError> {
            for child in &children {
                if !child(item)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }))
    }

    fn visit_or(&mut self, args: &[Arg]) -> Result<Predicate, VisitError> {
        let children = self.visit_children(args)?;
        Ok(Box::new(move |item: &Value| -> Result<bool, VisitError> {
            for child in &children {
                if child(item)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }))
    }

    /// `not(a,b)` holds when `and(a,b)` does not.
    fn visit_not(&mut self, args: &[Arg]) -> Result<Predicate, VisitError> {
        let conjunction = self.visit_and(args)?;
        Ok(Box::new(move |item: &Value| conjunction(item).map(|held| !held)))
    }

    fn visit_comparison(
        &mut self,
        operator: &str,
        test: fn(Ordering) -> bool,
        args: &[Arg],
    ) -> Result<Predicate, VisitError> {
        let path = self.property_path(operator, args.first())?;
        let target = target_value(operator, args.get(1))?;
        Ok(Box::new(move |item: &Value| {
            Ok(test(compare(path.resolve(item), target.as_ref())))
        }))
    }

    fn visit_limit(&mut self, args: &[Arg]) -> Result<Predicate, VisitError> {
        if let Some(first) = args.first() {
            let limit = count_arg("limit", first)?;
            let offset = match args.get(1) {
                Some(arg) => count_arg("limit", arg)?,
                None => 0,
            };
            if self.limit.is_some() {
                tracing::warn!(limit, offset, "query has more than one limit, the last one wins");
            }
            self.limit = Some(limit);
            self.offset = offset;
        }
        Ok(always_true())
    }

    fn visit_sort(&mut self, args: &[Arg]) -> Result<Predicate, VisitError> {
        let mut comparator: Option<Comparator> = None;

        for arg in args {
            let (property, descending) = sort_key(arg)?;
            let path = match property {
                Some(name) => self.resolve_alias(&name),
                None => PropertyPath::item(),
            };

            let mut key: Comparator =
                Box::new(move |a: &Value, b: &Value| compare(path.resolve(a), path.resolve(b)));
            if descending {
                key = reverse_comparator(key);
            }
            comparator = Some(then_comparator(comparator, key));
        }

        if self.sort.is_some() {
            tracing::warn!("query has more than one sort, the last one wins");
        }
        self.sort = comparator;
        Ok(always_true())
    }

    fn visit_in(&mut self, args: &[Arg]) -> Result<Predicate, VisitError> {
        let path = self.property_path("in", args.first())?;
        let candidates = match args.get(1) {
            Some(Arg::Array(items)) => items
                .iter()
                .map(|a| target_value("in", Some(a)))
                .collect::<Result<Vec<_>, _>>()?,
            _ => args
                .iter()
                .skip(1)
                .map(|a| target_value("in", Some(a)))
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Box::new(move |item: &Value| {
            let value = path.resolve(item);
            Ok(candidates.iter().any(|c| compare(value, c.as_ref()).is_eq()))
        }))
    }

    fn visit_match(&mut self, args: &[Arg]) -> Result<Predicate, VisitError> {
        let path = self.property_path("match", args.first())?;
        let pattern = js_string(target_value("match", args.get(1))?.as_ref());
        let case_sensitive = args.get(2).is_some_and(Arg::is_truthy);

        let regex = glob::compile(&pattern, case_sensitive)
            .map_err(|e| VisitError::Pattern(e.to_string()))?;

        Ok(Box::new(move |item: &Value| {
            Ok(regex.is_match(&js_string(path.resolve(item))))
        }))
    }

    fn visit_contains(&mut self, args: &[Arg]) -> Result<Predicate, VisitError> {
        let path = self.property_path("contains", args.first())?;
        let target = target_value("contains", args.get(1))?;
        let needle = js_string(target.as_ref());

        Ok(Box::new(move |item: &Value| match path.resolve(item) {
            Some(Value::String(s)) => Ok(s.contains(needle.as_str())),
            Some(Value::Array(values)) => Ok(values
                .iter()
                .any(|v| compare(Some(v), target.as_ref()).is_eq())),
            other => Err(VisitError::CannotSearchInside(js_type_name(other))),
        }))
    }

    /// Resolves the property argument of an operator, applying the alias
    /// table. A missing or null property refers to the item itself.
    fn property_path(&self, operator: &str, arg: Option<&Arg>) -> Result<PropertyPath, VisitError> {
        match arg {
            None | Some(Arg::Undefined) | Some(Arg::Null) => Ok(PropertyPath::item()),
            Some(Arg::String(name)) => Ok(self.resolve_alias(name)),
            Some(other) => Err(VisitError::InvalidArgument {
                operator: operator.to_string(),
                message: format!("property name must be a string, found {}", other.describe()),
            }),
        }
    }

    fn resolve_alias(&self, name: &str) -> PropertyPath {
        match self.options.property_name_map.get(name) {
            Some(path) => PropertyPath::parse(path),
            None => PropertyPath::parse(name),
        }
    }
}

/// Splits a sort key into its property and direction.
///
/// Keys are `[property, descending]`, `-property`, `+property`, `property`,
/// or null for the item itself.
fn sort_key(arg: &Arg) -> Result<(Option<String>, bool), VisitError> {
    match arg {
        Arg::Undefined | Arg::Null => Ok((None, false)),
        Arg::Array(parts) => {
            let descending = parts.get(1).is_some_and(Arg::is_truthy);
            match parts.first() {
                None | Some(Arg::Undefined) | Some(Arg::Null) => Ok((None, descending)),
                Some(Arg::String(name)) => Ok((Some(name.clone()), descending)),
                Some(other) => Err(VisitError::InvalidArgument {
                    operator: "sort".to_string(),
                    message: format!("property name must be a string, found {}", other.describe()),
                }),
            }
        }
        Arg::String(key) => {
            if let Some(name) = key.strip_prefix('-') {
                Ok((Some(name.to_string()), true))
            } else if let Some(name) = key.strip_prefix('+') {
                Ok((Some(name.to_string()), false))
            } else {
                Ok((Some(key.clone()), false))
            }
        }
        other => Err(VisitError::InvalidArgument {
            operator: "sort".to_string(),
            message: format!("invalid sort key {}", other.describe()),
        }),
    }
}

pub fn reverse_comparator(comparator: Comparator) -> Comparator {
    Box::new(move |a: &Value, b: &Value| comparator(a, b).reverse())
}

/// Chains `second` after `first`: the first non-equal result wins.
pub fn then_comparator(first: Option<Comparator>, second: Comparator) -> Comparator {
    match first {
        None => second,
        Some(first) => Box::new(move |a: &Value, b: &Value| first(a, b).then_with(|| second(a, b))),
    }
}

/// Converts a comparison target to a value. Dates compare by their ISO form.
fn target_value(operator: &str, arg: Option<&Arg>) -> Result<Option<Value>, VisitError> {
    let value = match arg {
        None | Some(Arg::Undefined) => return Ok(None),
        Some(Arg::Null) => Value::Null,
        Some(Arg::Boolean(b)) => Value::Boolean(*b),
        Some(Arg::Integer(n)) => Value::Integer(*n),
        Some(Arg::Float(n)) => Value::Float(*n),
        Some(Arg::String(s)) => Value::String(s.clone()),
        Some(Arg::Date(d)) => Value::String(iso_string(d)),
        Some(Arg::Array(items)) => Value::Array(
            items
                .iter()
                .map(|a| target_value(operator, Some(a)).map(|v| v.unwrap_or(Value::Null)))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(Arg::Node(node)) => {
            return Err(VisitError::InvalidArgument {
                operator: operator.to_string(),
                message: format!("cannot compare against a {} node", node.name),
            });
        }
    };
    Ok(Some(value))
}

/// A non-negative whole number argument of `limit`.
fn count_arg(operator: &str, arg: &Arg) -> Result<usize, VisitError> {
    let count = match arg {
        Arg::Integer(n) => usize::try_from(*n).ok(),
        Arg::Float(n) if n.fract() == 0.0 && *n >= 0.0 && *n <= usize::MAX as f64 => Some(*n as usize),
        _ => None,
    };
    count.ok_or_else(|| VisitError::InvalidArgument {
        operator: operator.to_string(),
        message: format!("expected a non-negative whole number, found {}", arg.describe()),
    })
}
