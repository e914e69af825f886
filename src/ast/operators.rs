use std::fmt;

use serde::{Serialize, Serializer};

/// The operator a [`Node`](crate::ast::Node) applies.
///
/// The set is closed: every name the engine understands has a variant, and
/// anything else is carried verbatim in [`Operator::Other`] so it can still be
/// encoded for a remote endpoint that knows it. The local interpreter rejects
/// `Other` nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    // Combinators
    /// Conjunction (`and`)
    And,
    /// Disjunction (`or`)
    Or,
    /// Negation (`not`)
    Not,

    // Comparators
    /// Equal (`eq`)
    Eq,
    /// Not equal (`ne`)
    Ne,
    /// Less than or equal (`le`)
    Le,
    /// Greater than or equal (`ge`)
    Ge,
    /// Less than (`lt`)
    Lt,
    /// Greater than (`gt`)
    Gt,
    /// Membership in a candidate set (`in`)
    In,
    /// Glob-style wildcard match (`match`)
    Match,
    /// Substring or element containment (`contains`)
    Contains,

    // Result shaping
    /// Ordering of the result (`sort`)
    Sort,
    /// Page window of the result (`limit`)
    Limit,

    /// Any other operator name
    Other(String),
}

impl Operator {
    pub fn parse(name: &str) -> Self {
        match name {
            "and" => Operator::And,
            "or" => Operator::Or,
            "not" => Operator::Not,
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "le" => Operator::Le,
            "ge" => Operator::Ge,
            "lt" => Operator::Lt,
            "gt" => Operator::Gt,
            "in" => Operator::In,
            "match" => Operator::Match,
            "contains" => Operator::Contains,
            "sort" => Operator::Sort,
            "limit" => Operator::Limit,
            other => Operator::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Le => "le",
            Operator::Ge => "ge",
            Operator::Lt => "lt",
            Operator::Gt => "gt",
            Operator::In => "in",
            Operator::Match => "match",
            Operator::Contains => "contains",
            Operator::Sort => "sort",
            Operator::Limit => "limit",
            Operator::Other(name) => name,
        }
    }

    /// `and` or `or`, the associative combinators that normalization flattens.
    pub fn is_and_or(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }
}

impl From<&str> for Operator {
    fn from(name: &str) -> Self {
        Operator::parse(name)
    }
}

impl From<String> for Operator {
    fn from(name: String) -> Self {
        Operator::parse(&name)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
