use serde::Serialize;

use crate::ast::{Arg, ArgError, Operator};
use crate::encoder::{self, EncodeError};

/// One operator application and its ordered arguments.
///
/// For comparators `args[0]` is the property path and `args[1]` the
/// comparison target. Serializes to the JSON form posted to query endpoints,
/// `{"name": "eq", "args": ["name", "pump"]}`.
///
/// # Examples
///
/// ```
/// use rql_engine::{Arg, Node, Operator};
///
/// let node = Node::and(vec![
///     Node::new(Operator::And, vec![Node::new("eq", vec!["a".into(), 1.into()]).into()]).into(),
///     Node::new("gt", vec!["b".into(), 2.into()]).into(),
/// ]);
///
/// let normalized = node.normalize();
/// let root = normalized.as_node().unwrap();
/// assert_eq!(root.args.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: Operator,
    pub args: Vec<Arg>,
}

impl Default for Node {
    /// An empty conjunction.
    fn default() -> Self {
        Node::and(Vec::new())
    }
}

impl Node {
    pub fn new(name: impl Into<Operator>, args: Vec<Arg>) -> Self {
        Node {
            name: name.into(),
            args,
        }
    }

    pub fn and(args: Vec<Arg>) -> Self {
        Node::new(Operator::And, args)
    }

    pub fn or(args: Vec<Arg>) -> Self {
        Node::new(Operator::Or, args)
    }

    pub fn is_and_or(&self) -> bool {
        self.name.is_and_or()
    }

    /// Normalizes the tree, e.g. turns `and(and(a,b),c)` into `and(a,b,c)`.
    ///
    /// Children are normalized first. A child combinator with the same
    /// operator as this node has its arguments spliced in place of itself,
    /// and a combinator left with a single argument is replaced by that
    /// argument, which is why the result is an [`Arg`] rather than a `Node`.
    /// Empty combinators are kept as they are.
    pub fn normalize(mut self) -> Arg {
        let mut i = 0;
        while i < self.args.len() {
            let mut increment = 1;

            match std::mem::replace(&mut self.args[i], Arg::Null) {
                Arg::Node(child) => match child.normalize() {
                    Arg::Node(child) if child.is_and_or() && child.name == self.name => {
                        increment = child.args.len();
                        self.args.splice(i..=i, child.args);
                    }
                    other => self.args[i] = other,
                },
                other => self.args[i] = other,
            }

            i += increment;
        }

        if self.is_and_or() && self.args.len() == 1 {
            return self.args.remove(0);
        }

        Arg::Node(self)
    }

    /// The canonical wire form. The arguments of an `and` node are joined
    /// with `&`; every other node is encoded as `name(args)`.
    pub fn to_rql(&self) -> Result<String, EncodeError> {
        encoder::to_rql(self)
    }

    /// Encodes the node as `name(args)` regardless of operator.
    pub fn encode(&self) -> Result<String, EncodeError> {
        encoder::encode_node(self)
    }

    /// Reads the JSON node form back, rejecting objects that are not nodes.
    pub fn from_json(value: serde_json::Value) -> Result<Node, ArgError> {
        let mut map = match value {
            serde_json::Value::Object(map) => map,
            other => return Err(ArgError::NotANode(other.to_string())),
        };

        let is_node_shape = map.keys().all(|k| k == "name" || k == "args")
            && matches!(map.get("name"), Some(serde_json::Value::String(_)))
            && matches!(map.get("args"), None | Some(serde_json::Value::Array(_)));
        if !is_node_shape {
            return Err(ArgError::Object(serde_json::Value::Object(map).to_string()));
        }

        let name = match map.remove("name") {
            Some(serde_json::Value::String(name)) => name,
            _ => String::new(),
        };
        let args = match map.remove("args") {
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .map(Arg::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };

        Ok(Node::new(name, args))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
