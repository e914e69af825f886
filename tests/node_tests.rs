// tests/node_tests.rs

use chrono::{TimeZone, Utc};
use rql_engine::ast::{Arg, ArgError, Node, Operator};
use serde_json::json;

fn leaf(name: &str) -> Node {
    Node::new("eq", vec![name.into(), 1.into()])
}

fn normalized(node: Node) -> Node {
    match node.normalize() {
        Arg::Node(node) => node,
        other => panic!("Expected a node, got {:?}", other),
    }
}

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn test_flattens_nested_and() {
    let node = Node::and(vec![
        Node::and(vec![leaf("a").into(), leaf("b").into()]).into(),
        leaf("c").into(),
    ]);

    assert_eq!(
        normalized(node),
        Node::and(vec![leaf("a").into(), leaf("b").into(), leaf("c").into()])
    );
}

#[test]
fn test_flattens_nested_or() {
    let node = Node::or(vec![
        leaf("a").into(),
        Node::or(vec![leaf("b").into(), leaf("c").into()]).into(),
        leaf("d").into(),
    ]);

    let result = normalized(node);
    assert_eq!(result.name, Operator::Or);
    assert_eq!(
        result.args,
        vec![leaf("a").into(), leaf("b").into(), leaf("c").into(), leaf("d").into()]
    );
}

#[test]
fn test_flattens_deeply() {
    let node = Node::and(vec![Node::and(vec![
        Node::and(vec![leaf("a").into(), leaf("b").into()]).into(),
        leaf("c").into(),
    ])
    .into()]);

    assert_eq!(
        normalized(node),
        Node::and(vec![leaf("a").into(), leaf("b").into(), leaf("c").into()])
    );
}

#[test]
fn test_keeps_mixed_combinators() {
    let or = Node::or(vec![leaf("a").into(), leaf("b").into()]);
    let node = Node::and(vec![or.clone().into(), leaf("c").into()]);

    assert_eq!(normalized(node), Node::and(vec![or.into(), leaf("c").into()]));
}

#[test]
fn test_collapses_single_argument() {
    let node = Node::and(vec![leaf("a").into()]);
    assert_eq!(node.normalize(), Arg::Node(leaf("a")));

    let node = Node::or(vec![Arg::from("x")]);
    assert_eq!(node.normalize(), Arg::from("x"));
}

#[test]
fn test_collapsed_child_is_spliced() {
    // or(or(a)) collapses to a, which is then a plain child of the and
    let node = Node::and(vec![
        Node::or(vec![Node::or(vec![leaf("a").into()]).into()]).into(),
        leaf("b").into(),
    ]);

    assert_eq!(normalized(node), Node::and(vec![leaf("a").into(), leaf("b").into()]));
}

#[test]
fn test_keeps_empty_combinators() {
    assert_eq!(Node::default().normalize(), Arg::Node(Node::default()));

    let node = Node::and(vec![Node::or(vec![]).into(), leaf("a").into()]);
    assert_eq!(
        normalized(node),
        Node::and(vec![Node::or(vec![]).into(), leaf("a").into()])
    );
}

#[test]
fn test_single_argument_of_other_operators_is_kept() {
    let node = Node::new("not", vec![leaf("a").into()]);
    assert_eq!(normalized(node.clone()), node);
}

#[test]
fn test_normalization_is_idempotent() {
    let node = Node::and(vec![
        Node::and(vec![leaf("a").into(), Node::or(vec![leaf("b").into()]).into()]).into(),
        Node::or(vec![
            Node::or(vec![leaf("c").into(), leaf("d").into()]).into(),
            leaf("e").into(),
        ])
        .into(),
        Node::new("sort", vec!["-age".into()]).into(),
    ]);

    let once = node.normalize();
    let twice = once.clone().normalize();
    assert_eq!(once, twice);
}

// ============================================================================
// JSON form
// ============================================================================

#[test]
fn test_to_json() {
    let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let node = Node::and(vec![
        leaf("a").into(),
        Node::new("gt", vec!["at".into(), date.into()]).into(),
        Node::new("in", vec!["b".into(), Arg::from([1, 2])]).into(),
    ]);

    assert_eq!(
        node.to_json(),
        json!({
            "name": "and",
            "args": [
                {"name": "eq", "args": ["a", 1]},
                {"name": "gt", "args": ["at", "2024-01-02T03:04:05.000Z"]},
                {"name": "in", "args": ["b", [1, 2]]},
            ]
        })
    );
}

#[test]
fn test_undefined_serializes_as_null() {
    let node = Node::new("eq", vec!["a".into(), None::<i32>.into()]);
    assert_eq!(node.to_json(), json!({"name": "eq", "args": ["a", null]}));
}

#[test]
fn test_from_json() {
    let value = json!({
        "name": "or",
        "args": [
            {"name": "eq", "args": ["a", 1]},
            {"name": "in", "args": ["b", ["x", 2.5, null, true]]},
        ]
    });

    let node = Node::from_json(value).unwrap();
    assert_eq!(node.name, Operator::Or);
    assert_eq!(node.args[0], Arg::Node(leaf("a")));
    assert_eq!(
        node.args[1],
        Arg::Node(Node::new(
            "in",
            vec![
                "b".into(),
                Arg::Array(vec!["x".into(), Arg::Float(2.5), Arg::Null, Arg::Boolean(true)]),
            ]
        ))
    );
}

#[test]
fn test_from_json_without_args() {
    let node = Node::from_json(json!({"name": "sort"})).unwrap();
    assert_eq!(node, Node::new("sort", vec![]));
}

#[test]
fn test_from_json_round_trip() {
    let node = Node::or(vec![leaf("a").into(), Node::new("limit", vec![10.into(), 5.into()]).into()]);
    assert_eq!(Node::from_json(node.to_json()).unwrap(), node);
}

#[test]
fn test_plain_object_argument_fails() {
    let value = json!({"name": "eq", "args": ["a", {"x": 1}]});
    assert!(matches!(Node::from_json(value), Err(ArgError::Object(_))));
}

#[test]
fn test_object_with_extra_keys_fails() {
    let value = json!({"name": "eq", "args": [], "extra": 1});
    assert!(matches!(Node::from_json(value), Err(ArgError::Object(_))));
}

#[test]
fn test_non_object_fails() {
    assert!(matches!(Node::from_json(json!(5)), Err(ArgError::NotANode(_))));
    assert!(matches!(Node::from_json(json!({"name": 5})), Err(ArgError::Object(_))));
}

// ============================================================================
// Arguments
// ============================================================================

#[test]
fn test_argument_conversions() {
    assert_eq!(Arg::from(Some(3)), Arg::Integer(3));
    assert_eq!(Arg::from(None::<&str>), Arg::Undefined);
    assert_eq!(Arg::from(3usize), Arg::Integer(3));
    assert_eq!(Arg::from(vec!["a", "b"]), Arg::Array(vec!["a".into(), "b".into()]));
    assert_eq!(Arg::from(leaf("a")).as_node(), Some(&leaf("a")));
    assert_eq!(Arg::from("a").as_str(), Some("a"));
}

#[test]
fn test_truthiness() {
    assert!(Arg::Boolean(true).is_truthy());
    assert!(Arg::from("x").is_truthy());
    assert!(Arg::Integer(1).is_truthy());
    assert!(!Arg::Null.is_truthy());
    assert!(!Arg::Undefined.is_truthy());
    assert!(!Arg::from("").is_truthy());
    assert!(!Arg::Float(f64::NAN).is_truthy());
}

#[test]
fn test_operator_names() {
    for name in ["and", "or", "not", "eq", "ne", "le", "ge", "lt", "gt", "in", "match", "contains", "sort", "limit"] {
        let op = Operator::parse(name);
        assert_ne!(op, Operator::Other(name.to_string()));
        assert_eq!(op.as_str(), name);
    }
    assert_eq!(Operator::from("bogus"), Operator::Other("bogus".to_string()));
    assert_eq!(Operator::Other("bogus".to_string()).to_string(), "bogus");
}
