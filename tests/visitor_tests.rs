// tests/visitor_tests.rs

use chrono::{TimeZone, Utc};
use rql_engine::visitor::{PropertyPath, Visitor, VisitError, VisitorOptions};
use rql_engine::{Arg, Node, Value};
use serde_json::json;

fn node(name: &str, args: Vec<Arg>) -> Node {
    Node::new(name, args)
}

fn item(value: serde_json::Value) -> Value {
    Value::from(value)
}

fn test(query: &Node, value: serde_json::Value) -> Result<bool, VisitError> {
    let predicate = Visitor::default().visit(query)?;
    predicate(&item(value))
}

fn holds(query: &Node, value: serde_json::Value) -> bool {
    test(query, value).unwrap()
}

// ============================================================================
// Comparators
// ============================================================================

#[test]
fn test_comparators_on_numbers() {
    let test_cases = vec![
        ("eq", 2, true),
        ("eq", 3, false),
        ("ne", 3, true),
        ("lt", 3, true),
        ("lt", 2, false),
        ("le", 2, true),
        ("gt", 1, true),
        ("gt", 2, false),
        ("ge", 2, true),
        ("ge", 3, false),
    ];

    for (op, target, expected) in test_cases {
        let query = node(op, vec!["a".into(), target.into()]);
        assert_eq!(holds(&query, json!({"a": 2})), expected, "Failed for {}(a,{})", op, target);
    }
}

#[test]
fn test_comparators_on_strings() {
    assert!(holds(&node("lt", vec!["name".into(), "b".into()]), json!({"name": "a"})));
    assert!(holds(&node("gt", vec!["name".into(), "B".into()]), json!({"name": "a"})));
    assert!(holds(&node("eq", vec!["name".into(), "pump".into()]), json!({"name": "pump"})));
}

#[test]
fn test_numeric_string_equals_number() {
    assert!(holds(&node("eq", vec!["a".into(), "1".into()]), json!({"a": 1})));
    assert!(holds(&node("eq", vec!["a".into(), 1.into()]), json!({"a": "1"})));
    assert!(holds(&node("eq", vec!["a".into(), Arg::Float(1.0)]), json!({"a": 1})));
}

#[test]
fn test_missing_and_null_values() {
    let is_null = node("eq", vec!["a.b".into(), Arg::Null]);
    assert!(!holds(&is_null, json!({"a": null})));
    assert!(holds(&is_null, json!({"a": {"b": null}})));

    let missing = node("eq", vec!["a.b".into(), Arg::Undefined]);
    assert!(holds(&missing, json!({"a": null})));
    assert!(holds(&missing, json!({})));
}

#[test]
fn test_nested_paths() {
    let query = node("eq", vec!["device.tags.0".into(), "hot".into()]);
    assert!(holds(&query, json!({"device": {"tags": ["hot", "new"]}})));
    assert!(!holds(&query, json!({"device": {"tags": []}})));
}

#[test]
fn test_null_property_is_the_item() {
    let query = node("gt", vec![Arg::Null, 3.into()]);
    assert!(holds(&query, json!(4)));
    assert!(!holds(&query, json!(2)));
}

#[test]
fn test_date_targets_compare_as_iso_strings() {
    let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let query = node("eq", vec!["at".into(), date.into()]);
    assert!(holds(&query, json!({"at": "2024-01-02T03:04:05.000Z"})));

    let after = node("gt", vec!["at".into(), date.into()]);
    assert!(holds(&after, json!({"at": "2024-06-01T00:00:00.000Z"})));
}

#[test]
fn test_array_targets_compare_structurally() {
    let query = node("eq", vec!["a".into(), Arg::from([1, 2])]);
    assert!(holds(&query, json!({"a": [1, 2]})));
    assert!(!holds(&query, json!({"a": [2, 1]})));
}

// ============================================================================
// Combinators
// ============================================================================

#[test]
fn test_and_or() {
    let a1 = node("eq", vec!["a".into(), 1.into()]);
    let b2 = node("eq", vec!["b".into(), 2.into()]);

    let and = Node::and(vec![a1.clone().into(), b2.clone().into()]);
    assert!(holds(&and, json!({"a": 1, "b": 2})));
    assert!(!holds(&and, json!({"a": 1, "b": 3})));

    let or = Node::or(vec![a1.into(), b2.into()]);
    assert!(holds(&or, json!({"a": 0, "b": 2})));
    assert!(!holds(&or, json!({"a": 0, "b": 0})));
}

#[test]
fn test_empty_combinators() {
    assert!(holds(&Node::and(vec![]), json!({})));
    assert!(!holds(&Node::or(vec![]), json!({})));
}

#[test]
fn test_not_negates_conjunction() {
    let not = node(
        "not",
        vec![
            node("eq", vec!["a".into(), 1.into()]).into(),
            node("eq", vec!["b".into(), 2.into()]).into(),
        ],
    );
    assert!(!holds(&not, json!({"a": 1, "b": 2})));
    assert!(holds(&not, json!({"a": 1, "b": 3})));
}

#[test]
fn test_nested_not() {
    let query = Node::and(vec![
        node("gt", vec!["a".into(), 0.into()]).into(),
        node("not", vec![node("eq", vec!["a".into(), 2.into()]).into()]).into(),
    ]);
    assert!(holds(&query, json!({"a": 1})));
    assert!(!holds(&query, json!({"a": 2})));
    assert!(!holds(&query, json!({"a": 0})));
}

#[test]
fn test_non_node_child_fails() {
    let query = Node::and(vec!["x".into()]);
    let err = Visitor::default().visit(&query).err().unwrap();
    assert_eq!(err, VisitError::NotANode("string \"x\"".to_string()));
}

// ============================================================================
// Membership and patterns
// ============================================================================

#[test]
fn test_in_with_array() {
    let query = node("in", vec!["status".into(), Arg::from(["active", "idle"])]);
    assert!(holds(&query, json!({"status": "idle"})));
    assert!(!holds(&query, json!({"status": "off"})));
}

#[test]
fn test_in_with_varargs() {
    let query = node("in", vec!["a".into(), 1.into(), 2.into(), 3.into()]);
    assert!(holds(&query, json!({"a": 3})));
    assert!(!holds(&query, json!({"a": 4})));
}

#[test]
fn test_match_wildcards() {
    let query = node("match", vec!["name".into(), "*foo?".into()]);
    assert!(holds(&query, json!({"name": "xxfooY"})));
    assert!(holds(&query, json!({"name": "fooY"})));
    assert!(!holds(&query, json!({"name": "xxfoo"})));
    assert!(!holds(&query, json!({"name": "xxfooYZ"})));
}

#[test]
fn test_match_is_case_insensitive_by_default() {
    let query = node("match", vec!["name".into(), "pump*".into()]);
    assert!(holds(&query, json!({"name": "PUMP-1"})));

    let sensitive = node("match", vec!["name".into(), "pump*".into(), true.into()]);
    assert!(!holds(&sensitive, json!({"name": "PUMP-1"})));
    assert!(holds(&sensitive, json!({"name": "pump-1"})));
}

#[test]
fn test_match_escapes() {
    let query = node("match", vec!["name".into(), r"a\*b".into()]);
    assert!(holds(&query, json!({"name": "a*b"})));
    assert!(!holds(&query, json!({"name": "axxb"})));

    let regex_chars = node("match", vec!["name".into(), "a.b+".into()]);
    assert!(holds(&regex_chars, json!({"name": "a.b+"})));
    assert!(!holds(&regex_chars, json!({"name": "axbb"})));
}

#[test]
fn test_match_uses_string_form() {
    let query = node("match", vec!["a".into(), "1*".into()]);
    assert!(holds(&query, json!({"a": 123})));
    assert!(!holds(&query, json!({})));

    let undefined = node("match", vec!["a".into(), "undef*".into()]);
    assert!(holds(&undefined, json!({})));
}

#[test]
fn test_contains_string() {
    let query = node("contains", vec!["name".into(), "um".into()]);
    assert!(holds(&query, json!({"name": "pump"})));
    assert!(!holds(&query, json!({"name": "valve"})));
}

#[test]
fn test_contains_array() {
    let query = node("contains", vec!["tags".into(), "hot".into()]);
    assert!(holds(&query, json!({"tags": ["new", "hot"]})));
    assert!(!holds(&query, json!({"tags": ["new"]})));

    let number = node("contains", vec!["ids".into(), 2.into()]);
    assert!(holds(&number, json!({"ids": [1, "2"]})));
}

#[test]
fn test_contains_on_other_types_fails() {
    let query = node("contains", vec!["a".into(), 1.into()]);
    assert_eq!(
        test(&query, json!({"a": 5})),
        Err(VisitError::CannotSearchInside("number"))
    );
    assert_eq!(
        test(&query, json!({})),
        Err(VisitError::CannotSearchInside("undefined"))
    );
    assert_eq!(
        test(&query, json!({"a": {"b": 1}})),
        Err(VisitError::CannotSearchInside("object"))
    );
    assert_eq!(
        VisitError::CannotSearchInside("number").to_string(),
        "Cant search inside number"
    );
}

// ============================================================================
// Unsupported and invalid nodes
// ============================================================================

#[test]
fn test_unsupported_node() {
    let err = Visitor::default().visit(&node("bogus", vec![])).err().unwrap();
    assert_eq!(err, VisitError::UnsupportedNode("bogus".to_string()));
    assert_eq!(err.to_string(), "Unsupported node type: bogus");
}

#[test]
fn test_unsupported_node_nested() {
    let query = Node::or(vec![
        node("eq", vec!["a".into(), 1.into()]).into(),
        node("near", vec!["loc".into(), 5.into()]).into(),
    ]);
    let err = Visitor::default().visit(&query).err().unwrap();
    assert_eq!(err, VisitError::UnsupportedNode("near".to_string()));
}

#[test]
fn test_property_must_be_a_string() {
    let err = Visitor::default()
        .visit(&node("eq", vec![1.into(), 2.into()]))
        .err()
        .unwrap();
    assert!(matches!(err, VisitError::InvalidArgument { ref operator, .. } if operator == "eq"));
}

#[test]
fn test_node_target_fails() {
    let query = node("eq", vec!["a".into(), node("eq", vec!["b".into(), 1.into()]).into()]);
    assert!(matches!(
        Visitor::default().visit(&query),
        Err(VisitError::InvalidArgument { .. })
    ));
}

// ============================================================================
// Sort and limit state
// ============================================================================

#[test]
fn test_limit_state() {
    let mut visitor = Visitor::default();
    let predicate = visitor.visit(&node("limit", vec![2.into(), 3.into()])).unwrap();
    assert!(predicate(&item(json!({}))).unwrap());
    assert_eq!(visitor.limit_value(), Some(2));
    assert_eq!(visitor.offset(), 3);
}

#[test]
fn test_limit_without_offset() {
    let mut visitor = Visitor::default();
    visitor.visit(&node("limit", vec![Arg::Float(5.0)])).unwrap();
    assert_eq!(visitor.limit_value(), Some(5));
    assert_eq!(visitor.offset(), 0);
}

#[test]
fn test_empty_limit_is_ignored() {
    let mut visitor = Visitor::default();
    visitor.visit(&node("limit", vec![])).unwrap();
    assert_eq!(visitor.limit_value(), None);
}

#[test]
fn test_invalid_limit() {
    for arg in [Arg::Integer(-1), Arg::Float(1.5), Arg::from("x"), Arg::Null] {
        let result = Visitor::default().visit(&node("limit", vec![arg.clone()]));
        assert!(
            matches!(result, Err(VisitError::InvalidArgument { .. })),
            "Failed for {:?}",
            arg
        );
    }
}

#[test]
fn test_sort_state() {
    let mut visitor = Visitor::default();
    visitor.visit(&node("sort", vec!["-age".into()])).unwrap();
    let comparator = visitor.take_sort_comparator().unwrap();
    assert!(visitor.take_sort_comparator().is_none());

    let young = item(json!({"age": 1}));
    let old = item(json!({"age": 9}));
    assert_eq!(comparator(&old, &young), std::cmp::Ordering::Less);
}

#[test]
fn test_invalid_sort_key() {
    let result = Visitor::default().visit(&node("sort", vec![5.into()]));
    assert!(matches!(result, Err(VisitError::InvalidArgument { .. })));
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_property_aliases() {
    let options = VisitorOptions::new().with_property_alias("eventType", "eventType.eventType");
    let mut visitor = Visitor::new(options);
    let predicate = visitor
        .visit(&node("eq", vec!["eventType".into(), "ALARM".into()]))
        .unwrap();

    assert!(predicate(&item(json!({"eventType": {"eventType": "ALARM"}}))).unwrap());
    assert!(!predicate(&item(json!({"eventType": "ALARM"}))).unwrap());
}

#[test]
fn test_options_deserialize() {
    let options: VisitorOptions =
        serde_json::from_str(r#"{"propertyNameMap": {"kind": "type.name"}}"#).unwrap();
    assert_eq!(options, VisitorOptions::new().with_property_alias("kind", "type.name"));

    let empty: VisitorOptions = serde_json::from_str("{}").unwrap();
    assert!(empty.property_name_map.is_empty());
}

#[test]
fn test_property_path_resolution() {
    let value = item(json!({"a": {"b": [10, 20]}}));
    assert_eq!(PropertyPath::parse("a.b.1").resolve(&value), Some(&Value::Integer(20)));
    assert_eq!(PropertyPath::parse("a.c.d").resolve(&value), None);
    assert_eq!(PropertyPath::item().resolve(&value), Some(&value));
}
