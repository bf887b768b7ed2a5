//! Dumping a parsed tree as JSON (requires the `serde` feature)
#![cfg(feature = "serde")]

use std::collections::HashMap;

use metric_formula::{parse, parse_with_variables, Formula};

#[test]
fn test_tree_round_trips_through_json() {
    let formula = parse("(a + 2) * 50%").unwrap();

    let json = serde_json::to_value(&formula).unwrap();
    assert_eq!(json["text"], "(a + 2) * 50%");
    assert_eq!(json["expr"]["Binary"]["op"], "Multiply");
    assert_eq!(json["expr"]["Binary"]["right"]["Constant"]["value"], 0.5);

    let restored: Formula = serde_json::from_value(json).unwrap();
    assert_eq!(restored, formula);
}

#[test]
fn test_variable_mapping_is_serialized() {
    let mut vars = HashMap::from([("unit price".to_string(), 3.0)]);
    let formula = parse_with_variables("unit price * 2", &mut vars).unwrap();

    let json = serde_json::to_value(&formula).unwrap();
    assert_eq!(json["variable_mapping"]["unit price"], "v1");
}
