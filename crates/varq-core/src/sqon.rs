//! SQON model and validator.
//!
//! SQON (Simple Query Object Notation) is the JSON filter tree accepted by
//! the API. Validation walks the tree in pre-order and produces the filter
//! AST plus the set of fields it touches; any rule violation rejects the
//! whole request.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::catalog::{self, Field};
use crate::error::{Error, Result};
use crate::filter::{CompareOp, FilterNode};

/// A node of the wire filter tree.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Sqon {
    /// Operation at this node
    #[serde(default)]
    pub op: String,
    /// Field to filter on (comparison nodes)
    #[serde(default)]
    pub field: Option<String>,
    /// Value(s) for the filter (comparison nodes)
    #[serde(default)]
    pub value: Option<JsonValue>,
    /// Child nodes (logical nodes)
    #[serde(default)]
    pub content: Option<Vec<Sqon>>,
}

/// Validate a SQON tree and build the filter AST.
///
/// Returns the AST together with every field referenced by a comparison,
/// de-duplicated in order of first appearance.
pub fn parse_sqon(sqon: &Sqon) -> Result<(FilterNode, Vec<&'static Field>)> {
    let mut fields: Vec<&'static Field> = Vec::new();
    let node = parse_node(sqon, &mut fields)?;
    Ok((node, fields))
}

fn parse_node(sqon: &Sqon, fields: &mut Vec<&'static Field>) -> Result<FilterNode> {
    if sqon.field.is_some() && sqon.content.is_some() {
        return Err(invalid(format!(
            "a sqon cannot have both content and field defined: {}",
            field_name(sqon)
        )));
    }

    match sqon.op.as_str() {
        "and" | "or" => {
            let content = sqon
                .content
                .as_deref()
                .filter(|c| !c.is_empty())
                .ok_or_else(|| {
                    invalid(format!("operation {} must have at least one child", sqon.op))
                })?;

            // Flatten single-child AND/OR nodes
            if content.len() == 1 {
                return parse_node(&content[0], fields);
            }

            let mut children = Vec::with_capacity(content.len());
            for item in content {
                children.push(parse_node(item, fields)?);
            }
            if sqon.op == "and" {
                Ok(FilterNode::And(children))
            } else {
                Ok(FilterNode::Or(children))
            }
        }

        "not" => {
            let content = sqon.content.as_deref().unwrap_or_default();
            if content.len() != 1 {
                return Err(invalid(format!(
                    "'not' operation must have exactly one child: {}",
                    field_name(sqon)
                )));
            }
            let child = parse_node(&content[0], fields)?;
            Ok(FilterNode::Not(Box::new(child)))
        }

        "all" => Err(invalid(format!(
            "operation all is not implemented: {}",
            field_name(sqon)
        ))),

        op => {
            let compare_op = CompareOp::parse(op)
                .ok_or_else(|| invalid(format!("invalid operation: {}", op)))?;
            parse_comparison(sqon, compare_op, fields)
        }
    }
}

fn parse_comparison(
    sqon: &Sqon,
    op: CompareOp,
    fields: &mut Vec<&'static Field>,
) -> Result<FilterNode> {
    let value = sqon
        .value
        .as_ref()
        .ok_or_else(|| invalid(format!("value must be defined: {}", field_name(sqon))))?;

    let field = catalog::find_by_name(field_name(sqon))
        .filter(|f| f.can_be_filtered)
        .ok_or_else(|| {
            invalid(format!(
                "unauthorized or unknown field: {}",
                field_name(sqon)
            ))
        })?;

    if op == CompareOp::Between {
        match value {
            JsonValue::Array(items) if items.len() == 2 => {}
            JsonValue::Array(_) => {
                return Err(invalid(format!(
                    "value array should contain exactly 2 elements when operation is 'between': {}",
                    field.name
                )));
            }
            _ => {
                return Err(invalid(format!(
                    "value should be an array of 2 elements when operation is 'between': {}",
                    field.name
                )));
            }
        }
    } else if !op.accepts_sequence() && value.is_array() {
        return Err(invalid(format!(
            "operation {} must have exactly one value: {}",
            sqon.op, field.name
        )));
    }

    if !fields.iter().any(|f| f.name == field.name) {
        fields.push(field);
    }

    Ok(FilterNode::Comparison {
        op,
        value: value.clone(),
        field,
    })
}

fn field_name(sqon: &Sqon) -> &str {
    sqon.field.as_deref().unwrap_or_default()
}

fn invalid(reason: String) -> Error {
    Error::InvalidSqon(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sqon(value: serde_json::Value) -> Sqon {
        serde_json::from_value(value).unwrap()
    }

    fn parse(value: serde_json::Value) -> Result<(FilterNode, Vec<&'static Field>)> {
        parse_sqon(&sqon(value))
    }

    #[test]
    fn test_parse_comparison_tree() {
        let (ast, fields) = parse(json!({
            "op": "and",
            "content": [
                {"op": "in", "field": "filter", "value": ["PASS", "DRAGEN"]},
                {"op": ">", "field": "af", "value": 0.5}
            ]
        }))
        .unwrap();

        let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["filter", "af"]);

        match ast {
            FilterNode::And(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(
                    &children[0],
                    FilterNode::Comparison { op: CompareOp::In, field, .. } if field.name == "filter"
                ));
                assert!(matches!(
                    &children[1],
                    FilterNode::Comparison { op: CompareOp::Gt, field, .. } if field.name == "af"
                ));
            }
            other => panic!("expected And node, got {:?}", other),
        }
    }

    #[test]
    fn test_single_child_and_or_flattened() {
        for op in ["and", "or"] {
            let (ast, fields) = parse(json!({
                "op": op,
                "content": [{"op": "in", "field": "zygosity", "value": ["HET", "HOM"]}]
            }))
            .unwrap();

            assert!(matches!(
                ast,
                FilterNode::Comparison { op: CompareOp::In, field, .. } if field.name == "zygosity"
            ));
            assert_eq!(fields.len(), 1);
        }
    }

    #[test]
    fn test_filtered_fields_deduplicated_in_order() {
        let (_, fields) = parse(json!({
            "op": "or",
            "content": [
                {"op": "in", "field": "zygosity", "value": "HET"},
                {"op": "in", "field": "filter", "value": "PASS"},
                {"op": "in", "field": "zygosity", "value": "HOM"}
            ]
        }))
        .unwrap();

        let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["zygosity", "filter"]);
    }

    #[test]
    fn test_invalid_operation() {
        let err = parse(json!({"op": "like", "field": "filter", "value": "PASS"})).unwrap_err();
        assert!(err.to_string().contains("invalid operation: like"));
    }

    #[test]
    fn test_all_rejected() {
        let err = parse(json!({"op": "all", "field": "filter", "value": ["PASS"]})).unwrap_err();
        assert!(err.to_string().contains("operation all is not implemented"));
    }

    #[test]
    fn test_unknown_or_unfilterable_field() {
        let err = parse(json!({"op": "in", "field": "my_field", "value": 1})).unwrap_err();
        assert!(err.to_string().contains("unauthorized or unknown field: my_field"));
    }

    #[test]
    fn test_field_and_content_exclusive() {
        let err = parse(json!({
            "op": "and",
            "field": "filter",
            "content": [{"op": "in", "field": "filter", "value": "PASS"}]
        }))
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("a sqon cannot have both content and field defined"));
    }

    #[test]
    fn test_missing_value() {
        let err = parse(json!({"op": "in", "field": "filter"})).unwrap_err();
        assert!(err.to_string().contains("value must be defined: filter"));
    }

    #[test]
    fn test_not_requires_exactly_one_child() {
        let err = parse(json!({
            "op": "not",
            "content": [
                {"op": "in", "field": "filter", "value": "PASS"},
                {"op": "in", "field": "zygosity", "value": "HET"}
            ]
        }))
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("'not' operation must have exactly one child"));
    }

    #[test]
    fn test_logical_requires_content() {
        let err = parse(json!({"op": "and"})).unwrap_err();
        assert!(err
            .to_string()
            .contains("operation and must have at least one child"));
    }

    #[test]
    fn test_between_requires_two_element_array() {
        let scalar =
            parse(json!({"op": "between", "field": "locus_id", "value": 30})).unwrap_err();
        assert!(scalar
            .to_string()
            .contains("value should be an array of 2 elements when operation is 'between'"));

        for bad in [json!([30]), json!([30, 40, 50])] {
            let err =
                parse(json!({"op": "between", "field": "locus_id", "value": bad})).unwrap_err();
            assert!(err.to_string().contains(
                "value array should contain exactly 2 elements when operation is 'between'"
            ));
        }
    }

    #[test]
    fn test_single_value_ops_reject_sequences() {
        let err =
            parse(json!({"op": ">=", "field": "af", "value": [0.1, 0.2, 0.3]})).unwrap_err();
        assert!(err
            .to_string()
            .contains("operation >= must have exactly one value: af"));
    }
}
