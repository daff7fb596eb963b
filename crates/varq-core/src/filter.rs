//! Filter AST and its SQL rendering.
//!
//! The tree is produced only from validated SQON ([`crate::sqon`]); each
//! comparison carries a resolved catalog field, never a raw name.

use serde_json::Value as JsonValue;
use varq_sql::{SqlFragment, SqlParam};

use crate::catalog::Field;

/// Comparison operators of the filter grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    In,
    NotIn,
    Lt,
    Lte,
    Gt,
    Gte,
    Between,
}

impl CompareOp {
    /// Parse a wire operator name.
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "in" => Some(Self::In),
            "not-in" => Some(Self::NotIn),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "between" => Some(Self::Between),
            _ => None,
        }
    }

    /// Whether the operator accepts a sequence value.
    pub fn accepts_sequence(&self) -> bool {
        matches!(self, Self::In | Self::NotIn | Self::Between)
    }
}

/// A validated filter tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterNode {
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    Not(Box<FilterNode>),
    Comparison {
        op: CompareOp,
        value: JsonValue,
        field: &'static Field,
    },
}

impl FilterNode {
    /// Render this node as a SQL fragment with its parameters in placeholder
    /// order.
    pub fn to_sql(&self) -> SqlFragment {
        match self {
            Self::And(children) => Self::children_to_sql(children, " AND "),
            Self::Or(children) => Self::children_to_sql(children, " OR "),
            Self::Not(child) => {
                let mut frag = SqlFragment::raw("NOT (");
                frag.append(child.to_sql());
                frag.push(")");
                frag
            }
            Self::Comparison { op, value, field } => comparison_to_sql(*op, value, field),
        }
    }

    fn children_to_sql(children: &[FilterNode], sep: &str) -> SqlFragment {
        SqlFragment::join(sep, children.iter().map(FilterNode::to_sql)).parens()
    }
}

fn comparison_to_sql(op: CompareOp, value: &JsonValue, field: &Field) -> SqlFragment {
    let column = field.qualified_name();

    // Sequence values flatten in order; a scalar binds as one parameter.
    let params: Vec<SqlParam> = match value {
        JsonValue::Array(items) => items.iter().map(SqlParam::from).collect(),
        other => vec![SqlParam::from(other)],
    };

    let mut frag = SqlFragment::new();
    match op {
        CompareOp::In if params.len() == 1 => {
            frag.push(&column);
            frag.push(" = ");
            frag.push_param_list(params);
        }
        CompareOp::In => {
            frag.push(&column);
            frag.push(" IN (");
            frag.push_param_list(params);
            frag.push(")");
        }
        CompareOp::NotIn if params.len() == 1 => {
            frag.push(&column);
            frag.push(" <> ");
            frag.push_param_list(params);
        }
        CompareOp::NotIn => {
            frag.push(&column);
            frag.push(" NOT IN (");
            frag.push_param_list(params);
            frag.push(")");
        }
        CompareOp::Lt | CompareOp::Lte | CompareOp::Gt | CompareOp::Gte => {
            let sym = match op {
                CompareOp::Lt => " < ",
                CompareOp::Lte => " <= ",
                CompareOp::Gt => " > ",
                _ => " >= ",
            };
            frag.push(&column);
            frag.push(sym);
            frag.push_param_list(params);
        }
        CompareOp::Between => {
            // Validation enforced exactly two values.
            let mut params = params.into_iter();
            frag.push(&column);
            frag.push(" BETWEEN ");
            frag.push_param(params.next().unwrap_or(SqlParam::Null));
            frag.push(" AND ");
            frag.push_param(params.next().unwrap_or(SqlParam::Null));
        }
    }
    frag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AF_FIELD, FILTER_FIELD, LOCUS_ID_FIELD, ZYGOSITY_FIELD};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn comparison(op: CompareOp, value: JsonValue, field: &'static Field) -> FilterNode {
        FilterNode::Comparison { op, value, field }
    }

    #[test]
    fn test_in_multiple_values() {
        let node = comparison(CompareOp::In, json!(["PASS", "DRAGEN"]), &FILTER_FIELD);
        let frag = node.to_sql();
        assert_eq!(frag.sql(), "o.filter IN (?, ?)");
        assert_eq!(
            frag.params(),
            &[SqlParam::text("PASS"), SqlParam::text("DRAGEN")]
        );
    }

    #[test]
    fn test_in_single_value_collapses_to_equals() {
        let node = comparison(CompareOp::In, json!(["PASS"]), &FILTER_FIELD);
        let frag = node.to_sql();
        assert_eq!(frag.sql(), "o.filter = ?");

        let scalar = comparison(CompareOp::In, json!("PASS"), &FILTER_FIELD);
        assert_eq!(scalar.to_sql().sql(), "o.filter = ?");
    }

    #[test]
    fn test_not_in_single_value_collapses_to_not_equals() {
        let node = comparison(CompareOp::NotIn, json!("HOM"), &ZYGOSITY_FIELD);
        let frag = node.to_sql();
        assert_eq!(frag.sql(), "o.zygosity <> ?");
    }

    #[test]
    fn test_relational_ops() {
        let node = comparison(CompareOp::Gte, json!(0.01), &AF_FIELD);
        let frag = node.to_sql();
        assert_eq!(frag.sql(), "v.af >= ?");
        assert_eq!(frag.params(), &[SqlParam::Float(0.01)]);
    }

    #[test]
    fn test_between() {
        let node = comparison(CompareOp::Between, json!([1000, 2000]), &LOCUS_ID_FIELD);
        let frag = node.to_sql();
        assert_eq!(frag.sql(), "o.locus_id BETWEEN ? AND ?");
        assert_eq!(frag.params(), &[SqlParam::Int(1000), SqlParam::Int(2000)]);
    }

    #[test]
    fn test_not_wraps_child() {
        let node = FilterNode::Not(Box::new(comparison(
            CompareOp::NotIn,
            json!(["HET", "HOM"]),
            &ZYGOSITY_FIELD,
        )));
        let frag = node.to_sql();
        assert_eq!(frag.sql(), "NOT (o.zygosity NOT IN (?, ?))");
        assert_eq!(frag.param_count(), 2);
    }

    #[test]
    fn test_nested_tree_param_order() {
        let node = FilterNode::Or(vec![
            comparison(CompareOp::In, json!([1000, 2000]), &LOCUS_ID_FIELD),
            FilterNode::And(vec![
                comparison(CompareOp::In, json!(["PASS"]), &FILTER_FIELD),
                comparison(CompareOp::Gte, json!(0.5), &AF_FIELD),
            ]),
            FilterNode::Not(Box::new(comparison(
                CompareOp::NotIn,
                json!(["HET", "HOM"]),
                &ZYGOSITY_FIELD,
            ))),
        ]);

        let frag = node.to_sql();
        assert_eq!(
            frag.sql(),
            "(o.locus_id IN (?, ?) OR (o.filter = ? AND v.af >= ?) OR NOT (o.zygosity NOT IN (?, ?)))"
        );
        assert_eq!(
            frag.params(),
            &[
                SqlParam::Int(1000),
                SqlParam::Int(2000),
                SqlParam::text("PASS"),
                SqlParam::Float(0.5),
                SqlParam::text("HET"),
                SqlParam::text("HOM"),
            ]
        );
    }

    #[test]
    fn test_placeholders_match_params() {
        let node = FilterNode::And(vec![
            comparison(CompareOp::Between, json!([10, 20]), &LOCUS_ID_FIELD),
            comparison(CompareOp::In, json!(["a", "b", "c"]), &FILTER_FIELD),
        ]);
        let frag = node.to_sql();
        assert_eq!(frag.sql().matches('?').count(), frag.param_count());
    }
}
