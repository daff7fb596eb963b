//! Output records.

use serde::{Deserialize, Serialize};

/// One per-sample variant call, projected by the list operation.
///
/// Every column is optional: unselected columns stay `None` and are omitted
/// from serialization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locus_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zygosity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pf: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub af: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gnomad_v3_af: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hgvsg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omim_inheritance_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vep_impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinvar_interpretation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mane_select: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<bool>,
}

/// One group-by bucket of the aggregate operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub key: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_unselected_columns_are_absent() {
        let occurrence = Occurrence {
            locus_id: Some(1000),
            ..Default::default()
        };
        let value = serde_json::to_value(&occurrence).unwrap();
        assert_eq!(value, json!({"locus_id": 1000}));
    }

    #[test]
    fn test_full_projection_serializes_by_label() {
        let occurrence = Occurrence {
            seq_id: Some(1),
            locus_id: Some(1000),
            filter: Some("PASS".to_string()),
            zygosity: Some("HET".to_string()),
            pf: Some(0.99),
            af: Some(0.01),
            hgvsg: Some("hgvsg1".to_string()),
            ad_ratio: Some(1.0),
            variant_class: Some("class1".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&occurrence).unwrap();
        assert_eq!(
            value,
            json!({
                "seq_id": 1,
                "locus_id": 1000,
                "filter": "PASS",
                "zygosity": "HET",
                "pf": 0.99,
                "af": 0.01,
                "hgvsg": "hgvsg1",
                "ad_ratio": 1.0,
                "variant_class": "class1"
            })
        );
    }

    #[test]
    fn test_aggregation_shape() {
        let bucket = Aggregation {
            key: "HET".to_string(),
            count: 2,
        };
        assert_eq!(
            serde_json::to_value(&bucket).unwrap(),
            json!({"key": "HET", "count": 2})
        );
    }
}
