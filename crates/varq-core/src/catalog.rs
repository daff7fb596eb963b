//! Static field catalog.
//!
//! The allow-list of queryable tables and columns, declared in source.
//! Adding a column is an intentional code change: this is the security
//! boundary. Every identifier that reaches generated SQL comes from here,
//! never from request input.

use indexmap::IndexSet;

use crate::query::{SortBody, SortField, SortOrder};

/// A physical table and the alias used to qualify its columns in SQL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub alias: &'static str,
}

/// A catalog entry: one column and its query capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// Physical column name
    pub name: &'static str,
    /// Projected-as name; the output label falls back to `name`
    pub alias: Option<&'static str>,
    /// Whether the field is authorized for selection
    pub can_be_selected: bool,
    /// Whether the field is authorized for filtering
    pub can_be_filtered: bool,
    /// Whether the field is authorized for sorting
    pub can_be_sorted: bool,
    /// Default operation to use if no custom one exists
    pub default_op: &'static str,
    /// Custom operation, e.g. "array_contains"
    pub custom_op: Option<&'static str>,
    /// Table to which the field belongs
    pub table: &'static Table,
}

impl Field {
    /// The output label: alias when set, otherwise the column name.
    pub fn label(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    /// Column reference qualified by the table alias, when one exists.
    pub fn qualified_name(&self) -> String {
        if self.table.alias.is_empty() {
            self.name.to_string()
        } else {
            format!("{}.{}", self.table.alias, self.name)
        }
    }
}

pub static OCCURRENCES_TABLE: Table = Table {
    name: "occurrences",
    alias: "o",
};

pub static VARIANTS_TABLE: Table = Table {
    name: "variants",
    alias: "v",
};

const OCCURRENCE_FIELD: Field = Field {
    name: "",
    alias: None,
    can_be_selected: true,
    can_be_filtered: true,
    can_be_sorted: true,
    default_op: "default",
    custom_op: None,
    table: &OCCURRENCES_TABLE,
};

const VARIANT_FIELD: Field = Field {
    name: "",
    alias: None,
    can_be_selected: true,
    can_be_filtered: true,
    can_be_sorted: false,
    default_op: "default",
    custom_op: None,
    table: &VARIANTS_TABLE,
};

pub static SEQ_ID_FIELD: Field = Field {
    name: "seq_id",
    ..OCCURRENCE_FIELD
};
pub static LOCUS_ID_FIELD: Field = Field {
    name: "locus_id",
    ..OCCURRENCE_FIELD
};
pub static QUALITY_FIELD: Field = Field {
    name: "quality",
    ..OCCURRENCE_FIELD
};
pub static FILTER_FIELD: Field = Field {
    name: "filter",
    ..OCCURRENCE_FIELD
};
pub static ZYGOSITY_FIELD: Field = Field {
    name: "zygosity",
    ..OCCURRENCE_FIELD
};
pub static AD_RATIO_FIELD: Field = Field {
    name: "ad_ratio",
    ..OCCURRENCE_FIELD
};

pub static PF_FIELD: Field = Field {
    name: "pf",
    can_be_sorted: true,
    ..VARIANT_FIELD
};
pub static AF_FIELD: Field = Field {
    name: "af",
    can_be_sorted: true,
    ..VARIANT_FIELD
};
pub static GNOMAD_V3_AF_FIELD: Field = Field {
    name: "gnomad_v3_af",
    can_be_sorted: true,
    ..VARIANT_FIELD
};
pub static HGVSG_FIELD: Field = Field {
    name: "hgvsg",
    ..VARIANT_FIELD
};
pub static VARIANT_CLASS_FIELD: Field = Field {
    name: "variant_class",
    ..VARIANT_FIELD
};
pub static VEP_IMPACT_FIELD: Field = Field {
    name: "vep_impact",
    ..VARIANT_FIELD
};
pub static SYMBOL_FIELD: Field = Field {
    name: "symbol",
    ..VARIANT_FIELD
};
pub static CLINVAR_INTERPRETATION_FIELD: Field = Field {
    name: "clinvar_interpretation",
    custom_op: Some("array_contains"),
    ..VARIANT_FIELD
};
pub static MANE_SELECT_FIELD: Field = Field {
    name: "mane_select",
    ..VARIANT_FIELD
};
pub static CANONICAL_FIELD: Field = Field {
    name: "canonical",
    ..VARIANT_FIELD
};
pub static OMIM_INHERITANCE_CODE_FIELD: Field = Field {
    name: "omim_inheritance_code",
    ..VARIANT_FIELD
};

/// Every field queryable through the occurrences endpoints.
pub static FIELDS: &[&Field] = &[
    &SEQ_ID_FIELD,
    &LOCUS_ID_FIELD,
    &QUALITY_FIELD,
    &FILTER_FIELD,
    &ZYGOSITY_FIELD,
    &AD_RATIO_FIELD,
    &PF_FIELD,
    &AF_FIELD,
    &GNOMAD_V3_AF_FIELD,
    &HGVSG_FIELD,
    &VARIANT_CLASS_FIELD,
    &VEP_IMPACT_FIELD,
    &SYMBOL_FIELD,
    &CLINVAR_INTERPRETATION_FIELD,
    &MANE_SELECT_FIELD,
    &CANONICAL_FIELD,
    &OMIM_INHERITANCE_CODE_FIELD,
];

/// Look up a field by column name.
pub fn find_by_name(name: &str) -> Option<&'static Field> {
    FIELDS.iter().copied().find(|f| f.name == name)
}

/// Resolve a projection list to selectable fields.
///
/// Preserves input order, drops unknown or non-selectable names, and
/// de-duplicates with first occurrence winning.
pub fn find_selected_fields(selected: &[String]) -> Vec<&'static Field> {
    let mut seen: IndexSet<&str> = IndexSet::new();
    let mut fields = Vec::new();
    for name in selected {
        if let Some(field) = find_by_name(name) {
            if field.can_be_selected && seen.insert(field.name) {
                fields.push(field);
            }
        }
    }
    fields
}

/// Resolve a sort list to sortable fields.
///
/// Keeps entries whose field exists, is sortable, and whose order is exactly
/// `asc` or `desc`; silently drops the rest.
pub fn find_sorted_fields(sorted: &[SortBody]) -> Vec<SortField> {
    let mut fields = Vec::new();
    for sort in sorted {
        let field = match find_by_name(&sort.field) {
            Some(f) if f.can_be_sorted => f,
            _ => continue,
        };
        if let Some(order) = SortOrder::parse(&sort.order) {
            fields.push(SortField { field, order });
        }
    }
    fields
}
