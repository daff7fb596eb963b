//! Query compilation.
//!
//! Combines a projection list, a validated SQON, a sort list, and pagination
//! into the [`Query`] plan the executor consumes.

use serde::Deserialize;

use crate::catalog::{self, Field, Table};
use crate::error::Result;
use crate::filter::FilterNode;
use crate::sqon::{self, Sqon};

/// One sort entry as received on the wire.
#[derive(Clone, Debug, Deserialize)]
pub struct SortBody {
    pub field: String,
    #[serde(default)]
    pub order: String,
}

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a wire direction; anything but exactly `asc`/`desc` is rejected.
    pub fn parse(order: &str) -> Option<Self> {
        match order {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A resolved sort entry.
#[derive(Clone, Copy, Debug)]
pub struct SortField {
    pub field: &'static Field,
    pub order: SortOrder,
}

/// Pagination window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

/// Compilation artifact: everything the executor needs to run a request.
#[derive(Debug, Default)]
pub struct Query {
    /// Validated filter tree, when the request carried a SQON
    pub filter: Option<FilterNode>,
    /// Every field referenced by a comparison, first appearance order
    pub filtered_fields: Vec<&'static Field>,
    /// Projection, catalog order preserved
    pub selected_fields: Vec<&'static Field>,
    /// Sort list, order preserved
    pub sorted_fields: Vec<SortField>,
    /// Pagination window, carried verbatim
    pub pagination: Option<Pagination>,
}

impl Query {
    /// Whether any filtered or selected field belongs to the given table.
    ///
    /// Drives the variants-join and TOP-N rewrite decisions.
    pub fn references_table(&self, table: &Table) -> bool {
        self.filtered_fields
            .iter()
            .chain(self.selected_fields.iter())
            .any(|f| f.table == table)
    }
}

/// Compile a query from its request parts.
pub fn build_query(
    selected: &[String],
    sqon: Option<&Sqon>,
    sort: &[SortBody],
    pagination: Option<Pagination>,
) -> Result<Query> {
    let selected_fields = catalog::find_selected_fields(selected);

    let (filter, filtered_fields) = match sqon {
        Some(sqon) => {
            let (node, fields) = sqon::parse_sqon(sqon)?;
            (Some(node), fields)
        }
        None => (None, Vec::new()),
    };

    let sorted_fields = catalog::find_sorted_fields(sort);

    Ok(Query {
        filter,
        filtered_fields,
        selected_fields,
        sorted_fields,
        pagination,
    })
}
