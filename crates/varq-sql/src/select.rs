//! SELECT statement builder.

use crate::builder::SqlFragment;

/// Builder for SELECT statements.
///
/// Identifiers (columns, tables, join conditions) are raw strings that must
/// come from the catalog; filter conditions carry their parameters as
/// [`SqlFragment`]s.
#[derive(Clone, Debug, Default)]
pub struct SelectBuilder {
    columns: Vec<String>,
    from: Option<String>,
    joins: Vec<String>,
    where_clauses: Vec<SqlFragment>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectBuilder {
    /// Create a new SELECT builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column expression to the projection.
    pub fn column(mut self, expr: impl Into<String>) -> Self {
        self.columns.push(expr.into());
        self
    }

    /// Add several column expressions at once.
    pub fn columns(mut self, exprs: impl IntoIterator<Item = String>) -> Self {
        self.columns.extend(exprs);
        self
    }

    /// Set the FROM clause (table with alias, or a table list).
    pub fn from_table(mut self, table: impl Into<String>) -> Self {
        self.from = Some(table.into());
        self
    }

    /// Add an inner JOIN.
    pub fn join(mut self, table: &str, condition: &str) -> Self {
        self.joins.push(format!(" JOIN {} ON {}", table, condition));
        self
    }

    /// Add a WHERE clause; clauses are AND-joined.
    pub fn where_frag(mut self, frag: SqlFragment) -> Self {
        if !frag.is_empty() {
            self.where_clauses.push(frag);
        }
        self
    }

    /// Add a `column IN (<subquery>)` WHERE clause.
    pub fn where_in_subquery(mut self, column: &str, subquery: SqlFragment) -> Self {
        let mut frag = SqlFragment::raw(format!("{} IN (", column));
        frag.append(subquery);
        frag.push(")");
        self.where_clauses.push(frag);
        self
    }

    /// Add a GROUP BY column.
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// Add an ORDER BY expression (column + direction, pre-rendered).
    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by.push(expr.into());
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Build the SELECT statement.
    pub fn build(self) -> SqlFragment {
        let mut result = SqlFragment::new();

        result.push("SELECT ");
        if self.columns.is_empty() {
            result.push("*");
        } else {
            result.push(&self.columns.join(", "));
        }

        if let Some(from) = self.from {
            result.push(" FROM ");
            result.push(&from);
        }

        for join in self.joins {
            result.push(&join);
        }

        if !self.where_clauses.is_empty() {
            result.push(" WHERE ");
            let combined = SqlFragment::join(" AND ", self.where_clauses);
            result.append(combined);
        }

        if !self.group_by.is_empty() {
            result.push(" GROUP BY ");
            result.push(&self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            result.push(" ORDER BY ");
            result.push(&self.order_by.join(", "));
        }

        if let Some(limit) = self.limit {
            result.push(" LIMIT ");
            result.push(&limit.to_string());
        }

        if let Some(offset) = self.offset {
            result.push(" OFFSET ");
            result.push(&offset.to_string());
        }

        result
    }
}
