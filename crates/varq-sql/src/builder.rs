//! Core SQL builder types.

use crate::param::SqlParam;

/// A SQL fragment with its associated parameters.
///
/// This is the core type for building SQL queries safely. It maintains a SQL
/// string with `?` placeholders and a vector of parameter values in
/// placeholder order.
#[derive(Clone, Debug, Default)]
pub struct SqlFragment {
    sql: String,
    params: Vec<SqlParam>,
}

impl SqlFragment {
    /// Create a new empty SQL fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a SQL fragment from raw SQL (no parameters).
    ///
    /// # Warning
    ///
    /// Only use this for known-safe SQL strings (keywords, operators,
    /// catalog-declared identifiers). Never use this with request input.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Get the SQL string.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the parameters.
    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// Get the current parameter count.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Check if the fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Push raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Push a parameter and its placeholder.
    pub fn push_param(&mut self, value: impl Into<SqlParam>) -> &mut Self {
        self.sql.push('?');
        self.params.push(value.into());
        self
    }

    /// Push a comma-separated placeholder list, one per value.
    pub fn push_param_list(&mut self, values: impl IntoIterator<Item = SqlParam>) -> &mut Self {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_param(value);
        }
        self
    }

    /// Append another SQL fragment, keeping its parameters in order.
    pub fn append(&mut self, other: SqlFragment) -> &mut Self {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
        self
    }

    /// Join multiple fragments with a separator, skipping empty ones.
    pub fn join(sep: &str, fragments: impl IntoIterator<Item = SqlFragment>) -> Self {
        let mut result = Self::new();
        let mut first = true;

        for frag in fragments {
            if frag.is_empty() {
                continue;
            }
            if !first {
                result.push(sep);
            }
            result.append(frag);
            first = false;
        }

        result
    }

    /// Wrap in parentheses.
    pub fn parens(mut self) -> Self {
        self.sql = format!("({})", self.sql);
        self
    }

    /// Build the final SQL and parameters.
    pub fn build(self) -> (String, Vec<SqlParam>) {
        (self.sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sql_fragment_raw() {
        let frag = SqlFragment::raw("SELECT 1");
        assert_eq!(frag.sql(), "SELECT 1");
        assert!(frag.params().is_empty());
    }

    #[test]
    fn test_sql_fragment_param() {
        let mut frag = SqlFragment::new();
        frag.push("o.seq_id = ");
        frag.push_param(42i64);

        assert_eq!(frag.sql(), "o.seq_id = ?");
        assert_eq!(frag.params(), &[SqlParam::Int(42)]);
    }

    #[test]
    fn test_sql_fragment_param_list() {
        let mut frag = SqlFragment::new();
        frag.push("filter IN (");
        frag.push_param_list(vec![SqlParam::text("PASS"), SqlParam::text("DRAGEN")]);
        frag.push(")");

        assert_eq!(frag.sql(), "filter IN (?, ?)");
        assert_eq!(frag.param_count(), 2);
    }

    #[test]
    fn test_sql_fragment_append() {
        let mut frag1 = SqlFragment::new();
        frag1.push("o.seq_id = ");
        frag1.push_param(1i64);

        let mut frag2 = SqlFragment::new();
        frag2.push(" AND zygosity = ");
        frag2.push_param("HET");

        frag1.append(frag2);

        assert_eq!(frag1.sql(), "o.seq_id = ? AND zygosity = ?");
        assert_eq!(frag1.params().len(), 2);
    }

    #[test]
    fn test_sql_fragment_join_skips_empty() {
        let frags = vec![
            SqlFragment::raw("a"),
            SqlFragment::new(),
            SqlFragment::raw("b"),
        ];
        let joined = SqlFragment::join(" AND ", frags);
        assert_eq!(joined.sql(), "a AND b");
    }

    #[test]
    fn test_sql_fragment_parens() {
        let frag = SqlFragment::raw("a OR b").parens();
        assert_eq!(frag.sql(), "(a OR b)");
    }

    #[test]
    fn test_placeholder_count_matches_params() {
        let mut frag = SqlFragment::new();
        frag.push("x BETWEEN ");
        frag.push_param(10i64);
        frag.push(" AND ");
        frag.push_param(20i64);

        let placeholders = frag.sql().matches('?').count();
        assert_eq!(placeholders, frag.param_count());
    }
}
