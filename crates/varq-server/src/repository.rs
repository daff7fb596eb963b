//! Repository / executor over the occurrences schema.
//!
//! Builds the SQL for the list, count, and aggregate operations as pure
//! functions, then executes them against the pool. Every request resolves
//! the physical partition for its `seq_id` first; list queries touching the
//! variants table run through the TOP-N rewrite so pagination happens on
//! `locus_id` keys before the join widens to the full projection.

use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlRow};
use sqlx::Row;
use tracing::{debug, error};

use varq_core::catalog::VARIANTS_TABLE;
use varq_core::{Aggregation, Error, Occurrence, Query, Result, SortField};
use varq_sql::{SelectBuilder, SqlFragment, SqlParam};

/// Default page size when the request does not paginate.
pub const MIN_LIMIT: i64 = 10;
/// Upper bound on any page size.
pub const MAX_LIMIT: i64 = 200;

type Statement<'q> = sqlx::query::Query<'q, MySql, MySqlArguments>;

/// Read-only repository over the occurrences schema.
pub struct Repository {
    pool: MySqlPool,
}

impl Repository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Ping the underlying connection.
    pub async fn check_connection(&self) -> &'static str {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => "up",
            Err(e) => {
                error!("database ping failed: {}", e);
                "down"
            }
        }
    }

    /// Resolve the physical partition for a sequencing experiment.
    // TODO: memoise partition lookups per seq_id
    pub async fn get_part(&self, seq_id: i32) -> Result<i32> {
        let row = sqlx::query("SELECT part FROM sequencing_experiment WHERE seq_id = ?")
            .bind(seq_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => row.try_get("part").map_err(map_sqlx_error),
            None => Err(Error::PartitionNotFound(seq_id)),
        }
    }

    /// Run the list operation and shape rows into occurrences.
    pub async fn get_occurrences(&self, seq_id: i32, query: &Query) -> Result<Vec<Occurrence>> {
        let part = self.get_part(seq_id).await?;
        let (sql, params) = list_sql(seq_id, part, query).build();
        debug!(sql = %sql, "executing list query");

        let rows = bind_params(sqlx::query(&sql), &params)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.iter().map(occurrence_from_row).collect())
    }

    /// Run the count operation. Zero is a valid result.
    pub async fn count_occurrences(&self, seq_id: i32, query: &Query) -> Result<i64> {
        let part = self.get_part(seq_id).await?;
        let (sql, params) = count_sql(seq_id, part, query).build();
        debug!(sql = %sql, "executing count query");

        let row = bind_params(sqlx::query(&sql), &params)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.try_get(0).map_err(map_sqlx_error)
    }

    /// Run the aggregate operation; `size > 0` bounds the bucket count.
    pub async fn aggregate_occurrences(
        &self,
        seq_id: i32,
        query: &Query,
        size: i64,
    ) -> Result<Vec<Aggregation>> {
        let part = self.get_part(seq_id).await?;
        let (sql, params) = aggregate_sql(seq_id, part, query, size).build();
        debug!(sql = %sql, "executing aggregate query");

        let rows = bind_params(sqlx::query(&sql), &params)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.iter().map(aggregation_from_row).collect())
    }
}

/// Build the list statement: a flat SELECT when only occurrence columns
/// participate, otherwise the TOP-N rewrite over `locus_id` keys.
pub fn list_sql(seq_id: i32, part: i32, query: &Query) -> SqlFragment {
    let (limit, offset) = effective_pagination(query);

    if !query.references_table(&VARIANTS_TABLE) {
        let mut builder = SelectBuilder::new()
            .columns(projection(query))
            .from_table("occurrences o")
            .where_frag(base_predicate(seq_id, part));
        if let Some(filter) = &query.filter {
            builder = builder.where_frag(filter.to_sql());
        }
        for expr in sort_exprs(&query.sorted_fields, true) {
            builder = builder.order_by(expr);
        }
        builder = builder.limit(limit);
        if offset > 0 {
            builder = builder.offset(offset);
        }
        return builder.build();
    }

    // Inner query pages over the identifying keys only.
    let mut inner = SelectBuilder::new()
        .column("o.locus_id")
        .from_table("occurrences o")
        .join("variants v", "v.locus_id = o.locus_id")
        .where_frag(base_predicate(seq_id, part));
    if let Some(filter) = &query.filter {
        inner = inner.where_frag(filter.to_sql());
    }
    for expr in sort_exprs(&query.sorted_fields, true) {
        inner = inner.order_by(expr);
    }
    inner = inner.limit(limit);
    if offset > 0 {
        inner = inner.offset(offset);
    }

    // Outer query widens to the full projection; IN does not preserve order,
    // so the sort is reapplied on the projected labels.
    let mut join_cond = SqlFragment::new();
    join_cond.push("o.seq_id = ");
    join_cond.push_param(seq_id as i64);
    join_cond.push(" AND part = ");
    join_cond.push_param(part as i64);
    join_cond.push(" AND v.locus_id = o.locus_id");

    let mut outer = SelectBuilder::new()
        .columns(projection(query))
        .from_table("occurrences o, variants v")
        .where_frag(join_cond)
        .where_in_subquery("o.locus_id", inner.build());
    for expr in sort_exprs(&query.sorted_fields, false) {
        outer = outer.order_by(expr);
    }
    outer.build()
}

/// Build the count statement.
pub fn count_sql(seq_id: i32, part: i32, query: &Query) -> SqlFragment {
    let mut builder = SelectBuilder::new()
        .column("COUNT(1)")
        .from_table("occurrences o")
        .where_frag(base_predicate(seq_id, part));
    if query.references_table(&VARIANTS_TABLE) {
        builder = builder.join("variants v", "v.locus_id = o.locus_id");
    }
    if let Some(filter) = &query.filter {
        builder = builder.where_frag(filter.to_sql());
    }
    builder.build()
}

/// Build the aggregate statement over the single selected group key.
pub fn aggregate_sql(seq_id: i32, part: i32, query: &Query, size: i64) -> SqlFragment {
    let group = query.selected_fields[0];
    let mut builder = SelectBuilder::new()
        .column(format!("{} AS bucket", group.qualified_name()))
        .column("COUNT(1) AS count")
        .from_table("occurrences o")
        .where_frag(base_predicate(seq_id, part));
    if query.references_table(&VARIANTS_TABLE) {
        builder = builder.join("variants v", "v.locus_id = o.locus_id");
    }
    if let Some(filter) = &query.filter {
        builder = builder.where_frag(filter.to_sql());
    }
    builder = builder.group_by(group.qualified_name());
    if size > 0 {
        builder = builder.limit(size);
    }
    builder.build()
}

/// Predicate present on every statement: partition pruning plus the
/// has-alternate-allele gate.
fn base_predicate(seq_id: i32, part: i32) -> SqlFragment {
    let mut frag = SqlFragment::new();
    frag.push("o.seq_id = ");
    frag.push_param(seq_id as i64);
    frag.push(" AND part = ");
    frag.push_param(part as i64);
    frag.push(" AND has_alt");
    frag
}

/// Projected columns as `alias.name AS label`; the domain key alone when the
/// selection is empty.
fn projection(query: &Query) -> Vec<String> {
    if query.selected_fields.is_empty() {
        return vec!["o.locus_id AS locus_id".to_string()];
    }
    query
        .selected_fields
        .iter()
        .map(|f| format!("{} AS {}", f.qualified_name(), f.label()))
        .collect()
}

/// Render sort entries; inner queries sort on the qualified physical column,
/// outer queries on the projected label.
fn sort_exprs(sorted: &[SortField], qualified: bool) -> Vec<String> {
    sorted
        .iter()
        .map(|s| {
            let column = if qualified {
                s.field.qualified_name()
            } else {
                s.field.label().to_string()
            };
            format!("{} {}", column, s.order.as_str())
        })
        .collect()
}

/// Effective pagination: limit clamped into [0, MAX_LIMIT] with MIN_LIMIT
/// when unset; negative offsets collapse to 0.
fn effective_pagination(query: &Query) -> (i64, i64) {
    match query.pagination {
        Some(p) => (p.limit.clamp(0, MAX_LIMIT), p.offset.max(0)),
        None => (MIN_LIMIT, 0),
    }
}

fn bind_params<'q>(statement: Statement<'q>, params: &'q [SqlParam]) -> Statement<'q> {
    let mut statement = statement;
    for param in params {
        statement = match param {
            SqlParam::Null => statement.bind(Option::<String>::None),
            SqlParam::Bool(b) => statement.bind(*b),
            SqlParam::Int(n) => statement.bind(*n),
            SqlParam::Float(f) => statement.bind(*f),
            SqlParam::Text(s) => statement.bind(s.as_str()),
        };
    }
    statement
}

/// Shape a row into an occurrence by output label; columns missing from the
/// projection stay absent.
fn occurrence_from_row(row: &MySqlRow) -> Occurrence {
    Occurrence {
        seq_id: row.try_get("seq_id").ok(),
        locus_id: row.try_get("locus_id").ok(),
        quality: row.try_get("quality").ok(),
        filter: row.try_get("filter").ok(),
        zygosity: row.try_get("zygosity").ok(),
        pf: row.try_get("pf").ok(),
        af: row.try_get("af").ok(),
        gnomad_v3_af: row.try_get("gnomad_v3_af").ok(),
        hgvsg: row.try_get("hgvsg").ok(),
        omim_inheritance_code: row.try_get("omim_inheritance_code").ok(),
        ad_ratio: row.try_get("ad_ratio").ok(),
        variant_class: row.try_get("variant_class").ok(),
        vep_impact: row.try_get("vep_impact").ok(),
        symbol: row.try_get("symbol").ok(),
        clinvar_interpretation: row.try_get("clinvar_interpretation").ok(),
        mane_select: row.try_get("mane_select").ok(),
        canonical: row.try_get("canonical").ok(),
    }
}

fn aggregation_from_row(row: &MySqlRow) -> Aggregation {
    let key = row
        .try_get::<String, _>("bucket")
        .ok()
        .or_else(|| row.try_get::<i64, _>("bucket").ok().map(|v| v.to_string()))
        .or_else(|| row.try_get::<f64, _>("bucket").ok().map(|v| v.to_string()))
        .or_else(|| row.try_get::<bool, _>("bucket").ok().map(|v| v.to_string()))
        .unwrap_or_default();
    let count = row.try_get("count").unwrap_or_default();
    Aggregation { key, count }
}

fn map_sqlx_error(e: sqlx::Error) -> Error {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Error::ConnectionPool(e.to_string()),
        other => Error::Database(other.to_string()),
    }
}
