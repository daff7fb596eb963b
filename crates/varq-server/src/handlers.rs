//! Request handling.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, error};

use varq_core::{build_query, Error, Pagination, Result, SortBody, Sqon};

use crate::repository::MIN_LIMIT;
use crate::state::AppState;

/// Body of a list request.
#[derive(Debug, Default, Deserialize)]
pub struct ListBody {
    #[serde(default)]
    pub selected_fields: Vec<String>,
    #[serde(default)]
    pub sqon: Option<Sqon>,
    #[serde(default)]
    pub sort: Vec<SortBody>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Body of a count request.
#[derive(Debug, Default, Deserialize)]
pub struct CountBody {
    #[serde(default)]
    pub sqon: Option<Sqon>,
}

/// Body of an aggregate request.
#[derive(Debug, Deserialize)]
pub struct AggregationBody {
    pub field: String,
    #[serde(default)]
    pub sqon: Option<Sqon>,
    #[serde(default)]
    pub size: Option<i64>,
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/occurrences/{seq_id}/list", post(list_handler))
        .route("/occurrences/{seq_id}/count", post(count_handler))
        .route("/occurrences/{seq_id}/aggregate", post(aggregate_handler))
        .with_state(state)
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Response {
    let status = state.repository.check_connection().await;
    Json(serde_json::json!({ "status": status })).into_response()
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Path(seq_id): Path<String>,
    body: Bytes,
) -> Response {
    match list(&state, &seq_id, &body).await {
        Ok(occurrences) => Json(occurrences).into_response(),
        Err(e) => error_response(e),
    }
}

async fn list(state: &AppState, seq_id: &str, body: &[u8]) -> Result<Vec<varq_core::Occurrence>> {
    let seq_id = parse_seq_id(seq_id)?;
    let body: ListBody = parse_body(body)?;

    let pagination = Pagination {
        limit: body.limit.unwrap_or(MIN_LIMIT),
        offset: body.offset.unwrap_or(0),
    };
    let query = build_query(
        &body.selected_fields,
        body.sqon.as_ref(),
        &body.sort,
        Some(pagination),
    )?;

    state.repository.get_occurrences(seq_id, &query).await
}

async fn count_handler(
    State(state): State<Arc<AppState>>,
    Path(seq_id): Path<String>,
    body: Bytes,
) -> Response {
    match count(&state, &seq_id, &body).await {
        Ok(count) => Json(serde_json::json!({ "count": count })).into_response(),
        Err(e) => error_response(e),
    }
}

async fn count(state: &AppState, seq_id: &str, body: &[u8]) -> Result<i64> {
    let seq_id = parse_seq_id(seq_id)?;
    let body: CountBody = parse_body(body)?;

    let query = build_query(&[], body.sqon.as_ref(), &[], None)?;
    state.repository.count_occurrences(seq_id, &query).await
}

async fn aggregate_handler(
    State(state): State<Arc<AppState>>,
    Path(seq_id): Path<String>,
    body: Bytes,
) -> Response {
    match aggregate(&state, &seq_id, &body).await {
        Ok(buckets) => Json(buckets).into_response(),
        Err(e) => error_response(e),
    }
}

async fn aggregate(
    state: &AppState,
    seq_id: &str,
    body: &[u8],
) -> Result<Vec<varq_core::Aggregation>> {
    let seq_id = parse_seq_id(seq_id)?;
    let body: AggregationBody = parse_body(body)?;

    let selected = vec![body.field.clone()];
    let query = build_query(&selected, body.sqon.as_ref(), &[], None)?;
    if query.selected_fields.len() != 1 {
        return Err(Error::InvalidBody(format!(
            "unknown or non-selectable aggregation field: {}",
            body.field
        )));
    }

    let size = body.size.unwrap_or(0);
    state
        .repository
        .aggregate_occurrences(seq_id, &query, size)
        .await
}

fn parse_seq_id(raw: &str) -> Result<i32> {
    raw.parse()
        .map_err(|_| Error::InvalidSeqId(raw.to_string()))
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::InvalidBody(e.to_string()))
}

/// Build an error response from our error type.
fn error_response(error: Error) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        error!("request failed: {}", error);
    } else {
        debug!("request rejected: {}", error);
    }

    let body = serde_json::to_vec(&error.to_json()).unwrap_or_default();
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
