//! Table store endpoints.
//!
//! PostgREST-style: filters and ordering travel as query parameters
//! (`?id=eq.3&order=id.asc`) and rows as bare JSON.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{DeleteResult, Golfer, InsertBody, Record, RowQuery};
use crate::AppState;

fn check_table(table: &str) -> Result<(), AppError> {
    if table == Golfer::TABLE {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Table {} not found", table)))
    }
}

fn parse_query(pairs: &[(String, String)]) -> Result<RowQuery, AppError> {
    RowQuery::from_pairs(pairs).map_err(AppError::BadRequest)
}

/// GET /api/rest/:table - Select rows.
pub async fn select_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<Golfer>> {
    check_table(&table)?;
    let query = parse_query(&pairs)?;

    let golfers = state
        .repo
        .select_golfers(&query.filters, query.order.as_ref())
        .await?;
    success(golfers)
}

/// POST /api/rest/:table - Insert one row or a batch of rows.
pub async fn insert_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(body): Json<InsertBody>,
) -> Result<(StatusCode, Json<Vec<Golfer>>), AppError> {
    check_table(&table)?;
    let rows = body.into_rows();

    match state.repo.insert_golfers(&rows).await {
        Ok(inserted) => Ok((StatusCode::CREATED, Json(inserted))),
        Err(e) => {
            tracing::warn!("Insert of {} rows into {} failed: {}", rows.len(), table, e);
            Err(e)
        }
    }
}

/// DELETE /api/rest/:table - Delete rows matching the filters.
pub async fn delete_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<DeleteResult> {
    check_table(&table)?;
    let query = parse_query(&pairs)?;

    let deleted = state.repo.delete_golfers(&query.filters).await?;
    success(DeleteResult { deleted })
}
