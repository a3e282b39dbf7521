//! REST boundary for the reconciliation engine
//!
//! The route shapes (including the historical `reconsile` spelling and the
//! multipart create form) are a convention inherited from the existing
//! deployment and are preserved for compatibility. Bank account selection
//! arrives as a request parameter; list and create calls without a resolvable
//! `bankId` are rejected before they reach the engine.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::reconciliation::ReconciliationEngine;
use crate::traits::{LedgerQuery, ReconciliationStore};
use crate::types::*;
use crate::utils::validation;

/// Shared state handed to every handler
pub struct ApiState<L, S> {
    pub engine: Arc<ReconciliationEngine<L, S>>,
}

impl<L, S> ApiState<L, S> {
    pub fn new(engine: ReconciliationEngine<L, S>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

impl<L, S> Clone for ApiState<L, S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

/// Build the reconciliation router
pub fn router<L, S>(state: ApiState<L, S>) -> Router
where
    L: LedgerQuery + 'static,
    S: ReconciliationStore + 'static,
{
    Router::new()
        .route("/rest/transaction/getById", get(get_transaction::<L, S>))
        .route("/rest/reconsile/list", get(list_checkpoints::<L, S>))
        .route("/rest/reconsile/reconcilenow", post(reconcile_now::<L, S>))
        .route("/rest/reconsile/deletes", delete(delete_checkpoints::<L, S>))
        .with_state(state)
}

/// Error wrapper translating engine errors into HTTP responses
pub struct ApiError(ReconcileError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn status_for_error(err: &ReconcileError) -> StatusCode {
    match err {
        ReconcileError::Validation(_) => StatusCode::BAD_REQUEST,
        ReconcileError::AccountNotFound(_)
        | ReconcileError::TransactionNotFound(_)
        | ReconcileError::CheckpointNotFound(_) => StatusCode::NOT_FOUND,
        ReconcileError::BalanceMismatch { .. }
        | ReconcileError::OutOfOrderCheckpoint { .. }
        | ReconcileError::NotNewestCheckpoint(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ReconcileError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_error(err: ReconcileError) -> String {
    match err {
        ReconcileError::Storage(store_err) => {
            tracing::error!("storage error: {store_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = status_for_error(&self.0);
        let error = message_for_error(self.0);
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<ReconcileError> for ApiError {
    fn from(value: ReconcileError) -> Self {
        Self(value)
    }
}

#[derive(Deserialize)]
struct GetByIdParams {
    id: String,
}

async fn get_transaction<L, S>(
    State(state): State<ApiState<L, S>>,
    Query(params): Query<GetByIdParams>,
) -> Result<Json<LedgerTransaction>, ApiError>
where
    L: LedgerQuery + 'static,
    S: ReconciliationStore + 'static,
{
    let transaction = state
        .engine
        .transaction(&params.id)
        .await?
        .ok_or(ReconcileError::TransactionNotFound(params.id))?;
    Ok(Json(transaction))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    bank_id: Option<String>,
    page_no: Option<u32>,
    page_size: Option<u32>,
    order: Option<String>,
    sorting_col: Option<String>,
    pagination_disable: Option<bool>,
}

/// Checkpoint listing response: `{data, count}` per the inherited contract
#[derive(Serialize, Deserialize)]
pub struct ListResponse {
    pub data: Vec<ReconciliationCheckpoint>,
    pub count: u64,
}

fn parse_sort_order(raw: &str) -> ReconcileResult<SortOrder> {
    match raw.to_ascii_uppercase().as_str() {
        "ASC" => Ok(SortOrder::Asc),
        "DESC" => Ok(SortOrder::Desc),
        other => Err(ReconcileError::Validation(format!(
            "'{}' is not a valid sort order",
            other
        ))),
    }
}

fn parse_sort_column(raw: &str) -> ReconcileResult<CheckpointSortColumn> {
    match raw {
        "date" => Ok(CheckpointSortColumn::Date),
        "createdAt" => Ok(CheckpointSortColumn::CreatedAt),
        "closingBalance" => Ok(CheckpointSortColumn::ClosingBalance),
        other => Err(ReconcileError::Validation(format!(
            "'{}' is not a sortable column",
            other
        ))),
    }
}

async fn list_checkpoints<L, S>(
    State(state): State<ApiState<L, S>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError>
where
    L: LedgerQuery + 'static,
    S: ReconciliationStore + 'static,
{
    let bank_id = params
        .bank_id
        .ok_or_else(|| ReconcileError::Validation("bankId is required".to_string()))?;
    validation::validate_bank_account_id(&bank_id)?;

    let defaults = CheckpointQuery::default();
    let query = CheckpointQuery {
        page_no: params.page_no.unwrap_or(defaults.page_no),
        page_size: params.page_size.unwrap_or(defaults.page_size),
        sort_column: match params.sorting_col {
            Some(raw) => parse_sort_column(&raw)?,
            None => defaults.sort_column,
        },
        sort_order: match params.order {
            Some(raw) => parse_sort_order(&raw)?,
            None => defaults.sort_order,
        },
        paginate: !params.pagination_disable.unwrap_or(false),
    };

    let page = state.engine.checkpoints(&bank_id, &query).await?;
    Ok(Json(ListResponse {
        data: page.items,
        count: page.total_count,
    }))
}

/// Create-checkpoint response: status 1 means created, status 2 means the
/// request was well formed but rejected by a business rule; `message` is the
/// user-facing toast text
#[derive(Serialize, Deserialize)]
pub struct ReconcileNowResponse {
    pub status: u8,
    pub message: String,
}

async fn reconcile_now<L, S>(
    State(state): State<ApiState<L, S>>,
    mut form: Multipart,
) -> Result<Json<ReconcileNowResponse>, ApiError>
where
    L: LedgerQuery + 'static,
    S: ReconciliationStore + 'static,
{
    let mut bank_id = None;
    let mut date_raw = None;
    let mut balance_raw = None;

    while let Some(field) = form.next_field().await.map_err(|err| {
        ReconcileError::Validation(format!("malformed multipart request: {err}"))
    })? {
        let name = field.name().map(str::to_string);
        let value = field.text().await.map_err(|err| {
            ReconcileError::Validation(format!("malformed multipart field: {err}"))
        })?;
        match name.as_deref() {
            Some("bankId") => bank_id = Some(value),
            Some("date") => date_raw = Some(value),
            Some("closingBalance") => balance_raw = Some(value),
            _ => {}
        }
    }

    let bank_id = bank_id
        .ok_or_else(|| ReconcileError::Validation("bankId is required".to_string()))?;
    let date_raw =
        date_raw.ok_or_else(|| ReconcileError::Validation("date is required".to_string()))?;
    let balance_raw = balance_raw.ok_or_else(|| {
        ReconcileError::Validation("closingBalance is required".to_string())
    })?;

    let date = validation::parse_statement_date(&date_raw)?;
    let declared = validation::parse_closing_balance(&balance_raw)?;

    match state.engine.reconcile(&bank_id, date, declared).await {
        Ok(checkpoint) => Ok(Json(ReconcileNowResponse {
            status: 1,
            message: format!("Account reconciled through {}", checkpoint.date),
        })),
        Err(err) if err.is_rejection() => Ok(Json(ReconcileNowResponse {
            status: 2,
            message: err.to_string(),
        })),
        Err(err) => Err(err.into()),
    }
}

#[derive(Serialize, Deserialize)]
pub struct DeleteCheckpointsRequest {
    pub ids: Vec<String>,
}

/// One failed removal inside a bulk delete
#[derive(Serialize, Deserialize)]
pub struct FailedRemoval {
    pub id: String,
    pub message: String,
}

/// Bulk delete report: the ids removed before the operation stopped, plus the
/// failure that stopped it, if any
#[derive(Serialize, Deserialize)]
pub struct DeleteCheckpointsResponse {
    pub removed: Vec<String>,
    pub failed: Option<FailedRemoval>,
}

async fn delete_checkpoints<L, S>(
    State(state): State<ApiState<L, S>>,
    Json(request): Json<DeleteCheckpointsRequest>,
) -> Result<Json<DeleteCheckpointsResponse>, ApiError>
where
    L: LedgerQuery + 'static,
    S: ReconciliationStore + 'static,
{
    let outcome = state.engine.unreconcile_many(&request.ids).await?;
    Ok(Json(DeleteCheckpointsResponse {
        removed: outcome.removed,
        failed: outcome.failed.map(|failure| FailedRemoval {
            id: failure.checkpoint_id,
            message: failure.error.to_string(),
        }),
    }))
}
