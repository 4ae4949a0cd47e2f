//! Transaction routes: CRUD, date-range report and balance summary.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_core::access::authorize_record;
use tally_core::aggregation::{ReportSummary, compute_report, compute_totals};
use tally_core::ledger::{
    ReportRange, Transaction, TransactionDraft, TransactionKind, TransactionPatch,
};
use tally_shared::AppError;
use tally_shared::types::{TransactionId, UserId};
use tracing::{debug, info, warn};

use super::{DataResponse, Empty, money};
use crate::AppState;
use crate::error::{ApiJson, ApiQuery, ApiResult};
use crate::middleware::AuthUser;

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/report", get(report))
        .route("/transactions/summary", get(summary))
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// A transaction as rendered to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: TransactionId,
    /// Label.
    pub text: String,
    /// Positive amount.
    pub amount: f64,
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Category, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Owning user.
    pub owner_id: UserId,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            text: tx.text,
            amount: money(tx.amount),
            kind: tx.kind,
            category: tx.category,
            owner_id: tx.owner_id,
            created_at: tx.created_at,
        }
    }
}

/// Response of the list endpoint.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// Number of records.
    pub count: usize,
    /// Records, newest first.
    pub data: Vec<TransactionResponse>,
}

/// Query of the report endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// First day, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Last day, inclusive.
    pub end_date: Option<NaiveDate>,
}

/// Report summary block.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBlock {
    /// Sum of income.
    pub total_income: f64,
    /// Sum of expense.
    pub total_expense: f64,
    /// Income minus expense.
    pub net: f64,
}

impl From<ReportSummary> for SummaryBlock {
    fn from(summary: ReportSummary) -> Self {
        let summary = summary.rounded();
        Self {
            total_income: money(summary.total_income),
            total_expense: money(summary.total_expense),
            net: money(summary.net),
        }
    }
}

/// Response of the report endpoint.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    /// Always `true`.
    pub success: bool,
    /// Records in range, newest first.
    pub data: Vec<TransactionResponse>,
    /// Totals over `data`.
    pub summary: SummaryBlock,
}

/// Balance summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// Income minus expense.
    pub balance: f64,
    /// Sum of income.
    pub total_income: f64,
    /// Sum of expense.
    pub total_expense: f64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Unparseable IDs cannot name a stored record.
fn parse_id(raw: &str) -> Result<TransactionId, AppError> {
    raw.parse::<TransactionId>().map_err(|_| {
        debug!(id = raw, "Malformed transaction id");
        AppError::NotFound("Transaction not found".to_string())
    })
}

/// Loads a record and checks the caller may touch it.
async fn load_authorized(
    state: &AppState,
    user: &AuthUser,
    raw_id: &str,
) -> ApiResult<Transaction> {
    let id = parse_id(raw_id)?;
    let tx = state.ledger.find_by_id(id).await?;

    authorize_record(user.actor(), tx.owner_id).inspect_err(|_| {
        warn!(
            user_id = %user.id(),
            transaction_id = %id,
            "Access to another user's transaction denied"
        );
    })?;

    Ok(tx)
}

/// GET /transactions - All of the caller's transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ListResponse>> {
    let report = compute_report(state.ledger.list_by_owner(user.id()).await?);
    let data: Vec<TransactionResponse> = report
        .transactions
        .into_iter()
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(ListResponse {
        count: data.len(),
        data,
    }))
}

/// POST /transactions - Record a transaction for the caller.
async fn create_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(draft): ApiJson<TransactionDraft>,
) -> ApiResult<(StatusCode, Json<DataResponse<TransactionResponse>>)> {
    let record = draft.validate()?;
    let tx = state.ledger.insert(user.id(), record).await?;

    info!(
        user_id = %user.id(),
        transaction_id = %tx.id,
        kind = %tx.kind,
        "Transaction created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(tx.into()))))
}

/// GET /transactions/{id}
async fn get_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<TransactionResponse>>> {
    let tx = load_authorized(&state, &user, &id).await?;
    Ok(Json(DataResponse::new(tx.into())))
}

/// PUT /transactions/{id} - Change text, amount, type or category.
async fn update_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<TransactionPatch>,
) -> ApiResult<Json<DataResponse<TransactionResponse>>> {
    let tx = load_authorized(&state, &user, &id).await?;
    patch.validate()?;

    let updated = state.ledger.update(tx.id, &patch).await?;
    info!(user_id = %user.id(), transaction_id = %updated.id, "Transaction updated");

    Ok(Json(DataResponse::new(updated.into())))
}

/// DELETE /transactions/{id}
async fn delete_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Empty>>> {
    let tx = load_authorized(&state, &user, &id).await?;
    state.ledger.delete(tx.id).await?;

    info!(user_id = %user.id(), transaction_id = %tx.id, "Transaction deleted");
    Ok(Json(DataResponse::new(Empty {})))
}

/// GET /transactions/report?startDate=YYYY-MM-DD&endDate=YYYY-MM-DD
///
/// Both days are inclusive and resolved in the reporting zone.
async fn report(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> ApiResult<Json<ReportResponse>> {
    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return Err(AppError::Validation("Please provide startDate and endDate".to_string()).into());
    };

    let range = ReportRange::from_dates(start, end, state.reporting_zone)?;
    let report = compute_report(
        state
            .ledger
            .list_by_owner_in_range(user.id(), &range)
            .await?,
    );

    Ok(Json(ReportResponse {
        success: true,
        data: report
            .transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
        summary: report.summary.into(),
    }))
}

/// GET /transactions/summary - Balance over all of the caller's records.
async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<DataResponse<BalanceResponse>>> {
    let records = state.ledger.list_by_owner(user.id()).await?;
    let totals = compute_totals(&records).rounded();

    Ok(Json(DataResponse::new(BalanceResponse {
        balance: money(totals.balance),
        total_income: money(totals.total_income),
        total_expense: money(totals.total_expense),
    })))
}
