//! Premium analytics.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;
use tally_core::access::Feature;
use tally_core::trends::{TrendReport, build_trend_report};
use tracing::warn;

use super::money;
use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthUser;

/// Creates the premium routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/premium/content", get(premium_content))
}

/// Chart-ready trend payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumContentResponse {
    /// Heading.
    pub title: String,
    /// Sentence with the expense forecast.
    pub description: String,
    /// Month abbreviations, oldest first.
    pub chart_labels: Vec<&'static str>,
    /// Income per month.
    pub chart_data_income: Vec<f64>,
    /// Expense per month.
    pub chart_data_expense: Vec<f64>,
}

impl From<TrendReport> for PremiumContentResponse {
    fn from(report: TrendReport) -> Self {
        Self {
            chart_labels: report.chart_labels(),
            chart_data_income: report.chart_income().into_iter().map(money).collect(),
            chart_data_expense: report.chart_expense().into_iter().map(money).collect(),
            title: report.title,
            description: report.description,
        }
    }
}

/// GET /premium/content - Six-month trend with an expense forecast.
async fn premium_content(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<PremiumContentResponse>> {
    state
        .access_policy
        .authorize(user.actor(), Feature::PremiumContent)
        .inspect_err(|e| warn!(user_id = %user.id(), error = %e, "Premium content denied"))?;

    let report =
        build_trend_report(state.ledger.as_ref(), user.id(), Utc::now(), state.reporting_zone)
            .await?;

    Ok(Json(report.into()))
}
