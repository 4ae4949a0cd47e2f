//! Trend report assembly over a ledger store.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tally_shared::types::UserId;
use tracing::debug;

use super::{TrendError, TrendReport, TrendWindow};
use crate::ledger::LedgerStore;

/// Builds the six-month trend report for one owner.
///
/// The store does the grouping; this only lays the result onto the window.
pub async fn build_trend_report(
    store: &dyn LedgerStore,
    owner_id: UserId,
    now: DateTime<Utc>,
    zone: Tz,
) -> Result<TrendReport, TrendError> {
    let window = TrendWindow::ending_at(now, zone);
    let totals = store
        .group_by_month_and_type(owner_id, window.first(), window.last(), zone)
        .await?;

    debug!(
        owner_id = %owner_id,
        from = %window.first(),
        to = %window.last(),
        rows = totals.len(),
        "Folding monthly totals"
    );

    Ok(TrendReport::from_buckets(window.fold(&totals)))
}
