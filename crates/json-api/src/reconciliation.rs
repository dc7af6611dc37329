//! Reconciliation summaries and errors shared by the handlers that trigger a reconciliation.

use salvo::{http::StatusError, oapi::ToSchema};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use restock_app::domain::{
    reconciliation::{
        ReconciliationError,
        records::{BatchSummary, ReconciliationSummary},
    },
    stock::records::StockChange,
};

use crate::{backorders, keys::ItemKey, observability, schedules, stock};

pub(crate) fn into_status_error(error: ReconciliationError) -> StatusError {
    match error {
        ReconciliationError::Stock(source) => stock::errors::into_status_error(source),
        ReconciliationError::Backorders(source) => backorders::errors::into_status_error(source),
        ReconciliationError::Schedules(source) => schedules::errors::into_status_error(source),
    }
}

/// Stock Level Change
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StockChangeResponse {
    #[serde(flatten)]
    pub key: ItemKey,

    /// Level before the change
    pub previous: u64,

    /// Level after the change
    pub current: u64,
}

impl From<StockChange> for StockChangeResponse {
    fn from(change: StockChange) -> Self {
        Self {
            key: change.key.into(),
            previous: change.previous,
            current: change.current,
        }
    }
}

/// Reconciliation Summary
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReconciliationResponse {
    #[serde(flatten)]
    pub key: ItemKey,

    /// Backorders moved to processing
    pub backorders_fulfilled: usize,

    /// Waitlist restock notices sent
    pub notifications_sent: usize,

    /// Units left over for regular sale
    pub remaining_quantity: u64,

    /// Backorders moved to processing, in priority order
    pub fulfilled_order_ids: Vec<Uuid>,
}

impl From<ReconciliationSummary> for ReconciliationResponse {
    fn from(summary: ReconciliationSummary) -> Self {
        Self {
            key: summary.key.into(),
            backorders_fulfilled: summary.backorders_fulfilled,
            notifications_sent: summary.notifications_sent,
            remaining_quantity: summary.remaining_quantity,
            fulfilled_order_ids: summary
                .fulfilled_order_ids
                .into_iter()
                .map(|order| order.into_uuid())
                .collect(),
        }
    }
}

/// Record a single-key reconciliation in the metrics and turn it into a response.
pub(crate) fn observed(summary: ReconciliationSummary) -> ReconciliationResponse {
    observability::observe_reconciliation(summary.backorders_fulfilled, summary.notifications_sent);

    summary.into()
}

/// Record a batch reconciliation in the metrics and turn it into a response.
pub(crate) fn observed_batch(batch: BatchSummary) -> Vec<ReconciliationResponse> {
    observability::observe_reconciliation(batch.backorders_fulfilled(), batch.notifications_sent());

    batch.summaries.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use restock::keys::{ProductUuid, StockKey};
    use restock_app::domain::{
        backorders::{BackordersServiceError, records::BackorderUuid},
        stock::StockServiceError,
    };
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn failures_map_through_the_failing_service() {
        let error = into_status_error(ReconciliationError::Backorders(
            BackordersServiceError::NotFound,
        ));

        assert_eq!(error.code, StatusCode::NOT_FOUND);

        let error = into_status_error(ReconciliationError::Stock(StockServiceError::UnknownItem(
            StockKey::product(ProductUuid::new()),
        )));

        assert_eq!(error.code, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn summary_flattens_the_key() -> Result<(), serde_json::Error> {
        let product = ProductUuid::new();
        let order = BackorderUuid::new();

        let response = ReconciliationResponse::from(ReconciliationSummary {
            key: StockKey::product(product),
            backorders_fulfilled: 1,
            notifications_sent: 0,
            remaining_quantity: 2,
            fulfilled_order_ids: vec![order],
        });

        let value = serde_json::to_value(&response)?;

        assert_eq!(value["product"], serde_json::json!(product.into_uuid()));
        assert_eq!(value["variant"], serde_json::Value::Null);
        assert_eq!(value["fulfilled_order_ids"], serde_json::json!([order.into_uuid()]));

        Ok(())
    }
}
