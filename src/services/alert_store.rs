use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::StoreError;
use crate::models::{Alert, FiringEvent, StateDelta};

/// Durable collection of alerts plus the firing history.
///
/// `update` and `reactivate` are single-record compare-and-set operations:
/// `Ok(false)` means the record was not in the expected state (already
/// fired, deleted, or already active) and nothing was written. That
/// zero-match answer is what keeps a firing from ever being delivered
/// twice.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn list_active(&self) -> Result<Vec<Alert>, StoreError>;

    async fn get(&self, id: ObjectId) -> Result<Option<Alert>, StoreError>;

    /// Apply an engine delta to a still-active alert.
    async fn update(&self, id: ObjectId, delta: &StateDelta) -> Result<bool, StoreError>;

    /// Reset a fired alert to an evaluable state: `is_active = true`,
    /// `triggered_at` and `condition_met_since` cleared. Invoked from
    /// outside the engine (the alert-management API).
    async fn reactivate(&self, id: ObjectId) -> Result<bool, StoreError>;

    /// Append one firing-history record.
    async fn record_firing(&self, event: &FiringEvent) -> Result<(), StoreError>;
}
