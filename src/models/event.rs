use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Alert, Direction};

/// Signal produced when an alert's condition is satisfied. Handed to the
/// notifier and appended to the firing history, both only after the
/// alert's state transition has been persisted.
#[derive(Debug, Clone, Serialize)]
pub struct FiringEvent {
    pub alert_id: ObjectId,
    pub user_id: ObjectId,
    pub symbol: String,
    pub kind: &'static str,
    pub direction: Direction,
    pub target_price: Decimal,
    pub observed_price: Decimal,
    pub fired_at: i64,
    /// How long the condition held, for duration alerts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sustained_secs: Option<i64>,
}

impl FiringEvent {
    pub fn new(
        alert: &Alert,
        observed_price: Decimal,
        fired_at: i64,
        sustained_secs: Option<i64>,
    ) -> Self {
        Self {
            alert_id: alert.id,
            user_id: alert.user_id,
            symbol: alert.symbol.clone(),
            kind: alert.kind.label(),
            direction: alert.direction,
            target_price: alert.target_price,
            observed_price,
            fired_at,
            sustained_secs,
        }
    }
}

/// One engine-owned field update. `Keep` leaves the stored value alone;
/// `Clear` nulls it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<T> {
    Keep,
    Set(T),
    Clear,
}

/// The fields the engine may mutate on an alert, expressed as a patch so
/// persistence is one atomic single-record update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDelta {
    pub last_evaluated_at: Option<i64>,
    pub condition_met_since: Field<i64>,
    pub triggered_at: Option<i64>,
    pub is_active: Option<bool>,
}

impl StateDelta {
    /// Record the evaluation attempt and nothing else.
    pub fn touch(now: i64) -> Self {
        Self {
            last_evaluated_at: Some(now),
            condition_met_since: Field::Keep,
            triggered_at: None,
            is_active: None,
        }
    }

    /// A patch that changes nothing. Evaluating an already-fired alert
    /// produces this.
    pub fn noop() -> Self {
        Self {
            last_evaluated_at: None,
            condition_met_since: Field::Keep,
            triggered_at: None,
            is_active: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.last_evaluated_at.is_none()
            && self.condition_met_since == Field::Keep
            && self.triggered_at.is_none()
            && self.is_active.is_none()
    }

    /// Apply the patch to an in-memory record. Store implementations that
    /// are not document-based go through this.
    pub fn apply(&self, alert: &mut Alert) {
        if let Some(ts) = self.last_evaluated_at {
            alert.last_evaluated_at = Some(ts);
        }
        match self.condition_met_since {
            Field::Keep => {}
            Field::Set(ts) => alert.condition_met_since = Some(ts),
            Field::Clear => alert.condition_met_since = None,
        }
        if let Some(ts) = self.triggered_at {
            alert.triggered_at = Some(ts);
        }
        if let Some(active) = self.is_active {
            alert.is_active = active;
        }
    }
}
