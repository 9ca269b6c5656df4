use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the target price satisfies the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    /// Boundary inclusive on both sides: a quote exactly at the target
    /// satisfies the condition.
    pub fn is_met(self, price: Decimal, target: Decimal) -> bool {
        match self {
            Direction::Above => price >= target,
            Direction::Below => price <= target,
        }
    }
}

/// Alert behavior, fixed at creation. The duration window only exists on
/// the duration variant, so a threshold alert cannot carry a stale
/// `duration_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AlertKind {
    Threshold,
    Duration { duration_seconds: i64 },
}

impl AlertKind {
    pub fn label(self) -> &'static str {
        match self {
            AlertKind::Threshold => "threshold",
            AlertKind::Duration { .. } => "duration",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,
    pub symbol: String,

    #[serde(flatten)]
    pub kind: AlertKind,
    pub direction: Direction,
    pub target_price: Decimal,

    pub is_active: bool,
    pub created_at: i64,

    // Evaluation state; written only by the engine (and by reactivation).
    #[serde(default)]
    pub condition_met_since: Option<i64>,
    #[serde(default)]
    pub last_evaluated_at: Option<i64>,
    #[serde(default)]
    pub triggered_at: Option<i64>,
}
