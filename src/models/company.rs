use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Reference data for one tracked symbol. Immutable; seeded once at
/// startup (see `services::db_init`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub symbol: String,
    pub name: String,
}
