use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::{Bson, Document, doc, oid::ObjectId};
use mongodb::{Collection, Database};
use tracing::warn;

use crate::error::StoreError;
use crate::models::{Alert, Field, FiringEvent, StateDelta};
use crate::services::alert_store::AlertStore;

/// Mongo-backed alert store: one document per alert in `alerts`, one per
/// firing in `triggered_alerts`.
#[derive(Clone)]
pub struct MongoAlertStore {
    db: Database,
}

impl MongoAlertStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn alerts(&self) -> Collection<Alert> {
        self.db.collection::<Alert>("alerts")
    }
}

fn delta_to_update(delta: &StateDelta) -> Document {
    let mut set = Document::new();

    if let Some(ts) = delta.last_evaluated_at {
        set.insert("last_evaluated_at", ts);
    }
    match delta.condition_met_since {
        Field::Keep => {}
        Field::Set(ts) => {
            set.insert("condition_met_since", ts);
        }
        Field::Clear => {
            set.insert("condition_met_since", Bson::Null);
        }
    }
    if let Some(ts) = delta.triggered_at {
        set.insert("triggered_at", ts);
    }
    if let Some(active) = delta.is_active {
        set.insert("is_active", active);
    }

    doc! { "$set": set }
}

#[async_trait]
impl AlertStore for MongoAlertStore {
    async fn list_active(&self) -> Result<Vec<Alert>, StoreError> {
        let mut cursor = self.alerts().find(doc! { "is_active": true }, None).await?;

        let mut items: Vec<Alert> = Vec::new();
        while let Some(res) = cursor.next().await {
            match res {
                Ok(alert) => items.push(alert),
                // A malformed document costs that one alert, not the scan.
                Err(e) => warn!(error = %e, "skipping undecodable alert document"),
            }
        }

        Ok(items)
    }

    async fn get(&self, id: ObjectId) -> Result<Option<Alert>, StoreError> {
        Ok(self.alerts().find_one(doc! { "_id": id }, None).await?)
    }

    async fn update(&self, id: ObjectId, delta: &StateDelta) -> Result<bool, StoreError> {
        if delta.is_noop() {
            return Ok(true);
        }

        // Only a still-active record takes engine writes; a zero match
        // means the alert fired or was deleted under us.
        let res = self
            .alerts()
            .update_one(
                doc! { "_id": id, "is_active": true },
                delta_to_update(delta),
                None,
            )
            .await?;

        Ok(res.matched_count > 0)
    }

    async fn reactivate(&self, id: ObjectId) -> Result<bool, StoreError> {
        let res = self
            .alerts()
            .update_one(
                doc! { "_id": id, "is_active": false },
                doc! { "$set": {
                    "is_active": true,
                    "triggered_at": Bson::Null,
                    "condition_met_since": Bson::Null,
                } },
                None,
            )
            .await?;

        Ok(res.matched_count > 0)
    }

    async fn record_firing(&self, event: &FiringEvent) -> Result<(), StoreError> {
        let doc =
            mongodb::bson::to_document(event).map_err(|e| StoreError::Other(e.to_string()))?;

        self.db
            .collection::<Document>("triggered_alerts")
            .insert_one(doc, None)
            .await?;

        Ok(())
    }
}
