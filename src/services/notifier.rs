use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::info;

use crate::error::NotifyError;
use crate::models::FiringEvent;

/// Delivery seam for firing events. Fire-and-forget from the engine's
/// side: a failure is logged and the alert stays fired; any retry policy
/// belongs to the implementation behind this trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &FiringEvent) -> Result<(), NotifyError>;
}

/// Publishes firings to an in-process broadcast channel, one JSON payload
/// per event. Downstream consumers (SSE/WS bridges, delivery workers)
/// attach with `subscribe()`.
#[derive(Clone)]
pub struct BroadcastNotifier {
    events_tx: broadcast::Sender<String>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (events_tx, _rx) = broadcast::channel(capacity);
        Self { events_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.events_tx.subscribe()
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn notify(&self, event: &FiringEvent) -> Result<(), NotifyError> {
        let payload =
            serde_json::to_string(event).map_err(|e| NotifyError::Delivery(e.to_string()))?;

        info!(
            alert_id = %event.alert_id,
            symbol = %event.symbol,
            price = %event.observed_price,
            "delivering alert notification"
        );

        // No subscribers is not a delivery failure.
        let _ = self.events_tx.send(payload);

        Ok(())
    }
}
