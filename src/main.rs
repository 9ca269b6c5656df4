use std::sync::Arc;

use mongodb::Client;

use stockwatcher::config;
use stockwatcher::engine::{AlertMonitor, MonitorConfig};
use stockwatcher::services::db_init;
use stockwatcher::services::finnhub::FinnhubClient;
use stockwatcher::services::mongo_store::MongoAlertStore;
use stockwatcher::services::notifier::BroadcastNotifier;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = db_init::ensure_indexes(&db).await {
        tracing::warn!(error = %e, "could not ensure indexes");
    }
    db_init::seed_companies(&db)
        .await
        .expect("Failed to seed companies");

    let store = Arc::new(MongoAlertStore::new(db));
    let prices = Arc::new(FinnhubClient::new(settings.finnhub_api_key.clone()));
    let notifier = Arc::new(BroadcastNotifier::new(64));

    let monitor = Arc::new(AlertMonitor::new(
        store,
        prices,
        notifier,
        MonitorConfig::from(&settings),
    ));

    tracing::info!(
        interval_secs = settings.tick_interval_secs,
        "alert monitor starting"
    );
    let handle = monitor.spawn();

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");
    tracing::info!("shutting down");
    handle.abort();
}
