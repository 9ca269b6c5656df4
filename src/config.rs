use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub finnhub_api_key: String,

    pub tick_interval_secs: u64,
    pub max_concurrent_evals: usize,
    pub fetch_timeout_secs: u64,
    pub store_timeout_secs: u64,
    pub notify_timeout_secs: u64,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "stockwatcher".to_string());

    let finnhub_api_key = env::var("FINNHUB_API_KEY").unwrap_or_default();

    let tick_interval_secs = env_u64("TICK_INTERVAL_SECS", 60);
    let max_concurrent_evals = env_u64("MAX_CONCURRENT_EVALS", 8) as usize;
    let fetch_timeout_secs = env_u64("FETCH_TIMEOUT_SECS", 10);
    let store_timeout_secs = env_u64("STORE_TIMEOUT_SECS", 5);
    let notify_timeout_secs = env_u64("NOTIFY_TIMEOUT_SECS", 5);

    Settings {
        mongodb_uri,
        mongodb_db,
        finnhub_api_key,
        tick_interval_secs,
        max_concurrent_evals,
        fetch_timeout_secs,
        store_timeout_secs,
        notify_timeout_secs,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}
