use mongodb::bson::oid::ObjectId;
use thiserror::Error;

/// Quote failure for a single symbol. One symbol failing never hides
/// another symbol's result; the tick skips alerts on this symbol and
/// evaluates the rest.
#[derive(Debug, Clone, Error)]
#[error("price fetch failed for {symbol}: {reason}")]
pub struct FetchError {
    pub symbol: String,
    pub reason: FetchReason,
}

#[derive(Debug, Clone, Error)]
pub enum FetchReason {
    #[error("FINNHUB_API_KEY is missing in .env")]
    MissingApiKey,
    #[error("request error: {0}")]
    Request(String),
    #[error("quote failed: {status} {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Parse(String),
    #[error("quote is not a usable price: {0}")]
    InvalidQuote(f64),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Invariant violation on an alert record. Contained to the one alert:
/// the monitor logs it and skips the record without aborting the tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("duration alert {alert_id} has a non-positive duration_seconds")]
    InvalidDuration { alert_id: ObjectId },
}

/// Failure to even begin a tick. Everything past the initial load is
/// contained per symbol or per alert and never surfaces here.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("alert store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("alert store timed out after {0:?}")]
    StoreTimeout(std::time::Duration),
}
