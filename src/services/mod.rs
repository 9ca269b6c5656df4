pub mod db_init;
pub mod finnhub;

pub mod alert_store;
pub mod mongo_store;
pub mod notifier;
pub mod price_source;

pub use alert_store::AlertStore;
pub use notifier::Notifier;
pub use price_source::PriceSource;
