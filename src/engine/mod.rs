pub mod evaluator;
pub mod monitor;

pub use evaluator::{Evaluation, evaluate};
pub use monitor::{AlertMonitor, MonitorConfig, TickStats};
