//! Alert evaluation engine for a small, fixed universe of stock symbols.
//!
//! The heart of the crate is `engine::evaluator`, a pure per-alert state
//! machine, driven on a fixed cadence by `engine::monitor`. Prices come in
//! through the `services::PriceSource` seam, state persists through
//! `services::AlertStore`, and firings leave through `services::Notifier`.
//! The API surface that creates, deletes, and reactivates alerts lives
//! outside this crate and talks to the same collections.

pub mod config;
pub mod error;
pub mod models;

pub mod engine;
pub mod services;
