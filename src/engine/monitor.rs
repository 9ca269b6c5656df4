use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use rust_decimal::Decimal;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::engine::evaluator;
use crate::error::{FetchError, TickError};
use crate::models::Alert;
use crate::services::{AlertStore, Notifier, PriceSource};

/// Scheduling knobs for the monitor; see `config::Settings` for the env
/// mapping.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub tick_interval: Duration,
    pub max_concurrent_evals: usize,
    pub fetch_timeout: Duration,
    pub store_timeout: Duration,
    pub notify_timeout: Duration,
}

impl From<&Settings> for MonitorConfig {
    fn from(s: &Settings) -> Self {
        Self {
            tick_interval: Duration::from_secs(s.tick_interval_secs.max(1)),
            max_concurrent_evals: s.max_concurrent_evals.max(1),
            fetch_timeout: Duration::from_secs(s.fetch_timeout_secs),
            store_timeout: Duration::from_secs(s.store_timeout_secs),
            notify_timeout: Duration::from_secs(s.notify_timeout_secs),
        }
    }
}

/// Per-tick counters, logged after every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Alerts the tick attempted, including misconfigured ones.
    pub evaluated: usize,
    pub fired: usize,
    /// Alerts skipped because their symbol had no usable quote.
    pub unavailable: usize,
    /// Updates that matched no still-active record.
    pub conflicts: usize,
    pub store_failures: usize,
    pub config_errors: usize,
}

enum EvalOutcome {
    Fired,
    Evaluated,
    Unavailable,
    Conflict,
    StoreFailed,
    ConfigError,
}

/// Drives one evaluation cycle over all active alerts on a fixed cadence.
pub struct AlertMonitor {
    store: Arc<dyn AlertStore>,
    prices: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    cfg: MonitorConfig,
}

impl AlertMonitor {
    pub fn new(
        store: Arc<dyn AlertStore>,
        prices: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
        cfg: MonitorConfig,
    ) -> Self {
        Self {
            store,
            prices,
            notifier,
            cfg,
        }
    }

    /// Run the evaluation loop on its own task. Ticks are strictly
    /// serialized: a tick that outlives the interval makes the next due
    /// tick get skipped, never run concurrently.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = time::interval(self.cfg.tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                let started = Instant::now();
                match self.run_tick().await {
                    Ok(stats) if stats.evaluated == 0 => debug!("tick: no active alerts"),
                    Ok(stats) => info!(
                        evaluated = stats.evaluated,
                        fired = stats.fired,
                        unavailable = stats.unavailable,
                        conflicts = stats.conflicts,
                        store_failures = stats.store_failures,
                        config_errors = stats.config_errors,
                        "tick complete"
                    ),
                    Err(e) => error!(error = %e, "tick failed"),
                }

                let elapsed = started.elapsed();
                if elapsed > self.cfg.tick_interval {
                    warn!(
                        ?elapsed,
                        interval = ?self.cfg.tick_interval,
                        "tick overran the interval; skipping missed ticks"
                    );
                }
            }
        })
    }

    /// One evaluation cycle over every active alert.
    pub async fn run_tick(&self) -> Result<TickStats, TickError> {
        // 1) Load active alerts; the only tick-level failure point.
        let alerts = match time::timeout(self.cfg.store_timeout, self.store.list_active()).await {
            Ok(res) => res?,
            Err(_) => return Err(TickError::StoreTimeout(self.cfg.store_timeout)),
        };

        if alerts.is_empty() {
            return Ok(TickStats::default());
        }

        // 2) One quote request per distinct symbol per tick.
        let symbols: BTreeSet<String> = alerts.iter().map(|a| a.symbol.clone()).collect();
        let quotes = match time::timeout(self.cfg.fetch_timeout, self.prices.fetch(&symbols)).await
        {
            Ok(map) => map,
            Err(_) => {
                warn!(
                    symbols = symbols.len(),
                    "price fetch timed out; all symbols unavailable this tick"
                );
                HashMap::new()
            }
        };

        // 3) Every alert in this tick sees the same snapshot and the same
        //    timestamp. Alerts are independent, so evaluation fans out up
        //    to the configured bound.
        let now = chrono::Utc::now().timestamp();
        let outcomes: Vec<EvalOutcome> = futures_util::stream::iter(
            alerts
                .into_iter()
                .map(|alert| self.evaluate_one(alert, &quotes, now)),
        )
        .buffer_unordered(self.cfg.max_concurrent_evals)
        .collect()
        .await;

        let mut stats = TickStats {
            evaluated: outcomes.len(),
            ..TickStats::default()
        };
        for outcome in outcomes {
            match outcome {
                EvalOutcome::Fired => stats.fired += 1,
                EvalOutcome::Evaluated => {}
                EvalOutcome::Unavailable => stats.unavailable += 1,
                EvalOutcome::Conflict => stats.conflicts += 1,
                EvalOutcome::StoreFailed => stats.store_failures += 1,
                EvalOutcome::ConfigError => stats.config_errors += 1,
            }
        }

        Ok(stats)
    }

    async fn evaluate_one(
        &self,
        alert: Alert,
        quotes: &HashMap<String, Result<Decimal, FetchError>>,
        now: i64,
    ) -> EvalOutcome {
        let price = match quotes.get(&alert.symbol) {
            Some(Ok(p)) => Some(*p),
            Some(Err(e)) => {
                warn!(alert_id = %alert.id, error = %e, "no usable quote for alert this tick");
                None
            }
            // The whole fetch timed out.
            None => None,
        };
        let unavailable = price.is_none();

        let eval = match evaluator::evaluate(&alert, price, now) {
            Ok(ev) => ev,
            Err(e) => {
                error!(alert_id = %alert.id, error = %e, "skipping misconfigured alert");
                return EvalOutcome::ConfigError;
            }
        };

        if eval.delta.is_noop() {
            return EvalOutcome::Evaluated;
        }

        // 4) Persist before any side effect; a lost write means no
        //    notification, and the alert retries naturally next tick.
        let persisted =
            match time::timeout(self.cfg.store_timeout, self.store.update(alert.id, &eval.delta))
                .await
            {
                Ok(Ok(matched)) => matched,
                Ok(Err(e)) => {
                    warn!(alert_id = %alert.id, error = %e, "state update failed; retrying next tick");
                    return EvalOutcome::StoreFailed;
                }
                Err(_) => {
                    warn!(alert_id = %alert.id, "state update timed out; retrying next tick");
                    return EvalOutcome::StoreFailed;
                }
            };

        if !persisted {
            // The record fired or was deleted under us; nothing to deliver.
            debug!(alert_id = %alert.id, "alert changed concurrently; skipping");
            return EvalOutcome::Conflict;
        }

        let Some(event) = eval.event else {
            return if unavailable {
                EvalOutcome::Unavailable
            } else {
                EvalOutcome::Evaluated
            };
        };

        info!(
            alert_id = %event.alert_id,
            symbol = %event.symbol,
            price = %event.observed_price,
            "alert fired"
        );

        // 5) History is advisory; the alert document is the at-most-once
        //    gate, so a failed history write never blocks delivery.
        match time::timeout(self.cfg.store_timeout, self.store.record_firing(&event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(alert_id = %event.alert_id, error = %e, "failed to record firing history"),
            Err(_) => warn!(alert_id = %event.alert_id, "firing history write timed out"),
        }

        match time::timeout(self.cfg.notify_timeout, self.notifier.notify(&event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(alert_id = %event.alert_id, error = %e, "notification delivery failed; alert stays fired")
            }
            Err(_) => {
                warn!(alert_id = %event.alert_id, "notification timed out; alert stays fired")
            }
        }

        EvalOutcome::Fired
    }
}
