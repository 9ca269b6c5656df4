use rust_decimal::Decimal;

use crate::error::EvalError;
use crate::models::{Alert, AlertKind, Field, FiringEvent, StateDelta};

/// Outcome of evaluating one alert against one price snapshot.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub delta: StateDelta,
    pub event: Option<FiringEvent>,
}

impl Evaluation {
    fn quiet(delta: StateDelta) -> Self {
        Self { delta, event: None }
    }
}

/// Decide what happens to `alert` given the quote observed at `now`
/// (epoch seconds).
///
/// Pure: no clock, no I/O. The caller persists `delta` and, only once that
/// write has succeeded, delivers `event`.
///
/// `price == None` means no usable quote this tick: the attempt is
/// recorded, but an in-progress duration count is left alone (paused, not
/// reset). Only an observed-false condition resets the count.
pub fn evaluate(
    alert: &Alert,
    price: Option<Decimal>,
    now: i64,
) -> Result<Evaluation, EvalError> {
    // A fired (or externally deactivated) alert stays untouched until
    // reactivation; re-running it is a no-op.
    if !alert.is_active {
        return Ok(Evaluation::quiet(StateDelta::noop()));
    }

    if let AlertKind::Duration { duration_seconds } = alert.kind {
        if duration_seconds <= 0 {
            return Err(EvalError::InvalidDuration { alert_id: alert.id });
        }
    }

    let Some(price) = price else {
        return Ok(Evaluation::quiet(StateDelta::touch(now)));
    };

    let met = alert.direction.is_met(price, alert.target_price);

    match alert.kind {
        AlertKind::Threshold => {
            if met {
                Ok(fire(alert, price, now, None))
            } else {
                Ok(Evaluation::quiet(StateDelta::touch(now)))
            }
        }
        AlertKind::Duration { duration_seconds } => {
            if !met {
                // Hard reset: one observed-false tick restarts the count.
                let mut delta = StateDelta::touch(now);
                if alert.condition_met_since.is_some() {
                    delta.condition_met_since = Field::Clear;
                }
                return Ok(Evaluation::quiet(delta));
            }

            match alert.condition_met_since {
                None => {
                    let mut delta = StateDelta::touch(now);
                    delta.condition_met_since = Field::Set(now);
                    Ok(Evaluation::quiet(delta))
                }
                Some(since) if now - since >= duration_seconds => {
                    Ok(fire(alert, price, now, Some(now - since)))
                }
                Some(_) => Ok(Evaluation::quiet(StateDelta::touch(now))),
            }
        }
    }
}

fn fire(alert: &Alert, price: Decimal, now: i64, sustained_secs: Option<i64>) -> Evaluation {
    let mut delta = StateDelta::touch(now);
    delta.is_active = Some(false);
    delta.triggered_at = Some(now);
    if alert.condition_met_since.is_some() {
        delta.condition_met_since = Field::Clear;
    }

    Evaluation {
        event: Some(FiringEvent::new(alert, price, now, sustained_secs)),
        delta,
    }
}
