use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;

use stockwatcher::engine::evaluate;
use stockwatcher::error::EvalError;
use stockwatcher::models::{Alert, AlertKind, Direction, Field};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn threshold_alert(direction: Direction, target: &str) -> Alert {
    Alert {
        id: ObjectId::new(),
        user_id: ObjectId::new(),
        symbol: "AAPL".to_string(),
        kind: AlertKind::Threshold,
        direction,
        target_price: dec(target),
        is_active: true,
        created_at: 0,
        condition_met_since: None,
        last_evaluated_at: None,
        triggered_at: None,
    }
}

fn duration_alert(direction: Direction, target: &str, duration_seconds: i64) -> Alert {
    Alert {
        kind: AlertKind::Duration { duration_seconds },
        ..threshold_alert(direction, target)
    }
}

#[test]
fn threshold_above_fires_on_boundary_not_before() {
    let mut alert = threshold_alert(Direction::Above, "100.00");

    // 98 -> 100 -> 102 at 300s intervals; must fire on the 100 tick.
    let eval = evaluate(&alert, Some(dec("98")), 0).unwrap();
    assert!(eval.event.is_none());
    eval.delta.apply(&mut alert);
    assert!(alert.is_active);
    assert_eq!(alert.last_evaluated_at, Some(0));

    let eval = evaluate(&alert, Some(dec("100")), 300).unwrap();
    let event = eval.event.expect("boundary quote must fire");
    assert_eq!(event.observed_price, dec("100.00"));
    assert_eq!(event.target_price, dec("100.00"));
    assert_eq!(event.fired_at, 300);
    assert_eq!(event.sustained_secs, None);
    assert_eq!(event.kind, "threshold");

    eval.delta.apply(&mut alert);
    assert!(!alert.is_active);
    assert_eq!(alert.triggered_at, Some(300));
}

#[test]
fn threshold_below_is_boundary_inclusive() {
    let alert = threshold_alert(Direction::Below, "50.00");

    let eval = evaluate(&alert, Some(dec("50.00")), 10).unwrap();
    assert!(eval.event.is_some());

    let eval = evaluate(&alert, Some(dec("50.01")), 10).unwrap();
    assert!(eval.event.is_none());
}

#[test]
fn threshold_condition_false_only_records_attempt() {
    let mut alert = threshold_alert(Direction::Above, "100.00");

    let eval = evaluate(&alert, Some(dec("99.99")), 42).unwrap();
    assert!(eval.event.is_none());
    assert_eq!(eval.delta.is_active, None);
    assert_eq!(eval.delta.triggered_at, None);
    assert_eq!(eval.delta.condition_met_since, Field::Keep);

    eval.delta.apply(&mut alert);
    assert!(alert.is_active);
    assert_eq!(alert.last_evaluated_at, Some(42));
    assert_eq!(alert.triggered_at, None);
}

#[test]
fn decimal_comparison_ignores_scale() {
    let alert = threshold_alert(Direction::Above, "100.00");

    let eval = evaluate(&alert, Some(dec("100.000")), 0).unwrap();
    assert!(eval.event.is_some());
}

#[test]
fn duration_first_observation_starts_count_without_firing() {
    let mut alert = duration_alert(Direction::Below, "50.00", 600);

    let eval = evaluate(&alert, Some(dec("49.50")), 1000).unwrap();
    assert!(eval.event.is_none());
    assert_eq!(eval.delta.condition_met_since, Field::Set(1000));

    eval.delta.apply(&mut alert);
    assert_eq!(alert.condition_met_since, Some(1000));
    assert!(alert.is_active);
}

#[test]
fn duration_uninterrupted_run_fires_once_span_is_covered() {
    // The worked example: below 50.00 sustained for 600s, 300s ticks.
    let mut alert = duration_alert(Direction::Below, "50.00", 600);

    for (now, expect_fire) in [(0, false), (300, false), (600, true)] {
        let eval = evaluate(&alert, Some(dec("49.00")), now).unwrap();
        assert_eq!(eval.event.is_some(), expect_fire, "at t={now}");
        eval.delta.apply(&mut alert);

        if expect_fire {
            assert!(!alert.is_active);
            assert_eq!(alert.triggered_at, Some(600));
            // The count does not survive the firing.
            assert_eq!(alert.condition_met_since, None);
        }
    }
}

#[test]
fn duration_fire_reports_sustained_span() {
    let alert = Alert {
        condition_met_since: Some(1000),
        ..duration_alert(Direction::Above, "200.00", 600)
    };

    let eval = evaluate(&alert, Some(dec("201.00")), 1750).unwrap();
    let event = eval.event.expect("span covered, must fire");
    assert_eq!(event.sustained_secs, Some(750));
    assert_eq!(event.kind, "duration");
}

#[test]
fn duration_interruption_resets_accumulation() {
    // true,true,false,true,true with 300s ticks and a 600s window: the
    // total of condition-true ticks covers the window, but the run never
    // does, so the alert must not fire.
    let mut alert = duration_alert(Direction::Below, "50.00", 600);
    let prices = [
        (0, "49.00"),
        (300, "49.00"),
        (600, "55.00"),
        (900, "49.00"),
        (1200, "49.00"),
    ];

    for (now, p) in prices {
        let eval = evaluate(&alert, Some(dec(p)), now).unwrap();
        assert!(eval.event.is_none(), "must not fire at t={now}");
        eval.delta.apply(&mut alert);
    }

    // The false tick restarted the count at t=900.
    assert_eq!(alert.condition_met_since, Some(900));
    assert!(alert.is_active);

    // One more uninterrupted tick completes the new run.
    let eval = evaluate(&alert, Some(dec("49.00")), 1500).unwrap();
    assert!(eval.event.is_some());
}

#[test]
fn duration_condition_false_clears_count() {
    let mut alert = Alert {
        condition_met_since: Some(100),
        ..duration_alert(Direction::Below, "50.00", 600)
    };

    let eval = evaluate(&alert, Some(dec("50.01")), 400).unwrap();
    assert!(eval.event.is_none());
    assert_eq!(eval.delta.condition_met_since, Field::Clear);

    eval.delta.apply(&mut alert);
    assert_eq!(alert.condition_met_since, None);
}

#[test]
fn unavailable_price_pauses_count_instead_of_resetting() {
    let mut alert = Alert {
        condition_met_since: Some(0),
        ..duration_alert(Direction::Below, "50.00", 600)
    };

    // No usable quote: record the attempt, leave the count alone.
    let eval = evaluate(&alert, None, 300).unwrap();
    assert!(eval.event.is_none());
    assert_eq!(eval.delta.condition_met_since, Field::Keep);
    eval.delta.apply(&mut alert);
    assert_eq!(alert.condition_met_since, Some(0));
    assert_eq!(alert.last_evaluated_at, Some(300));

    // Quotes resume and the original run completes.
    let eval = evaluate(&alert, Some(dec("49.00")), 600).unwrap();
    let event = eval.event.expect("run started at t=0 is complete");
    assert_eq!(event.sustained_secs, Some(600));
}

#[test]
fn fired_alert_is_a_noop_until_reactivated() {
    let alert = Alert {
        is_active: false,
        triggered_at: Some(500),
        ..threshold_alert(Direction::Above, "100.00")
    };

    let eval = evaluate(&alert, Some(dec("150.00")), 800).unwrap();
    assert!(eval.event.is_none());
    assert!(eval.delta.is_noop());
}

#[test]
fn non_positive_duration_is_a_per_alert_error() {
    let alert = duration_alert(Direction::Above, "10.00", 0);

    let err = evaluate(&alert, Some(dec("11.00")), 0).unwrap_err();
    assert_eq!(err, EvalError::InvalidDuration { alert_id: alert.id });
}
