//! Integration tests for the counting state machine.
//!
//! These tests drive trackers and the registry through situation changes,
//! reference-body changes, ticks and restores with a mock clock, checking the
//! resulting counts, lap timestamps and display requests.

mod common;

use common::{
    Harness, TEST_PERIOD, landed_vehicle, orbiting_after, orbiting_vehicle, store_from,
};
use timekeeper::{
    CountMode, DisplayKind, ReferenceBodyChange, Situation, SituationChange, TimekeeperSettings,
    VehicleId, VehicleTimekeepingRecord,
};

fn situation_change(id: u64, from: Situation, to: Situation) -> SituationChange {
    SituationChange {
        vehicle: VehicleId::new(id),
        from,
        to,
    }
}

#[test]
fn sm_landed_activation_starts_sols() {
    let harness = Harness::default();
    let mut tracker = harness.tracker(1);

    let shown = tracker.activate(&landed_vehicle(1, 100.0), harness.bus.clone());

    assert_eq!(tracker.mode(), CountMode::Sols);
    assert_eq!(tracker.count(), 0);
    assert_eq!(shown.map(|d| d.label).as_deref(), Some("Sol 1"));
    assert!(tracker.is_subscribed());
    assert_eq!(harness.bus.active_for(VehicleId::new(1)), 2);
}

#[test]
fn sm_single_tick_credits_floor_of_elapsed_sols() {
    let harness = Harness::default();
    let mut tracker = harness.tracker(1);
    let lander = landed_vehicle(1, 21_600.0);
    tracker.activate(&lander, harness.bus.clone());

    harness.clock.advance(3.5 * 21_600.0);
    let outcome = tracker.tick(&lander);

    assert_eq!(outcome.completed, 3);
    assert_eq!(tracker.count(), 3);
    assert_eq!(tracker.record().lap_timestamp, 3.0 * 21_600.0);
    assert_eq!(outcome.display.len(), 1);
    assert_eq!(outcome.display[0].label, "Sol 4");
    assert_eq!(outcome.display[0].kind, DisplayKind::Counter);
}

#[test]
fn sm_flying_pauses_sols_and_landing_resumes_count() {
    let harness = Harness::default();
    let mut tracker = harness.tracker(1);
    let lander = landed_vehicle(1, 100.0);
    tracker.activate(&lander, harness.bus.clone());
    harness.clock.advance(350.0);
    tracker.tick(&lander);
    assert_eq!(tracker.count(), 3);

    let hopping = landed_vehicle(1, 100.0);
    let shown = tracker.on_situation_change(
        &hopping,
        &situation_change(1, Situation::Landed, Situation::Flying),
    );
    assert!(shown.is_none());
    assert!(tracker.is_paused());
    assert_eq!(tracker.mode(), CountMode::Sols);

    // Paused trackers ignore ticks entirely.
    harness.clock.advance(20.0);
    assert_eq!(tracker.tick(&hopping).completed, 0);
    assert_eq!(tracker.count(), 3);

    let shown = tracker.on_situation_change(
        &lander,
        &situation_change(1, Situation::Flying, Situation::Landed),
    );
    assert!(shown.is_none());
    assert!(!tracker.is_paused());
    assert_eq!(tracker.mode(), CountMode::Sols);
    assert_eq!(tracker.count(), 3);
    assert_eq!(tracker.record().lap_timestamp, 300.0);
}

#[test]
fn sm_disabled_sol_counting_never_counts_sols() {
    let harness = Harness::new(TimekeeperSettings {
        count_sols: false,
        ..Default::default()
    });
    let mut tracker = harness.tracker(1);
    let lander = landed_vehicle(1, 100.0);

    assert!(tracker.activate(&lander, harness.bus.clone()).is_none());
    assert_eq!(tracker.mode(), CountMode::None);

    tracker.on_situation_change(
        &lander,
        &situation_change(1, Situation::Flying, Situation::Landed),
    );
    assert_eq!(tracker.mode(), CountMode::None);
    assert_eq!(tracker.count(), 0);
}

#[test]
fn sm_disabled_orbit_counting_leaves_tracker_idle() {
    let harness = Harness::new(TimekeeperSettings {
        count_orbits: false,
        ..Default::default()
    });
    let mut tracker = harness.tracker(1);
    let probe = orbiting_vehicle(1, 45.0);

    tracker.activate(&probe, harness.bus.clone());
    tracker.on_situation_change(
        &probe,
        &situation_change(1, Situation::SubOrbital, Situation::Orbiting),
    );

    assert_eq!(tracker.mode(), CountMode::None);
    assert_eq!(*tracker.record(), VehicleTimekeepingRecord::inactive());
}

#[test]
fn sm_orbit_completes_after_one_period() {
    let harness = Harness::default();
    let mut tracker = harness.tracker(1);
    tracker.activate(&orbiting_after(1, TEST_PERIOD, 0.0), harness.bus.clone());

    for step in 1..=7 {
        let t = f64::from(step) * 100.0 + 10.0;
        harness.clock.set_time(t);
        tracker.tick(&orbiting_after(1, TEST_PERIOD, t));
    }

    assert_eq!(tracker.count(), 1);
    assert!((tracker.record().lap_timestamp - 600.0).abs() < 1e-6);
}

#[test]
fn sm_single_long_tick_credits_every_orbit() {
    let harness = Harness::default();
    let mut tracker = harness.tracker(1);
    tracker.activate(&orbiting_after(1, TEST_PERIOD, 0.0), harness.bus.clone());

    harness.clock.set_time(2_050.0);
    let outcome = tracker.tick(&orbiting_after(1, TEST_PERIOD, 2_050.0));

    assert_eq!(outcome.completed, 3);
    assert_eq!(tracker.count(), 3);
    assert_eq!(outcome.display[0].label, "Orbit 4");
}

#[test]
fn sm_reference_body_change_always_resets() {
    let harness = Harness::default();
    let mut tracker = harness.tracker(1);
    tracker.activate(&orbiting_after(1, TEST_PERIOD, 0.0), harness.bus.clone());
    harness.clock.set_time(1_900.0);
    tracker.tick(&orbiting_after(1, TEST_PERIOD, 1_900.0));
    assert_eq!(tracker.count(), 3);

    tracker.on_reference_body_change(&ReferenceBodyChange {
        vehicle: VehicleId::new(1),
        from: "Kerbin".to_string(),
        to: "Mun".to_string(),
    });

    assert_eq!(tracker.mode(), CountMode::None);
    assert_eq!(tracker.count(), 0);
}

#[test]
fn sm_leaving_orbit_stops_counting() {
    let harness = Harness::default();
    let mut tracker = harness.tracker(1);
    let probe = orbiting_vehicle(1, 10.0);
    tracker.activate(&probe, harness.bus.clone());

    tracker.on_situation_change(
        &probe,
        &situation_change(1, Situation::Orbiting, Situation::Escaping),
    );

    assert_eq!(tracker.mode(), CountMode::None);
}

#[test]
fn sm_catch_up_credits_whole_orbits_missed_while_unloaded() {
    const T0: f64 = 100_000.0;
    let harness = Harness::default();
    let mut tracker = harness.tracker(1);
    tracker.restore(&store_from(&[
        ("mode", "Orbits"),
        ("count", "5"),
        ("lapTimestamp", "100000"),
        ("referencePhase", "0"),
    ]));

    harness.clock.set_time(T0 + 1_550.0);
    tracker.activate(&orbiting_after(1, TEST_PERIOD, 1_550.0), harness.bus.clone());

    assert_eq!(tracker.mode(), CountMode::Orbits);
    assert_eq!(tracker.count(), 7);
    assert_eq!(tracker.record().lap_timestamp, T0 + 1_200.0);

    // The first tick after catch-up must not count the same orbits again.
    let outcome = tracker.tick(&orbiting_after(1, TEST_PERIOD, 1_550.0));
    assert_eq!(outcome.completed, 0);

    harness.clock.set_time(T0 + 1_810.0);
    let outcome = tracker.tick(&orbiting_after(1, TEST_PERIOD, 1_810.0));
    assert_eq!(outcome.completed, 1);
    assert_eq!(tracker.count(), 8);
    assert!((tracker.record().lap_timestamp - (T0 + 1_800.0)).abs() < 1e-6);
}

#[test]
fn sm_catch_up_credits_sols_missed_while_unloaded() {
    let harness = Harness::default();
    let mut tracker = harness.tracker(1);
    tracker.restore(&store_from(&[
        ("mode", "Sols"),
        ("count", "2"),
        ("lapTimestamp", "1000"),
    ]));

    harness.clock.set_time(1_000.0 + 4.25 * 100.0);
    tracker.activate(&landed_vehicle(1, 100.0), harness.bus.clone());

    assert_eq!(tracker.mode(), CountMode::Sols);
    assert_eq!(tracker.count(), 6);
    assert_eq!(tracker.record().lap_timestamp, 1_400.0);
}

#[test]
fn sm_inactive_vehicle_gets_no_display() {
    let harness = Harness::default();
    let mut tracker = harness.tracker(1);
    let background = landed_vehicle(1, 100.0).with_active(false);

    assert!(tracker.activate(&background, harness.bus.clone()).is_none());
    harness.clock.advance(250.0);
    let outcome = tracker.tick(&background);

    assert_eq!(outcome.completed, 2);
    assert!(outcome.display.is_empty());
}

#[test]
fn sm_registry_routes_events_to_their_vehicle() {
    let harness = Harness::default();
    let mut registry = harness.registry();
    let lander = landed_vehicle(1, 100.0);
    let probe = orbiting_vehicle(2, 0.0);
    registry.activate(&lander);
    registry.activate(&probe);
    assert_eq!(harness.bus.active_total(), 4);

    registry.dispatch_situation_change(
        &lander,
        &situation_change(1, Situation::Landed, Situation::Flying),
    );
    registry.dispatch_reference_body_change(&ReferenceBodyChange {
        vehicle: VehicleId::new(2),
        from: "Kerbin".to_string(),
        to: "Sun".to_string(),
    });

    let lander_tracker = registry.get(VehicleId::new(1)).unwrap();
    assert!(lander_tracker.is_paused());
    assert_eq!(
        registry.get(VehicleId::new(2)).unwrap().mode(),
        CountMode::None
    );

    drop(registry.remove(VehicleId::new(1)));
    assert_eq!(harness.bus.active_for(VehicleId::new(1)), 0);
    assert_eq!(harness.bus.active_for(VehicleId::new(2)), 2);
}

#[test]
fn sm_feature_disabled_ignores_everything() {
    let harness = Harness::new(TimekeeperSettings {
        mod_enabled: false,
        ..Default::default()
    });
    let mut tracker = harness.tracker(1);
    let lander = landed_vehicle(1, 100.0);

    assert!(tracker.activate(&lander, harness.bus.clone()).is_none());
    assert!(!tracker.is_subscribed());
    tracker.on_situation_change(
        &lander,
        &situation_change(1, Situation::Flying, Situation::Landed),
    );

    assert_eq!(tracker.mode(), CountMode::None);
    assert_eq!(harness.bus.active_total(), 0);
}
