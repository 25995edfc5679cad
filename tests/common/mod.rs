//! Common test utilities for timekeeper integration tests.
//!
//! This module provides shared helpers for building vehicles, save nodes and
//! trackers wired to a mock clock and a recording event bus.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use timekeeper::events::mock_bus::RecordingEventBus;
use timekeeper::phase::normalize_degrees;
use timekeeper::time::mock_clock::MockClock;
use timekeeper::{
    OrbitalElements, Situation, TimekeeperRegistry, TimekeeperSettings, VehicleId,
    VehicleSnapshot, VehicleTimekeeper,
};

/// Orbital period used by most tests, in seconds.
pub const TEST_PERIOD: f64 = 600.0;
/// Solar day length used by most tests, in seconds.
pub const TEST_SOLAR_DAY: f64 = 21_600.0;

/// Everything a tracker needs, with handles kept for driving the test.
pub struct Harness {
    pub clock: Arc<MockClock>,
    pub bus: Arc<RecordingEventBus>,
    pub settings: Arc<TimekeeperSettings>,
}

impl Harness {
    pub fn new(settings: TimekeeperSettings) -> Self {
        Self {
            clock: Arc::new(MockClock::new(0.0)),
            bus: Arc::new(RecordingEventBus::new()),
            settings: Arc::new(settings),
        }
    }

    /// A fresh idle tracker for `id`.
    pub fn tracker(&self, id: u64) -> VehicleTimekeeper {
        VehicleTimekeeper::new(VehicleId::new(id), self.clock.clone(), self.settings.clone())
    }

    pub fn registry(&self) -> TimekeeperRegistry {
        TimekeeperRegistry::new(self.clock.clone(), self.settings.clone(), self.bus.clone())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(TimekeeperSettings::default())
    }
}

/// Builds a save node from literal key/value pairs.
pub fn store_from(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// An active vehicle on a circular equatorial orbit at true anomaly `anomaly`.
///
/// # Default values
/// - Name: "Probe"
/// - Period: [`TEST_PERIOD`]
/// - Solar day: [`TEST_SOLAR_DAY`]
pub fn orbiting_vehicle(id: u64, anomaly: f64) -> VehicleSnapshot {
    VehicleSnapshot::new(VehicleId::new(id), "Probe", Situation::Orbiting)
        .with_orbit(OrbitalElements::circular(TEST_PERIOD, 0.0, anomaly))
        .with_solar_day_length(TEST_SOLAR_DAY)
}

/// Circular orbit of `period` seconds where the vehicle sits after `elapsed`
/// seconds, having started at true anomaly zero.
pub fn orbiting_after(id: u64, period: f64, elapsed: f64) -> VehicleSnapshot {
    let anomaly = normalize_degrees(elapsed / period * 360.0);
    VehicleSnapshot::new(VehicleId::new(id), "Probe", Situation::Orbiting)
        .with_orbit(OrbitalElements::circular(period, 0.0, anomaly))
}

/// An active vehicle resting on the surface of a body with day length `day`.
pub fn landed_vehicle(id: u64, day: f64) -> VehicleSnapshot {
    VehicleSnapshot::new(VehicleId::new(id), "Lander", Situation::Landed)
        .with_solar_day_length(day)
}

/// Distance of `value` to the nearest integer.
pub fn distance_to_integer(value: f64) -> f64 {
    (value - value.round()).abs()
}
