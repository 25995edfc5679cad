//! The per-vehicle timekeeping record.
//!
//! One record exists per tracked vehicle. Only the counting state machine
//! mutates it; the persistence adapter copies its fields in and out.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::types::CountMode;

/// Counting state of one vehicle.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleTimekeepingRecord {
    /// Phenomenon being counted. `None` leaves every other field zeroed.
    #[serde_as(as = "DisplayFromStr")]
    pub mode: CountMode,
    /// Completed cycles since the mode was last (re)started.
    pub count: u32,
    /// Orbit phase (degrees) captured when orbit counting started.
    pub reference_phase: f64,
    /// Orbit phase observed on the previous tick. Not persisted.
    #[serde(skip)]
    pub last_phase: f64,
    /// Simulation time (seconds) at which the current cycle began.
    pub lap_timestamp: f64,
    /// Sol counting suspended by a Flying or Sub-orbital situation.
    pub paused: bool,
    /// Orbit progress (degrees) from an older save that kept progress at
    /// `lap_timestamp` instead of a reference phase. Resolved on activation.
    #[serde(skip)]
    pub legacy_progress: Option<f64>,
}

impl VehicleTimekeepingRecord {
    /// A record that counts nothing.
    pub fn inactive() -> Self {
        Self::default()
    }

    /// True while orbits or sols are being counted (paused or not).
    pub fn is_counting(&self) -> bool {
        self.mode != CountMode::None
    }

    /// Restarts as an orbit counter with `phase` as the reference point.
    pub fn start_orbits(&mut self, phase: f64, now: f64) {
        *self = Self {
            mode: CountMode::Orbits,
            count: 0,
            reference_phase: phase,
            last_phase: phase,
            lap_timestamp: now,
            paused: false,
            legacy_progress: None,
        };
    }

    /// Restarts as a sol counter whose first sol begins at `now`.
    pub fn start_sols(&mut self, now: f64) {
        *self = Self {
            mode: CountMode::Sols,
            lap_timestamp: now,
            ..Self::default()
        };
    }

    /// Stops counting and zeroes every field.
    pub fn stop(&mut self) {
        *self = Self::inactive();
    }
}
