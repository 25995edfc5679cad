//! Read-only view of a vehicle as provided by the host simulation.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::phase::OrbitalElements;
use crate::types::{Situation, VehicleId};

/// What the counting state machine needs to know about its vehicle.
///
/// Queried on every call, so implementations should return current values.
pub trait VehicleEnvironment: Debug {
    fn id(&self) -> VehicleId;
    /// Display name used in log records.
    fn name(&self) -> &str;
    fn situation(&self) -> Situation;
    /// Current orbital elements around the reference body.
    fn orbit(&self) -> OrbitalElements;
    /// Solar day length of the reference body, in seconds.
    fn solar_day_length(&self) -> f64;
    /// Whether this is the vehicle the player is controlling.
    fn is_active(&self) -> bool;
}

/// A plain-data [`VehicleEnvironment`], filled in by the host each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub name: String,
    pub situation: Situation,
    pub orbit: OrbitalElements,
    pub solar_day_length: f64,
    pub active: bool,
}

impl VehicleSnapshot {
    /// An active vehicle in `situation` with no orbit and no day length yet.
    pub fn new(id: VehicleId, name: impl Into<String>, situation: Situation) -> Self {
        Self {
            id,
            name: name.into(),
            situation,
            orbit: OrbitalElements::default(),
            solar_day_length: 0.0,
            active: true,
        }
    }

    pub fn with_orbit(mut self, orbit: OrbitalElements) -> Self {
        self.orbit = orbit;
        self
    }

    pub fn with_solar_day_length(mut self, seconds: f64) -> Self {
        self.solar_day_length = seconds;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

impl VehicleEnvironment for VehicleSnapshot {
    fn id(&self) -> VehicleId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn situation(&self) -> Situation {
        self.situation
    }

    fn orbit(&self) -> OrbitalElements {
        self.orbit
    }

    fn solar_day_length(&self) -> f64 {
        self.solar_day_length
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
