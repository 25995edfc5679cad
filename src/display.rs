//! Display requests handed to the host's notification surface.

use crate::constants::{ORBIT_LABEL_PREFIX, SOL_LABEL_PREFIX};
use crate::settings::PolicyProvider;
use crate::types::{CountMode, VehicleId};

/// What a display request shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    /// "Orbit N" / "Sol N" counter.
    Counter,
    /// Debug trace of orbit progress, in degrees past the reference phase.
    PhaseTrace,
}

/// A short label to show for a vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRequest {
    pub vehicle: VehicleId,
    pub label: String,
    /// Seconds the label should stay on screen.
    pub duration: f32,
    pub kind: DisplayKind,
}

impl DisplayRequest {
    /// Counter label for `mode`, or `None` while not counting.
    ///
    /// Counters are shown 1-based unless zero-based display is enabled.
    pub fn counter(
        vehicle: VehicleId,
        mode: CountMode,
        count: u32,
        policy: &dyn PolicyProvider,
    ) -> Option<Self> {
        let prefix = match mode {
            CountMode::None => return None,
            CountMode::Orbits => ORBIT_LABEL_PREFIX,
            CountMode::Sols => SOL_LABEL_PREFIX,
        };
        let shown = if policy.zero_based_display() {
            u64::from(count)
        } else {
            u64::from(count) + 1
        };
        Some(Self {
            vehicle,
            label: format!("{prefix} {shown}"),
            duration: policy.message_duration(),
            kind: DisplayKind::Counter,
        })
    }

    /// Progress trace shown every tick in debug mode.
    pub fn phase_trace(vehicle: VehicleId, progress_deg: f64) -> Self {
        Self {
            vehicle,
            label: format!("{progress_deg:.1}"),
            duration: 1.0,
            kind: DisplayKind::PhaseTrace,
        }
    }
}
