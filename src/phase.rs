//! Orbit phase computation and wrap detection.
//!
//! The orbit phase is the vehicle's mean longitude: `Ω + s·(ω + M)`, where `M`
//! is the mean anomaly and `s` is `+1` for prograde and `-1` for retrograde
//! orbits. Mean anomaly advances uniformly with time, so the phase moved in a
//! tick can be checked against the elapsed time even on eccentric orbits.
//!
//! Contract of [`orbit_phase`]:
//! - the result lies in `[0, 360)` degrees;
//! - within one orbit it increases for prograde orbits and decreases for
//!   retrograde ones (see [`RotationSense`]);
//! - it wraps once per orbital period.
//!
//! Completion detection never looks at the raw value. It asks how far the
//! vehicle has progressed past the reference phase in the orbit's rotation
//! direction and counts every time that progress passes a full revolution.

use serde::{Deserialize, Serialize};

use crate::constants::{DEGREES_PER_REVOLUTION, RETROGRADE_INCLINATION_THRESHOLD_DEG};
use crate::error::TimekeeperError;

/// Orbital elements of a vehicle, as computed by the host. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Orbital period, in seconds. Non-positive or non-finite for open orbits.
    pub period: f64,
    /// Eccentricity; closed orbits satisfy `0 <= e < 1`.
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_periapsis: f64,
    pub true_anomaly: f64,
}

impl OrbitalElements {
    /// A circular orbit in the reference plane, handy for hosts and tests that
    /// only track an angle along the orbit.
    pub fn circular(period: f64, inclination: f64, true_anomaly: f64) -> Self {
        Self {
            period,
            inclination,
            true_anomaly,
            ..Default::default()
        }
    }

    /// Rotation sense derived from the inclination.
    pub fn rotation_sense(&self) -> RotationSense {
        RotationSense::from_inclination(self.inclination)
    }

    /// Mean anomaly in degrees, converted from the true anomaly.
    ///
    /// # Errors
    /// - [`TimekeeperError::InvalidOrbit`] - Eccentricity outside `[0, 1)` or non-finite anomaly
    pub fn mean_anomaly(&self) -> Result<f64, TimekeeperError> {
        let e = self.eccentricity;
        if !(0.0..1.0).contains(&e) {
            return Err(TimekeeperError::InvalidOrbit(format!(
                "eccentricity {e} does not describe a closed orbit"
            )));
        }
        if !self.true_anomaly.is_finite() {
            return Err(TimekeeperError::InvalidOrbit(format!(
                "true anomaly {} is not finite",
                self.true_anomaly
            )));
        }
        let nu = self.true_anomaly.to_radians();
        let eccentric = ((1.0 - e * e).sqrt() * nu.sin()).atan2(e + nu.cos());
        let mean = eccentric - e * eccentric.sin();
        Ok(normalize_degrees(mean.to_degrees()))
    }
}

/// Direction in which the orbit phase advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationSense {
    Prograde,
    Retrograde,
}

impl RotationSense {
    /// Orbits inclined by more than 90° travel against the body's rotation.
    pub fn from_inclination(inclination_deg: f64) -> Self {
        let inclination = normalize_degrees(inclination_deg);
        let folded = if inclination > 180.0 {
            DEGREES_PER_REVOLUTION - inclination
        } else {
            inclination
        };
        if folded > RETROGRADE_INCLINATION_THRESHOLD_DEG {
            RotationSense::Retrograde
        } else {
            RotationSense::Prograde
        }
    }

    /// `+1.0` for prograde, `-1.0` for retrograde.
    pub const fn sign(self) -> f64 {
        match self {
            RotationSense::Prograde => 1.0,
            RotationSense::Retrograde => -1.0,
        }
    }
}

/// Wraps an angle into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(DEGREES_PER_REVOLUTION);
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if wrapped >= DEGREES_PER_REVOLUTION {
        0.0
    } else {
        wrapped
    }
}

/// Current orbit phase (mean longitude) in `[0, 360)`.
///
/// # Errors
/// - [`TimekeeperError::InvalidOrbit`] - Open orbit or non-finite angles
pub fn orbit_phase(elements: &OrbitalElements) -> Result<f64, TimekeeperError> {
    let node = elements.longitude_of_ascending_node;
    let periapsis = elements.argument_of_periapsis;
    if !node.is_finite() || !periapsis.is_finite() || !elements.inclination.is_finite() {
        return Err(TimekeeperError::InvalidOrbit(format!(
            "non-finite orientation (i={}, Ω={node}, ω={periapsis})",
            elements.inclination
        )));
    }
    let sense = elements.rotation_sense();
    let mean_anomaly = elements.mean_anomaly()?;
    Ok(normalize_degrees(
        node + sense.sign() * (periapsis + mean_anomaly),
    ))
}

/// Progress of `phase` past `reference` in the rotation direction, in `[0, 360)`.
pub fn progress_from(reference: f64, phase: f64, sense: RotationSense) -> f64 {
    normalize_degrees(sense.sign() * (phase - reference))
}

/// True if moving from `last` to `current` (less than one revolution, in the
/// rotation direction) passes through `reference`.
///
/// Landing exactly on the reference counts as crossing it; leaving from it does not.
pub fn crossed_reference(reference: f64, last: f64, current: f64, sense: RotationSense) -> bool {
    let moved = progress_from(last, current, sense);
    moved > 0.0 && progress_from(reference, last, sense) + moved >= DEGREES_PER_REVOLUTION
}

/// Degrees advanced between two observations `elapsed` seconds apart.
///
/// The observed difference only fixes the advance modulo 360°; the elapsed
/// time picks how many whole revolutions to add, so a tick spanning several
/// orbits is not mistaken for a short one. Without a usable period the
/// observed difference is taken as is.
///
/// No time elapsed means no advance; rounding jitter between two phase
/// evaluations at the same instant would otherwise read as a full revolution.
pub fn phase_advance(
    last: f64,
    current: f64,
    sense: RotationSense,
    elapsed: f64,
    period: f64,
) -> f64 {
    if !(elapsed > 0.0) {
        return 0.0;
    }
    let observed = progress_from(last, current, sense);
    if checked_period("orbital period", period).is_err() {
        return observed;
    }
    let expected = elapsed / period * DEGREES_PER_REVOLUTION;
    let extra_revolutions = ((expected - observed) / DEGREES_PER_REVOLUTION).round();
    (observed + extra_revolutions * DEGREES_PER_REVOLUTION).max(0.0)
}

/// Number of reference crossings when advancing `advanced` degrees from `last`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn completed_revolutions(
    reference: f64,
    last: f64,
    advanced: f64,
    sense: RotationSense,
) -> u32 {
    if !advanced.is_finite() || advanced <= 0.0 {
        return 0;
    }
    let total = progress_from(reference, last, sense) + advanced;
    (total / DEGREES_PER_REVOLUTION).floor() as u32
}

/// Phase expected `elapsed` seconds after passing `reference`.
pub fn project_phase(reference: f64, sense: RotationSense, elapsed: f64, period: f64) -> f64 {
    match checked_period("orbital period", period) {
        Ok(period) if elapsed.is_finite() => normalize_degrees(
            reference + sense.sign() * (elapsed / period * DEGREES_PER_REVOLUTION),
        ),
        _ => normalize_degrees(reference),
    }
}

/// Time at which a vehicle now at `current` last passed `reference`.
///
/// Mean longitude advances uniformly, so the progress past the reference
/// converts directly to time. A long tick that overshoots the crossing still
/// dates the lap from the crossing itself.
pub fn last_crossing_time(
    now: f64,
    reference: f64,
    current: f64,
    sense: RotationSense,
    period: f64,
) -> f64 {
    now - progress_from(reference, current, sense) / DEGREES_PER_REVOLUTION * period
}

/// Validates a period or day length before it is used as a divisor.
///
/// # Errors
/// - [`TimekeeperError::InvalidPeriod`] - Zero, negative or non-finite value
pub fn checked_period(quantity: &str, value: f64) -> Result<f64, TimekeeperError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TimekeeperError::InvalidPeriod {
            quantity: quantity.to_string(),
            value: value.to_string(),
        })
    }
}

/// Whole cycles of `period` contained in `elapsed`: `floor(elapsed / period)`.
///
/// Negative or non-finite intervals contain no cycles. The caller validates `period`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn whole_cycles(elapsed: f64, period: f64) -> u32 {
    let cycles = (elapsed / period).floor();
    if cycles.is_finite() && cycles > 0.0 {
        cycles as u32
    } else {
        0
    }
}
