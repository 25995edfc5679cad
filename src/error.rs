//! Timekeeper error types.
//!
//! None of these errors reach the player. The state machine turns them into
//! "nothing counted this tick" and the persistence layer into documented
//! defaults. They exist so the fallible helpers can use `?` and so hosts that
//! parse modes, situations or settings themselves get a precise reason.
//! The `thiserror` crate is used for ergonomic error definitions.

use thiserror::Error;

/// Main error type for timekeeping operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimekeeperError {
    /// A counting mode string that is not `None`, `Orbits` or `Sols`.
    #[error("Unknown counting mode: '{0}'")]
    UnknownCountMode(String),

    /// A vehicle situation name the crate does not recognise.
    #[error("Unknown vehicle situation: '{0}'")]
    UnknownSituation(String),

    /// A period or day length that cannot be used to measure progress.
    #[error("Invalid {quantity}: {value} (must be finite and positive)")]
    InvalidPeriod { quantity: String, value: String },

    /// Orbital elements that do not describe a closed, finite orbit.
    #[error("Invalid orbit: {0}")]
    InvalidOrbit(String),

    /// No tracker is registered for the vehicle.
    #[error("No timekeeper registered for vehicle {0}")]
    UnknownVehicle(u64),

    /// Settings that failed to parse or validate.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl From<serde_json::Error> for TimekeeperError {
    fn from(err: serde_json::Error) -> Self {
        TimekeeperError::InvalidSettings(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_count_mode_display() {
        let err = TimekeeperError::UnknownCountMode("Laps".to_string());
        assert_eq!(format!("{}", err), "Unknown counting mode: 'Laps'");
    }

    #[test]
    fn invalid_period_display() {
        let err = TimekeeperError::InvalidPeriod {
            quantity: "solar day length".to_string(),
            value: "0".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid solar day length: 0 (must be finite and positive)"
        );
    }

    #[test]
    fn unknown_vehicle_display() {
        let err = TimekeeperError::UnknownVehicle(7);
        assert_eq!(format!("{}", err), "No timekeeper registered for vehicle 7");
    }

    #[test]
    fn settings_error_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        match TimekeeperError::from(json_err) {
            TimekeeperError::InvalidSettings(msg) => assert!(!msg.is_empty()),
            other => panic!("Incorrect TimekeeperError variant: {other:?}"),
        }
    }
}
