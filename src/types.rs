//! Core type definitions for vehicle timekeeping.
//!
//! Identifier newtypes keep vehicle and subscription handles from being mixed
//! up at compile time; `CountMode` and `Situation` carry the host-facing names
//! used in save files and event payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TimekeeperError;

/// Macro to generate identifier newtype wrappers with common implementations
macro_rules! id_newtype {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty) => $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[derive(Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Creates a new instance
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Raw value
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<$inner> for $name {
            #[inline]
            fn eq(&self, other: &$inner) -> bool {
                self.0 == *other
            }
        }
    };
}

id_newtype! {
    /// Host identifier of a simulated vehicle.
    VehicleId(u64) => "vehicle#"
}

id_newtype! {
    /// Handle returned by an event bus for one registered callback.
    SubscriptionId(u64) => "sub#"
}

/// Which phenomenon is currently being counted for a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CountMode {
    /// Not counting; every other record field is unused.
    #[default]
    None,
    /// Counting completed orbits around the reference body.
    Orbits,
    /// Counting completed solar days on the surface of the reference body.
    Sols,
}

impl CountMode {
    /// Persisted name of the mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            CountMode::None => "None",
            CountMode::Orbits => "Orbits",
            CountMode::Sols => "Sols",
        }
    }
}

impl fmt::Display for CountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a persisted mode name, ignoring ASCII case.
impl FromStr for CountMode {
    type Err = TimekeeperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        [CountMode::None, CountMode::Orbits, CountMode::Sols]
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TimekeeperError::UnknownCountMode(s.to_string()))
    }
}

/// The vehicle's flight regime as reported by the host simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Situation {
    Landed,
    Splashed,
    Prelaunch,
    Flying,
    SubOrbital,
    Orbiting,
    Escaping,
    Docked,
}

impl Situation {
    const ALL: [Situation; 8] = [
        Situation::Landed,
        Situation::Splashed,
        Situation::Prelaunch,
        Situation::Flying,
        Situation::SubOrbital,
        Situation::Orbiting,
        Situation::Escaping,
        Situation::Docked,
    ];

    /// Host name of the situation (e.g. `SUB_ORBITAL`).
    pub const fn host_name(self) -> &'static str {
        match self {
            Situation::Landed => "LANDED",
            Situation::Splashed => "SPLASHED",
            Situation::Prelaunch => "PRELAUNCH",
            Situation::Flying => "FLYING",
            Situation::SubOrbital => "SUB_ORBITAL",
            Situation::Orbiting => "ORBITING",
            Situation::Escaping => "ESCAPING",
            Situation::Docked => "DOCKED",
        }
    }

    /// True on the surface of a body, where sols are counted.
    pub const fn is_surface(self) -> bool {
        matches!(self, Situation::Landed | Situation::Splashed)
    }

    /// True in the atmospheric or ballistic regimes that suspend sol counting.
    pub const fn is_suspending(self) -> bool {
        matches!(self, Situation::Flying | Situation::SubOrbital)
    }
}

impl fmt::Display for Situation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_name())
    }
}

impl FromStr for Situation {
    type Err = TimekeeperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Situation::ALL
            .into_iter()
            .find(|situation| situation.host_name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TimekeeperError::UnknownSituation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_id_display_and_conversions() {
        let id = VehicleId::new(42);
        assert_eq!(id.to_string(), "vehicle#42");
        assert_eq!(u64::from(id), 42);
        assert_eq!(VehicleId::from(42), id);
        assert_eq!(id, 42u64);
    }

    #[test]
    fn count_mode_parses_case_insensitively() {
        assert_eq!("orbits".parse::<CountMode>().unwrap(), CountMode::Orbits);
        assert_eq!(" SOLS ".parse::<CountMode>().unwrap(), CountMode::Sols);
        assert_eq!("None".parse::<CountMode>().unwrap(), CountMode::None);
    }

    #[test]
    fn count_mode_rejects_unknown_names() {
        assert_eq!(
            "Laps".parse::<CountMode>(),
            Err(TimekeeperError::UnknownCountMode("Laps".to_string()))
        );
        assert!("".parse::<CountMode>().is_err());
    }

    #[test]
    fn count_mode_display_matches_persisted_name() {
        for mode in [CountMode::None, CountMode::Orbits, CountMode::Sols] {
            assert_eq!(mode.to_string().parse::<CountMode>().unwrap(), mode);
        }
    }

    #[test]
    fn situation_host_names() {
        assert_eq!(
            "sub_orbital".parse::<Situation>().unwrap(),
            Situation::SubOrbital
        );
        assert_eq!(Situation::Orbiting.to_string(), "ORBITING");
        assert!(matches!(
            "HOVERING".parse::<Situation>(),
            Err(TimekeeperError::UnknownSituation(_))
        ));
    }

    #[test]
    fn situation_groups() {
        assert!(Situation::Landed.is_surface());
        assert!(Situation::Splashed.is_surface());
        assert!(!Situation::Prelaunch.is_surface());
        assert!(Situation::Flying.is_suspending());
        assert!(Situation::SubOrbital.is_suspending());
        assert!(!Situation::Orbiting.is_suspending());
    }
}
