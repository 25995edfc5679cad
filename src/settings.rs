//! Timekeeper settings and the policy flags derived from them.
//!
//! The host's settings panel owns the options; this crate only reads them
//! through [`PolicyProvider`]. [`TimekeeperSettings`] is the stock provider,
//! loadable from JSON with every option defaulted when absent.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::constants::DEFAULT_MESSAGE_DURATION_SECS;
use crate::error::TimekeeperError;

/// Policy flags consulted by the counting state machine and the persistence adapter.
///
/// Flags are read at the moment they matter (start, resume, restore, save,
/// tick), so a host may change them between calls.
pub trait PolicyProvider: Send + Sync + Debug {
    /// Master switch; when off nothing is counted, saved or displayed.
    fn feature_enabled(&self) -> bool;
    /// Whether orbit counting may start or be restored.
    fn orbit_counting_enabled(&self) -> bool;
    /// Whether sol counting may start, resume or be restored.
    fn sol_counting_enabled(&self) -> bool;
    /// Show counters starting from 0 instead of 1.
    fn zero_based_display(&self) -> bool;
    /// Emit the per-tick phase trace and debug-level diagnostics.
    fn debug_mode(&self) -> bool {
        false
    }
    /// How long a counter notification stays on screen, in seconds.
    fn message_duration(&self) -> f32 {
        DEFAULT_MESSAGE_DURATION_SECS
    }
}

/// User-facing timekeeping options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimekeeperSettings {
    /// Turn timekeeping on or off.
    pub mod_enabled: bool,
    /// Enable the orbit counter.
    pub count_orbits: bool,
    /// Enable the sol counter.
    pub count_sols: bool,
    /// Start counting from orbit/sol 0 instead of 1.
    pub zero_counters: bool,
    /// Log everything and trace orbit progress on screen.
    pub debug_mode: bool,
    /// On-screen duration of counter notifications, in seconds.
    pub message_duration: f32,
}

impl Default for TimekeeperSettings {
    fn default() -> Self {
        Self {
            mod_enabled: true,
            count_orbits: true,
            count_sols: true,
            zero_counters: false,
            debug_mode: false,
            message_duration: DEFAULT_MESSAGE_DURATION_SECS,
        }
    }
}

impl TimekeeperSettings {
    /// Parses settings from JSON; missing options take their defaults.
    ///
    /// # Errors
    /// - [`TimekeeperError::InvalidSettings`] - Malformed JSON or a value rejected by [`Self::validate`]
    pub fn from_json_str(json: &str) -> Result<Self, TimekeeperError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings as pretty-printed JSON.
    ///
    /// # Errors
    /// - [`TimekeeperError::InvalidSettings`] - The settings fail validation
    pub fn to_json_string(&self) -> Result<String, TimekeeperError> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks option values that the type system cannot.
    ///
    /// # Errors
    /// - [`TimekeeperError::InvalidSettings`] - Negative or non-finite message duration
    pub fn validate(&self) -> Result<(), TimekeeperError> {
        if !self.message_duration.is_finite() || self.message_duration < 0.0 {
            return Err(TimekeeperError::InvalidSettings(format!(
                "message_duration must be a non-negative number of seconds, got {}",
                self.message_duration
            )));
        }
        Ok(())
    }

    /// Most verbose `tracing` level worth enabling for these settings.
    ///
    /// Debug mode logs everything; otherwise only important events and errors.
    pub fn log_level_filter(&self) -> LevelFilter {
        if self.debug_mode {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }
}

impl PolicyProvider for TimekeeperSettings {
    fn feature_enabled(&self) -> bool {
        self.mod_enabled
    }

    fn orbit_counting_enabled(&self) -> bool {
        self.count_orbits
    }

    fn sol_counting_enabled(&self) -> bool {
        self.count_sols
    }

    fn zero_based_display(&self) -> bool {
        self.zero_counters
    }

    fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    fn message_duration(&self) -> f32 {
        self.message_duration
    }
}
