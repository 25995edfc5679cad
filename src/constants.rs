//! Timekeeper constants: angular units, persisted record keys and settings defaults.

// --- Angular Constants ---

/// Degrees in one full revolution; the orbit phase wraps at this value.
pub const DEGREES_PER_REVOLUTION: f64 = 360.0;
/// Inclination (degrees) above which an orbit is considered retrograde.
pub const RETROGRADE_INCLINATION_THRESHOLD_DEG: f64 = 90.0;

// --- Persisted Record Keys ---

/// Key holding the counting mode (`None`, `Orbits` or `Sols`).
pub const KEY_MODE: &str = "mode";
/// Key holding the number of completed cycles.
pub const KEY_COUNT: &str = "count";
/// Key holding the simulation time at which the current cycle began.
pub const KEY_LAP_TIMESTAMP: &str = "lapTimestamp";
/// Key holding the orbit phase captured when orbit counting started.
pub const KEY_REFERENCE_PHASE: &str = "referencePhase";
/// Key holding the paused flag; only written while paused.
pub const KEY_PAUSED: &str = "paused";
/// Older name of [`KEY_LAP_TIMESTAMP`], still accepted on restore.
pub const LEGACY_KEY_TIME: &str = "time";
/// Older name of [`KEY_REFERENCE_PHASE`], still accepted on restore.
pub const LEGACY_KEY_PHASE: &str = "phase";

// --- Settings Defaults ---

/// Default on-screen duration of a counter notification, in seconds.
pub const DEFAULT_MESSAGE_DURATION_SECS: f32 = 3.0;
/// Label prefix used while counting orbits.
pub const ORBIT_LABEL_PREFIX: &str = "Orbit";
/// Label prefix used while counting sols.
pub const SOL_LABEL_PREFIX: &str = "Sol";
