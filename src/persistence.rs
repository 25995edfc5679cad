//! Save/restore of timekeeping records through the host's key/value save format.
//!
//! Restores are best effort: save files may come from older versions or be
//! hand-edited, so every missing or malformed value falls back to a default
//! instead of failing the vehicle's restore.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::constants::{
    KEY_COUNT, KEY_LAP_TIMESTAMP, KEY_MODE, KEY_PAUSED, KEY_REFERENCE_PHASE, LEGACY_KEY_PHASE,
    LEGACY_KEY_TIME,
};
use crate::phase::normalize_degrees;
use crate::record::VehicleTimekeepingRecord;
use crate::settings::PolicyProvider;
use crate::types::CountMode;

/// A flat key/value record embedded in the host's save file.
///
/// Implementors only supply raw string access; the typed getters never fail
/// and return the caller's default for missing or unparseable values.
pub trait KeyValueStore {
    /// Raw value stored under `key`.
    fn get_value(&self, key: &str) -> Option<&str>;

    /// Stores `value` under `key`, replacing any previous value.
    fn add_value(&mut self, key: &str, value: String);

    fn has_value(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }

    /// Finite float under `key`, or `default`.
    fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.get_value(key)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(default)
    }

    /// Non-negative integer under `key`, or `default`.
    fn get_u32(&self, key: &str, default: u32) -> u32 {
        self.get_value(key)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(default)
    }

    /// Boolean under `key` (`true`/`false`, any case), or `default`.
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get_value(key).map(str::trim) {
            Some(raw) if raw.eq_ignore_ascii_case("true") => true,
            Some(raw) if raw.eq_ignore_ascii_case("false") => false,
            _ => default,
        }
    }
}

impl KeyValueStore for BTreeMap<String, String> {
    fn get_value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn add_value(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

impl KeyValueStore for HashMap<String, String> {
    fn get_value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn add_value(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

/// Converts records to and from the persisted key/value form.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersistenceAdapter;

impl PersistenceAdapter {
    /// Writes `record` into `store`.
    ///
    /// Nothing is written while not counting or while the feature is disabled.
    /// `referencePhase` is written only for orbits and `paused` only when set.
    ///
    /// # Returns
    /// The number of keys written.
    pub fn save(
        record: &VehicleTimekeepingRecord,
        policy: &dyn PolicyProvider,
        store: &mut dyn KeyValueStore,
    ) -> usize {
        if record.mode == CountMode::None || !policy.feature_enabled() {
            return 0;
        }
        store.add_value(KEY_MODE, record.mode.to_string());
        store.add_value(KEY_COUNT, record.count.to_string());
        let mut written = 3;
        match (record.mode, record.legacy_progress) {
            // Not yet activated since an older save was loaded: write it back unchanged.
            (CountMode::Orbits, Some(progress)) => {
                store.add_value(LEGACY_KEY_TIME, record.lap_timestamp.to_string());
                store.add_value(LEGACY_KEY_PHASE, progress.to_string());
                written += 1;
            }
            (CountMode::Orbits, None) => {
                store.add_value(KEY_LAP_TIMESTAMP, record.lap_timestamp.to_string());
                store.add_value(KEY_REFERENCE_PHASE, record.reference_phase.to_string());
                written += 1;
            }
            _ => store.add_value(KEY_LAP_TIMESTAMP, record.lap_timestamp.to_string()),
        }
        if record.paused {
            store.add_value(KEY_PAUSED, true.to_string());
            written += 1;
        }
        debug!(mode = %record.mode, count = record.count, keys = written, "Saved timekeeping record");
        written
    }

    /// Reads a record from `store`.
    ///
    /// An unknown or missing mode, or a mode whose counter is disabled by
    /// `policy`, yields an inactive record. Other fields are only read for an
    /// active mode and default to zero/false. Older `time`/`phase` keys are
    /// accepted when the current names are absent. For orbits those hold the
    /// last update time and the progress (degrees) reached by then; the
    /// progress is kept in [`VehicleTimekeepingRecord::legacy_progress`] until
    /// activation can place it on the current orbit.
    pub fn load(store: &dyn KeyValueStore, policy: &dyn PolicyProvider) -> VehicleTimekeepingRecord {
        let mode = match store.get_value(KEY_MODE) {
            None => CountMode::None,
            Some(raw) => raw.parse::<CountMode>().unwrap_or_else(|err| {
                warn!(%err, "Discarding persisted timekeeping state");
                CountMode::None
            }),
        };
        let allowed = match mode {
            CountMode::None => false,
            CountMode::Orbits => policy.orbit_counting_enabled(),
            CountMode::Sols => policy.sol_counting_enabled(),
        };
        if !allowed {
            if mode != CountMode::None {
                warn!(%mode, "Counter disabled since the record was saved; not restoring it");
            }
            return VehicleTimekeepingRecord::inactive();
        }

        let lap_key = if store.has_value(KEY_LAP_TIMESTAMP) {
            KEY_LAP_TIMESTAMP
        } else {
            LEGACY_KEY_TIME
        };
        let mut record = VehicleTimekeepingRecord {
            mode,
            count: store.get_u32(KEY_COUNT, 0),
            lap_timestamp: store.get_f64(lap_key, 0.0),
            ..VehicleTimekeepingRecord::inactive()
        };
        match mode {
            CountMode::Orbits if is_legacy_orbit_save(store) => {
                let progress = store.get_f64(LEGACY_KEY_PHASE, 0.0).max(0.0);
                record.legacy_progress = Some(progress);
                debug!(progress, "Loaded orbit progress from an older save");
            }
            CountMode::Orbits => {
                record.reference_phase =
                    normalize_degrees(store.get_f64(KEY_REFERENCE_PHASE, 0.0));
                record.last_phase = record.reference_phase;
            }
            CountMode::Sols => record.paused = store.get_bool(KEY_PAUSED, false),
            CountMode::None => {}
        }
        debug!(%mode, count = record.count, lap = record.lap_timestamp, "Loaded timekeeping record");
        record
    }
}

/// An orbit save written before lap timestamps and reference phases were kept.
fn is_legacy_orbit_save(store: &dyn KeyValueStore) -> bool {
    !store.has_value(KEY_LAP_TIMESTAMP)
        && !store.has_value(KEY_REFERENCE_PHASE)
        && (store.has_value(LEGACY_KEY_TIME) || store.has_value(LEGACY_KEY_PHASE))
}
