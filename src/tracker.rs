//! The per-vehicle orbit/sol counting state machine.
//!
//! States are `None`, counting orbits and counting sols, with an orthogonal
//! `paused` flag that only applies to sols. Transitions are driven by
//! situation changes ([`VehicleTimekeeper::on_situation_change`]) and
//! reference-body changes; progress is measured once per physics step by
//! [`VehicleTimekeeper::tick`].
//!
//! | situation entered    | effect                                                     |
//! |----------------------|------------------------------------------------------------|
//! | Orbiting             | start counting orbits unless already doing so              |
//! | Landed / Splashed    | resume paused sols, otherwise start counting sols          |
//! | Flying / Sub-orbital | pause sols, otherwise stop                                 |
//! | anything else        | stop                                                       |
//!
//! Leaving a body's sphere of influence always stops counting: orbital
//! elements and day lengths of different bodies are not comparable.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::constants::DEGREES_PER_REVOLUTION;
use crate::display::DisplayRequest;
use crate::events::{EventBus, EventKind, ReferenceBodyChange, SituationChange, SubscriptionGuard};
use crate::persistence::{KeyValueStore, PersistenceAdapter};
use crate::phase::{
    checked_period, completed_revolutions, last_crossing_time, orbit_phase, phase_advance,
    progress_from, project_phase, whole_cycles,
};
use crate::record::VehicleTimekeepingRecord;
use crate::settings::PolicyProvider;
use crate::time::SimClock;
use crate::types::{CountMode, Situation, VehicleId};
use crate::vehicle::VehicleEnvironment;

const SUBSCRIBED_EVENTS: [EventKind; 2] =
    [EventKind::SituationChange, EventKind::ReferenceBodyChange];

/// Result of one physics-step update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Orbits or sols completed during this tick.
    pub completed: u32,
    /// Requests for the notification surface, in emission order.
    pub display: Vec<DisplayRequest>,
}

/// Counting state machine bound to one vehicle.
#[derive(Debug)]
pub struct VehicleTimekeeper {
    vehicle: VehicleId,
    record: VehicleTimekeepingRecord,
    /// Simulation time of the last processed orbit tick.
    last_update: f64,
    /// Record came from a save and still needs catch-up on activation.
    restored: bool,
    clock: Arc<dyn SimClock>,
    policy: Arc<dyn PolicyProvider>,
    subscriptions: Option<SubscriptionGuard>,
}

impl VehicleTimekeeper {
    /// Creates an idle tracker for `vehicle`.
    pub fn new(
        vehicle: VehicleId,
        clock: Arc<dyn SimClock>,
        policy: Arc<dyn PolicyProvider>,
    ) -> Self {
        Self {
            vehicle,
            record: VehicleTimekeepingRecord::inactive(),
            last_update: 0.0,
            restored: false,
            clock,
            policy,
            subscriptions: None,
        }
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle
    }

    pub fn record(&self) -> &VehicleTimekeepingRecord {
        &self.record
    }

    pub fn mode(&self) -> CountMode {
        self.record.mode
    }

    pub fn count(&self) -> u32 {
        self.record.count
    }

    pub fn is_paused(&self) -> bool {
        self.record.paused
    }

    /// True while event subscriptions are held.
    pub fn is_subscribed(&self) -> bool {
        self.subscriptions.is_some()
    }

    /// Replaces the record with the one persisted in `store`.
    ///
    /// Cycles completed since the save are credited on the next [`activate`].
    /// Does nothing while the feature is disabled.
    ///
    /// [`activate`]: Self::activate
    pub fn restore(&mut self, store: &dyn KeyValueStore) {
        if !self.policy.feature_enabled() {
            return;
        }
        self.record = PersistenceAdapter::load(store, self.policy.as_ref());
        self.last_update = self.record.lap_timestamp;
        self.restored = self.record.is_counting();
        debug!(vehicle = %self.vehicle, mode = %self.record.mode, "Restored timekeeping state");
    }

    /// Writes the record into `store`; returns the number of keys written.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> usize {
        PersistenceAdapter::save(&self.record, self.policy.as_ref(), store)
    }

    /// Brings the tracker online for its vehicle.
    ///
    /// Credits cycles completed while a restored vehicle was not simulated,
    /// brings the record in line with the current situation (same table as
    /// [`on_situation_change`], except that a matching counter keeps running),
    /// subscribes to lifecycle events and returns the counter to show. Does
    /// nothing while the feature is disabled or when given another vehicle.
    ///
    /// [`on_situation_change`]: Self::on_situation_change
    pub fn activate(
        &mut self,
        vehicle: &dyn VehicleEnvironment,
        bus: Arc<dyn EventBus>,
    ) -> Option<DisplayRequest> {
        if !self.policy.feature_enabled() {
            return None;
        }
        if vehicle.id() != self.vehicle {
            debug!(
                tracker = %self.vehicle,
                vehicle = %vehicle.id(),
                "Ignoring activation with another vehicle"
            );
            return None;
        }
        let now = self.clock.now();
        if self.restored {
            self.catch_up(vehicle, now);
            self.restored = false;
        }

        match (self.record.mode, vehicle.situation()) {
            (CountMode::Orbits, Situation::Orbiting) => {}
            (CountMode::Sols, s) if s.is_surface() => {
                if self.record.paused {
                    self.resume_sols(vehicle);
                }
            }
            (CountMode::Sols, s) if s.is_suspending() => self.record.paused = true,
            (_, Situation::Orbiting) => self.start_orbits(vehicle, now),
            (_, s) if s.is_surface() => self.start_sols(vehicle, now),
            _ => self.stop(vehicle.name()),
        }

        if self.subscriptions.is_none() {
            self.subscriptions = Some(SubscriptionGuard::acquire(
                bus,
                self.vehicle,
                &SUBSCRIBED_EVENTS,
            ));
        }
        self.counter_display(vehicle)
    }

    /// Releases event subscriptions. The record is kept.
    pub fn deactivate(&mut self) {
        self.subscriptions = None;
    }

    /// Applies a situation change; returns a counter display when a counter started.
    ///
    /// Events about other vehicles are ignored.
    pub fn on_situation_change(
        &mut self,
        vehicle: &dyn VehicleEnvironment,
        event: &SituationChange,
    ) -> Option<DisplayRequest> {
        debug!(
            vehicle = vehicle.name(),
            from = %event.from,
            to = %event.to,
            "Situation change"
        );
        if event.vehicle != self.vehicle || !self.policy.feature_enabled() {
            return None;
        }
        let now = self.clock.now();
        match event.to {
            Situation::Orbiting => {
                if self.record.mode == CountMode::Orbits {
                    return None;
                }
                self.start_orbits(vehicle, now);
            }
            to if to.is_surface() => {
                if self.record.paused {
                    self.resume_sols(vehicle);
                    return None;
                }
                self.start_sols(vehicle, now);
            }
            to if to.is_suspending() => {
                if self.record.mode == CountMode::Sols {
                    self.record.paused = true;
                    debug!(vehicle = vehicle.name(), count = self.record.count, "Sol counting paused");
                } else {
                    self.stop(vehicle.name());
                }
                return None;
            }
            _ => {
                self.stop(vehicle.name());
                return None;
            }
        }
        self.counter_display(vehicle)
    }

    /// Stops counting for any reference-body change of this vehicle.
    pub fn on_reference_body_change(&mut self, event: &ReferenceBodyChange) {
        if event.vehicle != self.vehicle {
            return;
        }
        info!(
            vehicle = %self.vehicle,
            from = event.from.as_str(),
            to = event.to.as_str(),
            "Reference body changed; timekeeping reset"
        );
        self.record.stop();
    }

    /// Per physics-step update.
    ///
    /// Skipped while paused or while the feature is disabled. An unusable
    /// period or day length skips the tick without touching the record.
    pub fn tick(&mut self, vehicle: &dyn VehicleEnvironment) -> TickOutcome {
        if self.record.paused || !self.policy.feature_enabled() {
            return TickOutcome::default();
        }
        let now = self.clock.now();
        match self.record.mode {
            CountMode::None => TickOutcome::default(),
            CountMode::Orbits => self.tick_orbits(vehicle, now),
            CountMode::Sols => self.tick_sols(vehicle, now),
        }
    }

    /// Current counter label, if this is the active vehicle and it is counting.
    pub fn counter_display(&self, vehicle: &dyn VehicleEnvironment) -> Option<DisplayRequest> {
        if !vehicle.is_active() {
            debug!(vehicle = vehicle.name(), "Not displaying counter of an inactive vehicle");
            return None;
        }
        DisplayRequest::counter(
            self.vehicle,
            self.record.mode,
            self.record.count,
            self.policy.as_ref(),
        )
    }

    fn tick_orbits(&mut self, vehicle: &dyn VehicleEnvironment, now: f64) -> TickOutcome {
        let orbit = vehicle.orbit();
        let measured = checked_period("orbital period", orbit.period)
            .and_then(|period| orbit_phase(&orbit).map(|phase| (period, phase)));
        let (period, current) = match measured {
            Ok(measured) => measured,
            Err(err) => {
                debug!(vehicle = vehicle.name(), %err, "Cannot measure orbit progress this tick");
                return TickOutcome::default();
            }
        };
        let sense = orbit.rotation_sense();
        let reference = self.record.reference_phase;
        let advanced = phase_advance(
            self.record.last_phase,
            current,
            sense,
            now - self.last_update,
            period,
        );
        let completed = completed_revolutions(reference, self.record.last_phase, advanced, sense);
        self.record.last_phase = current;
        self.last_update = now;

        let mut outcome = TickOutcome {
            completed,
            display: Vec::new(),
        };
        if completed > 0 {
            self.record.count = self.record.count.saturating_add(completed);
            self.record.lap_timestamp =
                last_crossing_time(now, reference, current, sense, period);
            info!(
                vehicle = vehicle.name(),
                count = self.record.count,
                advanced,
                phase = current,
                "Orbit completed"
            );
            outcome.display.extend(self.counter_display(vehicle));
        }
        if self.policy.debug_mode() && vehicle.is_active() {
            outcome.display.push(DisplayRequest::phase_trace(
                self.vehicle,
                progress_from(reference, current, sense),
            ));
        }
        outcome
    }

    fn tick_sols(&mut self, vehicle: &dyn VehicleEnvironment, now: f64) -> TickOutcome {
        let day = match checked_period("solar day length", vehicle.solar_day_length()) {
            Ok(day) => day,
            Err(err) => {
                debug!(vehicle = vehicle.name(), %err, "Cannot measure sol progress this tick");
                return TickOutcome::default();
            }
        };
        let elapsed = now - self.record.lap_timestamp;
        let completed = whole_cycles(elapsed, day);
        if completed == 0 {
            return TickOutcome::default();
        }
        self.record.lap_timestamp += f64::from(completed) * day;
        self.record.count = self.record.count.saturating_add(completed);
        info!(
            vehicle = vehicle.name(),
            count = self.record.count,
            elapsed,
            solar_day = day,
            "Sol completed"
        );
        TickOutcome {
            completed,
            display: self.counter_display(vehicle).into_iter().collect(),
        }
    }

    /// Credits whole cycles completed between the saved lap timestamp and `now`.
    fn catch_up(&mut self, vehicle: &dyn VehicleEnvironment, now: f64) {
        let (quantity, period) = match self.record.mode {
            CountMode::None => return,
            CountMode::Orbits => ("orbital period", vehicle.orbit().period),
            CountMode::Sols => ("solar day length", vehicle.solar_day_length()),
        };
        let period = match checked_period(quantity, period) {
            Ok(period) => period,
            Err(err) => {
                warn!(vehicle = vehicle.name(), %err, "Skipping catch-up");
                if self.record.legacy_progress.take().is_some() {
                    // Saved progress cannot be placed on the orbit; restart the lap here.
                    self.rebase_reference(vehicle, now, 0.0, 1.0);
                }
                return;
            }
        };
        if let Some(progress) = self.record.legacy_progress {
            // Older saves hold the progress reached at the last update time.
            self.record.lap_timestamp -= progress / DEGREES_PER_REVOLUTION * period;
        }
        let missed = whole_cycles(now - self.record.lap_timestamp, period);
        self.record.lap_timestamp += f64::from(missed) * period;
        self.record.count = self.record.count.saturating_add(missed);
        if self.record.mode == CountMode::Orbits {
            let into_lap = now - self.record.lap_timestamp;
            if self.record.legacy_progress.take().is_some() {
                self.rebase_reference(vehicle, now, into_lap, period);
            } else {
                // Resume wrap detection from where the vehicle should be now.
                self.record.last_phase = project_phase(
                    self.record.reference_phase,
                    vehicle.orbit().rotation_sense(),
                    into_lap,
                    period,
                );
            }
            self.last_update = now;
        }
        info!(
            vehicle = vehicle.name(),
            mode = %self.record.mode,
            missed,
            count = self.record.count,
            lap = self.record.lap_timestamp,
            "Caught up on cycles completed while unloaded"
        );
    }

    /// Places the reference `into_lap` seconds of orbit behind the vehicle's current phase.
    fn rebase_reference(
        &mut self,
        vehicle: &dyn VehicleEnvironment,
        now: f64,
        into_lap: f64,
        period: f64,
    ) {
        let orbit = vehicle.orbit();
        match orbit_phase(&orbit) {
            Ok(current) => {
                self.record.reference_phase =
                    project_phase(current, orbit.rotation_sense(), -into_lap, period);
                self.record.last_phase = current;
                self.last_update = now;
                debug!(
                    vehicle = vehicle.name(),
                    reference = self.record.reference_phase,
                    phase = current,
                    "Converted saved orbit progress to a reference phase"
                );
            }
            Err(err) => {
                warn!(vehicle = vehicle.name(), %err, "Cannot convert saved orbit progress");
                self.stop(vehicle.name());
            }
        }
    }

    fn start_orbits(&mut self, vehicle: &dyn VehicleEnvironment, now: f64) {
        if !self.policy.orbit_counting_enabled() {
            self.record.stop();
            return;
        }
        let orbit = vehicle.orbit();
        match orbit_phase(&orbit) {
            Ok(phase) => {
                self.record.start_orbits(phase, now);
                self.last_update = now;
                info!(
                    vehicle = vehicle.name(),
                    at = now,
                    period = orbit.period,
                    phase,
                    "Began counting orbits"
                );
            }
            Err(err) => {
                warn!(vehicle = vehicle.name(), %err, "Cannot start counting orbits");
                self.record.stop();
            }
        }
    }

    fn start_sols(&mut self, vehicle: &dyn VehicleEnvironment, now: f64) {
        if !self.policy.sol_counting_enabled() {
            self.record.stop();
            return;
        }
        self.record.start_sols(now);
        info!(vehicle = vehicle.name(), at = now, "Began counting sols");
    }

    fn resume_sols(&mut self, vehicle: &dyn VehicleEnvironment) {
        if !self.policy.sol_counting_enabled() {
            self.record.stop();
            return;
        }
        self.record.paused = false;
        debug!(vehicle = vehicle.name(), count = self.record.count, "Sol counting resumed");
    }

    fn stop(&mut self, name: &str) {
        if self.record.is_counting() {
            debug!(vehicle = name, mode = %self.record.mode, "Timekeeping stopped");
        }
        self.record.stop();
    }
}
