//! Per-vehicle tracker management.
//!
//! This module provides a `TimekeeperRegistry` that owns one
//! [`VehicleTimekeeper`] per vehicle, routes host events to the tracker of the
//! vehicle they concern, and tears trackers down (releasing their event
//! subscriptions) when vehicles are destroyed.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::display::DisplayRequest;
use crate::error::TimekeeperError;
use crate::events::{EventBus, ReferenceBodyChange, SituationChange};
use crate::persistence::KeyValueStore;
use crate::settings::PolicyProvider;
use crate::time::SimClock;
use crate::tracker::{TickOutcome, VehicleTimekeeper};
use crate::types::VehicleId;
use crate::vehicle::VehicleEnvironment;

/// Owns the trackers of every known vehicle, indexed by vehicle id.
///
/// Trackers share the registry's clock, policy provider and event bus. No
/// state is shared between trackers.
#[derive(Debug)]
pub struct TimekeeperRegistry {
    trackers: HashMap<VehicleId, VehicleTimekeeper>,
    clock: Arc<dyn SimClock>,
    policy: Arc<dyn PolicyProvider>,
    bus: Arc<dyn EventBus>,
}

impl TimekeeperRegistry {
    /// Creates an empty registry.
    pub fn new(
        clock: Arc<dyn SimClock>,
        policy: Arc<dyn PolicyProvider>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            trackers: HashMap::new(),
            clock,
            policy,
            bus,
        }
    }

    /// Tracker for `vehicle`, created idle on first use.
    pub fn track(&mut self, vehicle: VehicleId) -> &mut VehicleTimekeeper {
        let clock = &self.clock;
        let policy = &self.policy;
        self.trackers
            .entry(vehicle)
            .or_insert_with(|| VehicleTimekeeper::new(vehicle, clock.clone(), policy.clone()))
    }

    /// Restores `vehicle`'s record from its persisted key/value node.
    pub fn restore(&mut self, vehicle: VehicleId, store: &dyn KeyValueStore) {
        self.track(vehicle).restore(store);
    }

    /// Activates the tracker of `vehicle`, creating it if needed.
    pub fn activate(&mut self, vehicle: &dyn VehicleEnvironment) -> Option<DisplayRequest> {
        let bus = self.bus.clone();
        self.track(vehicle.id()).activate(vehicle, bus)
    }

    /// Writes `vehicle`'s record into `store`.
    ///
    /// # Returns
    /// The number of keys written.
    ///
    /// # Errors
    /// - [`TimekeeperError::UnknownVehicle`] - No tracker exists for the vehicle
    pub fn save(
        &self,
        vehicle: VehicleId,
        store: &mut dyn KeyValueStore,
    ) -> Result<usize, TimekeeperError> {
        Ok(self.get(vehicle)?.save(store))
    }

    /// Per physics-step update of one vehicle.
    ///
    /// # Errors
    /// - [`TimekeeperError::UnknownVehicle`] - No tracker exists for the vehicle
    pub fn tick(&mut self, vehicle: &dyn VehicleEnvironment) -> Result<TickOutcome, TimekeeperError> {
        Ok(self.get_mut(vehicle.id())?.tick(vehicle))
    }

    /// Routes a situation change to the tracker of the vehicle it concerns.
    ///
    /// Events for untracked vehicles are dropped.
    pub fn dispatch_situation_change(
        &mut self,
        vehicle: &dyn VehicleEnvironment,
        event: &SituationChange,
    ) -> Option<DisplayRequest> {
        match self.trackers.get_mut(&event.vehicle) {
            Some(tracker) => tracker.on_situation_change(vehicle, event),
            None => {
                debug!(vehicle = %event.vehicle, "Situation change for untracked vehicle");
                None
            }
        }
    }

    /// Routes a reference-body change to the tracker of the vehicle it concerns.
    pub fn dispatch_reference_body_change(&mut self, event: &ReferenceBodyChange) {
        if let Some(tracker) = self.trackers.get_mut(&event.vehicle) {
            tracker.on_reference_body_change(event);
        }
    }

    /// # Errors
    /// - [`TimekeeperError::UnknownVehicle`] - No tracker exists for the vehicle
    pub fn get(&self, vehicle: VehicleId) -> Result<&VehicleTimekeeper, TimekeeperError> {
        self.trackers
            .get(&vehicle)
            .ok_or(TimekeeperError::UnknownVehicle(vehicle.into()))
    }

    /// # Errors
    /// - [`TimekeeperError::UnknownVehicle`] - No tracker exists for the vehicle
    pub fn get_mut(
        &mut self,
        vehicle: VehicleId,
    ) -> Result<&mut VehicleTimekeeper, TimekeeperError> {
        self.trackers
            .get_mut(&vehicle)
            .ok_or(TimekeeperError::UnknownVehicle(vehicle.into()))
    }

    /// Removes a destroyed vehicle's tracker, releasing its subscriptions.
    pub fn remove(&mut self, vehicle: VehicleId) -> Option<VehicleTimekeeper> {
        self.trackers.remove(&vehicle)
    }

    /// Number of tracked vehicles.
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Ids of all tracked vehicles, in no particular order.
    pub fn vehicle_ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.trackers.keys().copied()
    }
}
