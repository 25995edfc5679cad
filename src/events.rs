//! Vehicle lifecycle events and scoped subscription to the host's event bus.
//!
//! The host delivers situation and reference-body changes for every vehicle
//! to every subscriber. A [`SubscriptionGuard`] holds the registrations of one
//! tracker and releases them when it is dropped, so no exit path can leave a
//! dangling callback behind.

use std::fmt::Debug;
use std::sync::Arc;

use tracing::debug;

use crate::types::{Situation, SubscriptionId, VehicleId};

/// A vehicle moved from one flight regime to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SituationChange {
    /// Vehicle the event is about.
    pub vehicle: VehicleId,
    pub from: Situation,
    pub to: Situation,
}

/// A vehicle left one body's sphere of influence for another's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceBodyChange {
    /// Vehicle the event is about.
    pub vehicle: VehicleId,
    pub from: String,
    pub to: String,
}

/// Kinds of host notifications a tracker listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SituationChange,
    ReferenceBodyChange,
}

/// Registration interface of the host's event bus.
pub trait EventBus: Send + Sync + Debug {
    /// Registers interest of `vehicle`'s tracker in `kind` notifications.
    fn subscribe(&self, vehicle: VehicleId, kind: EventKind) -> SubscriptionId;

    /// Removes a registration. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Registrations owned by one tracker, released on drop.
#[derive(Debug)]
pub struct SubscriptionGuard {
    bus: Arc<dyn EventBus>,
    vehicle: VehicleId,
    ids: Vec<SubscriptionId>,
}

impl SubscriptionGuard {
    /// Subscribes `vehicle` to each of `kinds`.
    pub fn acquire(bus: Arc<dyn EventBus>, vehicle: VehicleId, kinds: &[EventKind]) -> Self {
        let ids = kinds
            .iter()
            .map(|&kind| bus.subscribe(vehicle, kind))
            .collect();
        debug!(%vehicle, ?kinds, "Subscribed to vehicle events");
        Self { bus, vehicle, ids }
    }

    /// Ids currently held.
    pub fn ids(&self) -> &[SubscriptionId] {
        &self.ids
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            self.bus.unsubscribe(id);
        }
        debug!(vehicle = %self.vehicle, "Unsubscribed from vehicle events");
    }
}

/// Test utilities for observing subscriptions.
pub mod mock_bus {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    /// An event bus that only records registrations.
    #[derive(Debug, Default)]
    pub struct RecordingEventBus {
        state: Mutex<BusState>,
    }

    #[derive(Debug, Default)]
    struct BusState {
        next_id: u64,
        active: Vec<(SubscriptionId, VehicleId, EventKind)>,
    }

    impl RecordingEventBus {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of live registrations for `vehicle`.
        pub fn active_for(&self, vehicle: VehicleId) -> usize {
            self.lock()
                .active
                .iter()
                .filter(|(_, v, _)| *v == vehicle)
                .count()
        }

        /// Number of live registrations across all vehicles.
        pub fn active_total(&self) -> usize {
            self.lock().active.len()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, BusState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl EventBus for RecordingEventBus {
        fn subscribe(&self, vehicle: VehicleId, kind: EventKind) -> SubscriptionId {
            let mut state = self.lock();
            state.next_id += 1;
            let id = SubscriptionId::new(state.next_id);
            state.active.push((id, vehicle, kind));
            id
        }

        fn unsubscribe(&self, id: SubscriptionId) {
            self.lock().active.retain(|(held, _, _)| *held != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock_bus::RecordingEventBus;
    use super::*;

    #[test]
    fn guard_releases_registrations_on_drop() {
        let bus = Arc::new(RecordingEventBus::new());
        let vehicle = VehicleId::new(1);
        let guard = SubscriptionGuard::acquire(
            bus.clone(),
            vehicle,
            &[EventKind::SituationChange, EventKind::ReferenceBodyChange],
        );
        assert_eq!(guard.ids().len(), 2);
        assert_eq!(bus.active_for(vehicle), 2);

        drop(guard);
        assert_eq!(bus.active_total(), 0);
    }

    #[test]
    fn guards_of_different_vehicles_are_independent() {
        let bus = Arc::new(RecordingEventBus::new());
        let first = SubscriptionGuard::acquire(
            bus.clone(),
            VehicleId::new(1),
            &[EventKind::SituationChange],
        );
        let second = SubscriptionGuard::acquire(
            bus.clone(),
            VehicleId::new(2),
            &[EventKind::SituationChange],
        );
        assert_ne!(first.ids(), second.ids());
        drop(first);
        assert_eq!(bus.active_for(VehicleId::new(1)), 0);
        assert_eq!(bus.active_for(VehicleId::new(2)), 1);
    }
}
