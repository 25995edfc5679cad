//! `timekeeper`: orbit and sol counting for simulated vehicles.
//!
//! For every vehicle the host simulates, this library counts completed orbits
//! while the vehicle is orbiting and completed solar days (sols) while it is
//! landed or splashed down. Counts survive save/load cycles, vehicle switching
//! and long stretches of being unloaded.
//!
//! ## Core Concepts
//!
//! - **[`VehicleTimekeeper`]**: The counting state machine of one vehicle.
//!   Lifecycle events and per-physics-step ticks flow in; count changes flow
//!   out as [`DisplayRequest`]s and `tracing` records.
//! - **[`PersistenceAdapter`]**: Converts a [`VehicleTimekeepingRecord`] to and
//!   from the host's flat key/value save node.
//! - **[`orbit_phase`]**: Pure orbit-phase computation used for wrap detection.
//! - **[`TimekeeperRegistry`]**: Owns one tracker per vehicle and routes events.
//!
//! The host supplies the collaborators: a [`SimClock`], a [`PolicyProvider`]
//! (for example [`TimekeeperSettings`]), an [`EventBus`] and a
//! [`VehicleEnvironment`] per vehicle.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use timekeeper::events::mock_bus::RecordingEventBus;
//! use timekeeper::time::mock_clock::MockClock;
//! use timekeeper::{
//!     OrbitalElements, Situation, TimekeeperRegistry, TimekeeperSettings, VehicleId,
//!     VehicleSnapshot,
//! };
//!
//! let clock = Arc::new(MockClock::new(0.0));
//! let mut registry = TimekeeperRegistry::new(
//!     clock.clone(),
//!     Arc::new(TimekeeperSettings::default()),
//!     Arc::new(RecordingEventBus::new()),
//! );
//!
//! let probe = VehicleSnapshot::new(VehicleId::new(1), "Probe", Situation::Orbiting)
//!     .with_orbit(OrbitalElements::circular(600.0, 0.0, 0.0));
//! let shown = registry.activate(&probe);
//! assert_eq!(shown.map(|d| d.label).as_deref(), Some("Orbit 1"));
//!
//! // One full period later the vehicle is back at its starting phase.
//! clock.advance(600.0);
//! let outcome = registry.tick(&probe).expect("vehicle is tracked");
//! assert_eq!(outcome.completed, 1);
//!
//! let mut node: BTreeMap<String, String> = BTreeMap::new();
//! registry.save(probe.id, &mut node).expect("vehicle is tracked");
//! assert_eq!(node["mode"], "Orbits");
//! ```

pub mod constants;
pub mod display;
pub mod error;
pub mod events;
pub mod persistence;
pub mod phase;
pub mod record;
pub mod registry;
pub mod settings;
pub mod time;
pub mod tracker;
pub mod types;
pub mod vehicle;

pub use display::{DisplayKind, DisplayRequest};
pub use error::TimekeeperError;
pub use events::{EventBus, EventKind, ReferenceBodyChange, SituationChange, SubscriptionGuard};
pub use persistence::{KeyValueStore, PersistenceAdapter};
pub use phase::{OrbitalElements, RotationSense, orbit_phase};
pub use record::VehicleTimekeepingRecord;
pub use registry::TimekeeperRegistry;
pub use settings::{PolicyProvider, TimekeeperSettings};
pub use time::SimClock;
pub use time::mock_clock::MockClock;
pub use tracker::{TickOutcome, VehicleTimekeeper};
pub use types::{CountMode, Situation, SubscriptionId, VehicleId};
pub use vehicle::{VehicleEnvironment, VehicleSnapshot};
