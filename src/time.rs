//! Simulation time abstraction, allowing for mockable clocks in testing.
//!
//! Timekeeping runs on the host's universal simulation time: continuous
//! seconds that advance with time warp and stand still while paused, so
//! the wall clock is never consulted.

use std::fmt::Debug;

/// A trait abstracting the host's simulation clock.
pub trait SimClock: Send + Sync + Debug {
    /// Current universal simulation time, in seconds.
    fn now(&self) -> f64;
}

/// Test utilities for mocking simulation time.
pub mod mock_clock {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    /// A mock clock that allows for manual control over the current time in tests.
    #[derive(Debug)]
    pub struct MockClock {
        current_time: Mutex<f64>,
    }

    impl MockClock {
        /// Creates a new `MockClock` starting at `start_time` seconds.
        pub fn new(start_time: f64) -> Self {
            Self {
                current_time: Mutex::new(start_time),
            }
        }

        /// Advances the mock clock by `seconds`.
        pub fn advance(&self, seconds: f64) {
            let mut current = self
                .current_time
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *current += seconds;
        }

        /// Sets the mock clock's current time.
        pub fn set_time(&self, new_time: f64) {
            let mut current = self
                .current_time
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *current = new_time;
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::new(0.0)
        }
    }

    impl SimClock for MockClock {
        fn now(&self) -> f64 {
            *self
                .current_time
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock_clock::MockClock;
    use super::*;

    #[test]
    fn mock_clock_advances_and_sets() {
        let clock = MockClock::new(100.0);
        assert_eq!(clock.now(), 100.0);
        clock.advance(25.5);
        assert_eq!(clock.now(), 125.5);
        clock.set_time(10.0);
        assert_eq!(clock.now(), 10.0);
    }

    #[test]
    fn mock_clock_defaults_to_epoch() {
        assert_eq!(MockClock::default().now(), 0.0);
    }
}
