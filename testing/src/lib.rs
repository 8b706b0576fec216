//! # Libris Testing
//!
//! Testing utilities and helpers for the Libris client architecture.
//!
//! This crate provides:
//! - A fixed clock for deterministic token-expiry tests
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - [`drive`], which runs a reducer's effects to completion
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use libris_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(SessionReducer::new())
//!     .with_env(test_environment())
//!     .given_state(Session::loading())
//!     .when_action(SessionAction::Initialize)
//!     .then_state(|s| assert!(!s.is_loading))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use libris_core::environment::Clock;


/// Mock implementations of core Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use libris_testing::mocks::FixedClock;
    /// use libris_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Create a fixed clock at the given Unix timestamp (seconds)
        ///
        /// Out-of-range timestamps fall back to the Unix epoch.
        #[must_use]
        pub fn at_epoch_seconds(secs: i64) -> Self {
            Self::new(DateTime::from_timestamp(secs, 0).unwrap_or_default())
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Install a `tracing` subscriber that writes to the test harness output
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions, drive};
