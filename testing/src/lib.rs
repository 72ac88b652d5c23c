//! # Dapp Ledger Testing
//!
//! Testing utilities and helpers for dapp ledger registries.
//!
//! This crate provides:
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Deterministic clocks
//! - `proptest` strategies for account bytes, amounts and labels
//! - A one-line tracing setup for tests that want log output
//!
//! ## Example
//!
//! ```ignore
//! use dapp_ledger_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(TicketReducer::new())
//!     .with_env(RegistryEnvironment::default())
//!     .given_state(TicketState::new())
//!     .when_command(TicketCommand::Issue { event_name: "Concert A".into(), issuer })
//!     .then_reply(|id| assert_eq!(*id, TicketId::new(0)))
//!     .then_events(|events| assertions::assert_events_count(events, 1))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use dapp_ledger_core::environment::Clock;


/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making envelopes reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use dapp_ledger_testing::mocks::FixedClock;
    /// use dapp_ledger_core::environment::Clock;
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
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::from_timestamp(1_735_689_600, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        )
    }
}

/// Property-based testing strategies
///
/// Domain crates wrap these raw values in their own newtypes, so the
/// strategies here stay free of domain types.
pub mod properties {
    use proptest::prelude::*;

    /// Raw 20-byte account ids, never all zero
    pub fn account_bytes() -> impl Strategy<Value = [u8; 20]> {
        any::<[u8; 20]>().prop_filter("zero account is the null identity", |bytes| {
            bytes.iter().any(|b| *b != 0)
        })
    }

    /// A small pool of distinct account ids, indexed `0..size`
    ///
    /// Byte 19 is `index + 1`, so accounts from the pool are distinct and never zero.
    #[must_use]
    pub fn pooled_account(index: u8) -> [u8; 20] {
        let mut bytes = [0_u8; 20];
        bytes[0] = 0xAA;
        bytes[19] = index.wrapping_add(1);
        bytes
    }

    /// Positive amounts small enough that long sequences never overflow
    pub fn positive_amount() -> impl Strategy<Value = u128> {
        1_u128..=1_000_000_000_000_000_000
    }

    /// Non-empty printable labels such as event or candidate names
    pub fn label() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,31}"
    }
}

/// Install a test-friendly tracing subscriber (idempotent)
///
/// Honors `RUST_LOG`; output is captured by the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
