//! # Dapp Ledger Core
//!
//! Core traits and types for deterministic, role-gated ledger registries.
//!
//! A registry is a single-writer state machine. Every call is a typed command
//! that is validated against the current state, turned into zero or more
//! events, and applied. Events are the only way state changes, so a registry
//! can always be rebuilt by replaying its journal.
//!
//! ## Core Concepts
//!
//! - **State**: The records a registry owns
//! - **Command**: A closed set of typed requests a registry accepts
//! - **Event**: An immutable fact emitted by a successful command
//! - **Reducer**: `(State, Command, Environment) → Result<(Reply, Events), Error>`
//! - **Environment**: Injected dependencies and limits
//! - **Journal**: Append-only, sequence-numbered record of applied events
//!
//! ## Architecture Principles
//!
//! - Validate first, mutate second: a rejected command never touches state
//! - Events are applied through one function, for live calls and for replay
//! - No callbacks into caller-supplied code during a state transition
//!
//! ## Example
//!
//! ```ignore
//! use dapp_ledger_core::{reducer::Reducer, transition::Transition};
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Command = CounterCommand;
//!     type Event = CounterEvent;
//!     type Reply = u64;
//!     type Error = CounterError;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         command: CounterCommand,
//!         _env: &(),
//!     ) -> Result<Transition<u64, CounterEvent>, CounterError> {
//!         let event = CounterEvent::Incremented { to: state.count + 1 };
//!         Self::apply(state, &event);
//!         Ok(Transition::emit(state.count, event))
//!     }
//!
//!     fn apply(state: &mut CounterState, event: &CounterEvent) {
//!         match event {
//!             CounterEvent::Incremented { to } => state.count = *to,
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Event trait for notifications emitted by registries
pub mod event;

/// Append-only journal of applied events
pub mod journal;

/// Reducer module - The core trait for registry logic
///
/// Reducers are deterministic functions:
/// `(State, Command, Environment) → Result<Transition, Error>`
///
/// They contain all validation and state-transition logic and never perform I/O.
pub mod reducer {
    use super::transition::Transition;

    /// The Reducer trait - core abstraction for registry logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The records this reducer owns
    /// - `Command`: The closed set of requests this reducer accepts
    /// - `Event`: The notifications a successful command emits
    /// - `Reply`: The value returned to the caller on success
    /// - `Error`: The typed failure returned on rejection
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Contract
    ///
    /// `reduce` must leave `state` untouched when it returns `Err`, and every
    /// mutation it performs must go through [`Reducer::apply`] with one of the
    /// events it returns. That keeps live state and replayed state identical.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The command type this reducer processes
        type Command;

        /// The event type this reducer emits and replays
        type Event;

        /// The reply returned to the caller on success
        type Reply;

        /// The failure returned to the caller on rejection
        type Error;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce a command into a reply and the events it produced
        ///
        /// This is a pure function that:
        /// 1. Validates the command against current state
        /// 2. Derives the events describing the change
        /// 3. Applies those events to state
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` when a precondition fails. State is unchanged.
        fn reduce(
            &self,
            state: &mut Self::State,
            command: Self::Command,
            env: &Self::Environment,
        ) -> Result<Transition<Self::Reply, Self::Event>, Self::Error>;

        /// Apply a single event to state
        ///
        /// Used by `reduce` for live commands and by the runtime for replay.
        /// Events are facts, so application never fails.
        fn apply(state: &mut Self::State, event: &Self::Event);
    }
}

/// Rejection module - Classifying typed failures
pub mod rejection {
    /// A reducer failure that can be grouped by kind
    ///
    /// The runtime uses the kind as a low-cardinality label for logs and metrics;
    /// the `Display` output carries the full context.
    pub trait Rejection: std::error::Error {
        /// Stable, lowercase name of the failure kind (e.g. `"unauthorized"`)
        fn kind_label(&self) -> &'static str;
    }
}

/// Transition module - The result of an accepted command
pub mod transition {
    use smallvec::SmallVec;

    /// Events produced by a single command
    ///
    /// Almost every command emits exactly one event, so two inline slots keep
    /// the common path allocation-free.
    pub type Events<E> = SmallVec<[E; 2]>;

    /// The outcome of an accepted command: a reply plus the emitted events
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Transition<R, E> {
        /// Value returned to the caller
        pub reply: R,
        /// Events applied to state, in order
        pub events: Events<E>,
    }

    impl<R, E> Transition<R, E> {
        /// A transition that emitted a single event
        #[must_use]
        pub fn emit(reply: R, event: E) -> Self {
            let mut events = SmallVec::new();
            events.push(event);
            Self { reply, events }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use dapp_ledger_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time from the operating system
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
