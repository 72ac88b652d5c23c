//! # Dapp Ledger Runtime
//!
//! The Store runtime that serializes commands through a reducer.
//!
//! ## Core Components
//!
//! - **Store**: Owns one registry's state and journal behind a single lock
//! - **Outcome**: The reply and recorded notifications of an accepted command
//! - **Notification stream**: A broadcast of every recorded envelope, in order
//!
//! ## Concurrency Model
//!
//! Each Store is a single-writer state machine. `send` holds the write lock
//! for the whole validate → apply → record → broadcast step, so commands are
//! totally ordered and readers never observe a half-applied command (for
//! example, a new owner without its transfer event in the journal). Reads
//! take the read lock and may run concurrently with each other.
//!
//! ## Example
//!
//! ```ignore
//! use dapp_ledger_runtime::Store;
//!
//! let store = Store::new(TicketState::new(), TicketReducer::new(), env);
//!
//! let outcome = store.send(TicketCommand::Issue { event_name, issuer }).await?;
//! let owner = store.state(|s| s.get(outcome.reply).map(|t| t.owner)).await;
//! ```

use dapp_ledger_core::{
    environment::{Clock, SystemClock},
    event::Event,
    journal::{Envelope, Journal},
    reducer::Reducer,
    rejection::Rejection,
    transition::Transition,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Metrics emitted by the Store
pub mod metrics;

/// Default capacity of the per-store notification channel
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;

/// Configuration for a Store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Capacity of the notification broadcast channel
    ///
    /// Subscribers that fall further behind than this receive
    /// `RecvError::Lagged` and can catch up from the journal.
    pub notification_capacity: usize,
}

impl StoreConfig {
    /// Creates a config with the given notification capacity (minimum 1)
    #[must_use]
    pub const fn new(notification_capacity: usize) -> Self {
        Self {
            notification_capacity: if notification_capacity == 0 {
                1
            } else {
                notification_capacity
            },
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_CAPACITY)
    }
}

/// The reply and notifications produced by an accepted command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<R, E> {
    /// Value returned by the reducer
    pub reply: R,
    /// Envelopes recorded for this command, in application order
    pub notifications: Vec<Envelope<E>>,
}

/// Store runtime - serialized execution of one registry
pub mod store {
    use super::{
        Arc, Clock, Envelope, Event, Journal, Outcome, Reducer, Rejection, RwLock, StoreConfig,
        SystemClock, Transition, metrics::StoreMetrics,
    };
    use tokio::sync::broadcast;

    struct Inner<S, E> {
        state: S,
        journal: Journal<E>,
    }

    /// The Store - runtime coordinator for one registry
    ///
    /// The Store manages:
    /// 1. State and journal (behind one `RwLock`, so they never disagree)
    /// 2. Reducer (validation and transition logic)
    /// 3. Environment (injected dependencies)
    /// 4. Notification broadcast (re-delivery of recorded envelopes)
    pub struct Store<R>
    where
        R: Reducer,
    {
        inner: Arc<RwLock<Inner<R::State, R::Event>>>,
        reducer: R,
        environment: R::Environment,
        clock: Arc<dyn Clock>,
        notifications: broadcast::Sender<Envelope<R::Event>>,
    }

    impl<R> Store<R>
    where
        R: Reducer + Send + Sync + 'static,
        R::State: Send + Sync + 'static,
        R::Event: Event + Clone,
        R::Environment: Send + Sync + 'static,
        R::Error: Rejection,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses the system clock and [`StoreConfig::default`].
        #[must_use]
        pub fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new store with explicit configuration
        #[must_use]
        pub fn with_config(
            initial_state: R::State,
            reducer: R,
            environment: R::Environment,
            config: StoreConfig,
        ) -> Self {
            let (notifications, _) = broadcast::channel(config.notification_capacity);

            Self {
                inner: Arc::new(RwLock::new(Inner {
                    state: initial_state,
                    journal: Journal::new(),
                })),
                reducer,
                environment,
                clock: Arc::new(SystemClock),
                notifications,
            }
        }

        /// Rebuild a store by re-applying a journal onto an initial state
        ///
        /// The journal is kept as-is, so new commands continue its sequence.
        #[must_use]
        pub fn replay(
            initial_state: R::State,
            reducer: R,
            environment: R::Environment,
            journal: Journal<R::Event>,
            config: StoreConfig,
        ) -> Self {
            let mut state = initial_state;
            for event in journal.events() {
                R::apply(&mut state, event);
            }
            tracing::debug!(events = journal.len(), "Replayed journal");

            let (notifications, _) = broadcast::channel(config.notification_capacity);

            Self {
                inner: Arc::new(RwLock::new(Inner { state, journal })),
                reducer,
                environment,
                clock: Arc::new(SystemClock),
                notifications,
            }
        }

        /// Replace the clock used to timestamp envelopes
        #[must_use]
        pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
            self.clock = clock;
            self
        }

        /// Send a command through the reducer
        ///
        /// The write lock is held from validation until the notifications are
        /// broadcast, so the journal and the notification stream see commands
        /// in exactly the order they were applied.
        ///
        /// # Errors
        ///
        /// Returns the reducer's error when a precondition fails. State and
        /// journal are unchanged in that case.
        #[tracing::instrument(skip(self, command), name = "store_send")]
        pub async fn send(
            &self,
            command: R::Command,
        ) -> Result<Outcome<R::Reply, R::Event>, R::Error> {
            StoreMetrics::record_command();

            let mut inner = self.inner.write().await;
            let Inner { state, journal } = &mut *inner;
            tracing::trace!("Acquired write lock on state");

            let start = std::time::Instant::now();
            let result = self.reducer.reduce(state, command, &self.environment);
            StoreMetrics::record_reduce(start.elapsed());

            let Transition { reply, events } = match result {
                Ok(transition) => transition,
                Err(error) => {
                    let kind = error.kind_label();
                    StoreMetrics::record_rejection(kind);
                    tracing::debug!(kind, %error, "Command rejected");
                    return Err(error);
                }
            };

            let recorded_at = self.clock.now();
            let mut notifications = Vec::with_capacity(events.len());
            for event in events {
                notifications.push(journal.record(event, recorded_at).clone());
            }

            for envelope in &notifications {
                tracing::trace!(
                    sequence = envelope.sequence,
                    event_type = envelope.event.event_type(),
                    "Recorded event"
                );
                // No subscribers is not an error: the journal still has the envelope.
                let _ = self.notifications.send(envelope.clone());
            }

            StoreMetrics::record_events(notifications.len());
            tracing::debug!(
                recorded = notifications.len(),
                next_sequence = journal.next_sequence(),
                "Command applied"
            );

            Ok(Outcome {
                reply,
                notifications,
            })
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let valid = store.state(|s| s.verify(ticket_id)).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&R::State) -> T,
        {
            let inner = self.inner.read().await;
            f(&inner.state)
        }

        /// Read the journal via a closure
        pub async fn journal<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&Journal<R::Event>) -> T,
        {
            let inner = self.inner.read().await;
            f(&inner.journal)
        }

        /// Read state and journal together from one consistent snapshot
        pub async fn snapshot<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&R::State, &Journal<R::Event>) -> T,
        {
            let inner = self.inner.read().await;
            f(&inner.state, &inner.journal)
        }

        /// Subscribe to every envelope recorded from now on
        ///
        /// If the receiver lags it gets `RecvError::Lagged` and can resume
        /// with [`Journal::since`].
        #[must_use]
        pub fn subscribe(&self) -> broadcast::Receiver<Envelope<R::Event>> {
            self.notifications.subscribe()
        }
    }

    impl<R> std::fmt::Debug for Store<R>
    where
        R: Reducer + std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Store")
                .field("reducer", &self.reducer)
                .field("subscribers", &self.notifications.receiver_count())
                .finish_non_exhaustive()
        }
    }
}

pub use store::Store;
