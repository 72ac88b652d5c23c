//! Append-only journal of applied events.
//!
//! Every event a registry applies is recorded here, in application order,
//! wrapped in an [`Envelope`] carrying its sequence number and the time it
//! was recorded. Sequence numbers start at zero and have no gaps, so an
//! envelope's sequence is also its position in the journal.
//!
//! There is no removal or rewrite operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded event with its position and timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<E> {
    /// Position in the journal (0-based, gap-free)
    pub sequence: u64,
    /// When the event was recorded
    pub recorded_at: DateTime<Utc>,
    /// The event itself
    pub event: E,
}

/// Ordered, append-only list of envelopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal<E> {
    entries: Vec<Envelope<E>>,
}

impl<E> Journal<E> {
    /// Creates an empty journal
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an event and returns the envelope it was recorded in
    pub fn record(&mut self, event: E, recorded_at: DateTime<Utc>) -> &Envelope<E> {
        let sequence = self.next_sequence();
        self.entries.push(Envelope {
            sequence,
            recorded_at,
            event,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// The sequence number the next recorded event will receive
    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Number of recorded events
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All envelopes, oldest first
    #[must_use]
    pub fn entries(&self) -> &[Envelope<E>] {
        &self.entries
    }

    /// Envelopes with `sequence >= from`, oldest first
    ///
    /// Used by subscribers catching up after a lagged broadcast.
    #[must_use]
    pub fn since(&self, from: u64) -> &[Envelope<E>] {
        let start = usize::try_from(from).map_or(self.entries.len(), |i| i.min(self.entries.len()));
        &self.entries[start..]
    }

    /// Iterates over the recorded events without their envelopes
    pub fn events(&self) -> impl Iterator<Item = &E> {
        self.entries.iter().map(|envelope| &envelope.event)
    }
}

impl<E> Default for Journal<E> {
    fn default() -> Self {
        Self::new()
    }
}
