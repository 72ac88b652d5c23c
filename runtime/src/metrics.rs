//! Metrics emitted by the Store.
//!
//! Only the `metrics` facade is used here; installing an exporter (Prometheus
//! or otherwise) is left to the embedding application. Without a recorder
//! every call is a no-op.
//!
//! | Metric | Kind | Labels |
//! |---|---|---|
//! | `ledger.commands.total` | counter | |
//! | `ledger.commands.rejected` | counter | `kind` |
//! | `ledger.events.recorded` | counter | |
//! | `ledger.reducer.duration_seconds` | histogram | |

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Commands received by any store
pub const COMMANDS_TOTAL: &str = "ledger.commands.total";
/// Commands rejected by a reducer, labelled by failure kind
pub const COMMANDS_REJECTED: &str = "ledger.commands.rejected";
/// Envelopes appended to a journal
pub const EVENTS_RECORDED: &str = "ledger.events.recorded";
/// Time spent inside `Reducer::reduce`
pub const REDUCER_DURATION: &str = "ledger.reducer.duration_seconds";

/// Register descriptions for every store metric
///
/// Call once after installing a recorder so exporters can show help text.
pub fn describe_metrics() {
    describe_counter!(COMMANDS_TOTAL, "Total number of commands sent to a store");
    describe_counter!(
        COMMANDS_REJECTED,
        "Total number of commands rejected by a reducer"
    );
    describe_counter!(EVENTS_RECORDED, "Total number of events recorded in journals");
    describe_histogram!(REDUCER_DURATION, "Time taken to reduce a command");
}

/// Store metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record a command arriving at a store.
    pub fn record_command() {
        counter!(COMMANDS_TOTAL).increment(1);
    }

    /// Record how long the reducer took.
    pub fn record_reduce(duration: Duration) {
        histogram!(REDUCER_DURATION).record(duration.as_secs_f64());
    }

    /// Record a rejected command.
    pub fn record_rejection(kind: &'static str) {
        counter!(COMMANDS_REJECTED, "kind" => kind).increment(1);
    }

    /// Record envelopes appended to a journal.
    pub fn record_events(count: usize) {
        counter!(EVENTS_RECORDED).increment(count as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        describe_metrics();
        StoreMetrics::record_command();
        StoreMetrics::record_reduce(Duration::from_millis(1));
        StoreMetrics::record_rejection("unauthorized");
        StoreMetrics::record_events(2);
    }
}
