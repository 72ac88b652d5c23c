//! Event trait for registry notifications.
//!
//! Events represent facts about state transitions that already happened. They
//! are immutable, carry everything needed to re-apply them, and name
//! themselves with a stable, versioned type identifier so the boundary layer
//! can route them without inspecting their shape.
//!
//! # Example
//!
//! ```
//! use dapp_ledger_core::event::Event;
//!
//! #[derive(Clone, Debug)]
//! enum TicketEvent {
//!     TicketIssued { id: u64 },
//!     TicketTransferred { id: u64 },
//! }
//!
//! impl Event for TicketEvent {
//!     fn event_type(&self) -> &'static str {
//!         match self {
//!             TicketEvent::TicketIssued { .. } => "TicketIssued.v1",
//!             TicketEvent::TicketTransferred { .. } => "TicketTransferred.v1",
//!         }
//!     }
//! }
//!
//! assert_eq!(TicketEvent::TicketIssued { id: 0 }.event_type(), "TicketIssued.v1");
//! ```

/// A notification emitted by a registry after a successful command.
///
/// # Event Naming Convention
///
/// `event_type()` returns a stable identifier with a version suffix, e.g.
/// `"Donated.v1"`. Bump the suffix when the event's shape changes.
///
/// # Thread Safety
///
/// Events are broadcast to subscribers on other tasks, so they must be
/// `Send + Sync + 'static`.
pub trait Event: Send + Sync + 'static {
    /// Returns the versioned event type identifier.
    fn event_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    enum TestEvent {
        Opened,
        Closed,
    }

    impl Event for TestEvent {
        fn event_type(&self) -> &'static str {
            match self {
                Self::Opened => "Opened.v1",
                Self::Closed => "Closed.v1",
            }
        }
    }

    #[test]
    fn event_type_returns_correct_identifier() {
        assert_eq!(TestEvent::Opened.event_type(), "Opened.v1");
        assert_eq!(TestEvent::Closed.event_type(), "Closed.v1");
    }
}
