//! Ticket Registry.
//!
//! Issues tickets for named events, lets the current owner transfer or
//! invalidate them, and answers validity checks for anyone. Validity only
//! ever moves from valid to invalid; there is no re-validation.

use crate::allocator::IdAllocator;
use crate::environment::RegistryEnvironment;
use crate::error::{RegistryError, Role};
use crate::types::{Address, TicketId};
use dapp_ledger_core::{event::Event, reducer::Reducer, transition::Transition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single ticket
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier
    pub id: TicketId,
    /// Name of the event the ticket admits to
    pub event_name: String,
    /// Current owner
    pub owner: Address,
    /// Whether the ticket is still valid
    pub is_valid: bool,
}

/// State of the ticket registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketState {
    tickets: BTreeMap<TicketId, Ticket>,
    ids: IdAllocator,
}

impl TicketState {
    /// Creates an empty registry; the first ticket gets id 0
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tickets: BTreeMap::new(),
            ids: IdAllocator::starting_at(0),
        }
    }

    /// Returns a ticket by id
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the ticket was never issued.
    pub fn get(&self, ticket_id: TicketId) -> Result<&Ticket, RegistryError> {
        self.tickets
            .get(&ticket_id)
            .ok_or(RegistryError::NotFound { ticket_id })
    }

    /// Returns the current validity flag of a ticket
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the ticket was never issued.
    pub fn verify(&self, ticket_id: TicketId) -> Result<bool, RegistryError> {
        self.get(ticket_id).map(|ticket| ticket.is_valid)
    }

    /// The id the next issued ticket will receive
    #[must_use]
    pub const fn next_ticket_id(&self) -> TicketId {
        TicketId::new(self.ids.position())
    }

    /// Number of tickets ever issued
    #[must_use]
    pub fn count(&self) -> usize {
        self.tickets.len()
    }

    /// Tickets currently owned by `owner`, in id order
    pub fn owned_by(&self, owner: Address) -> impl Iterator<Item = &Ticket> {
        self.tickets.values().filter(move |ticket| ticket.owner == owner)
    }
}

impl Default for TicketState {
    fn default() -> Self {
        Self::new()
    }
}

/// Commands accepted by the ticket registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketCommand {
    /// Issue a new ticket owned by the issuer (permissionless)
    Issue {
        /// Event name, must be non-empty
        event_name: String,
        /// Caller, becomes the owner
        issuer: Address,
    },

    /// Hand a ticket to a new owner
    Transfer {
        /// Ticket to transfer
        ticket_id: TicketId,
        /// Recipient, must not be the zero address
        new_owner: Address,
        /// Caller, must be the current owner
        caller: Address,
    },

    /// Mark a ticket invalid
    Invalidate {
        /// Ticket to invalidate
        ticket_id: TicketId,
        /// Caller, must be the current owner
        caller: Address,
    },
}

/// Notifications emitted by the ticket registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketEvent {
    /// A ticket was issued
    TicketIssued {
        /// New ticket id
        id: TicketId,
        /// Event name
        event_name: String,
        /// Issuer and first owner
        owner: Address,
    },

    /// A ticket changed hands
    TicketTransferred {
        /// Ticket id
        id: TicketId,
        /// Previous owner
        from: Address,
        /// New owner
        to: Address,
    },

    /// A ticket was invalidated (emitted again for already-invalid tickets)
    TicketInvalidated {
        /// Ticket id
        id: TicketId,
        /// Owner who invalidated it
        by: Address,
    },
}

impl Event for TicketEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::TicketIssued { .. } => "TicketIssued.v1",
            Self::TicketTransferred { .. } => "TicketTransferred.v1",
            Self::TicketInvalidated { .. } => "TicketInvalidated.v1",
        }
    }
}

/// Reducer for the ticket registry
#[derive(Clone, Debug, Default)]
pub struct TicketReducer;

impl TicketReducer {
    /// Creates a new `TicketReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Looks up a ticket and checks the caller owns it
    fn owned_ticket(
        state: &TicketState,
        ticket_id: TicketId,
        caller: Address,
    ) -> Result<&Ticket, RegistryError> {
        let ticket = state.get(ticket_id)?;
        if ticket.owner != caller {
            tracing::warn!(%ticket_id, %caller, owner = %ticket.owner, "Caller does not own ticket");
            return Err(RegistryError::Unauthorized {
                caller,
                required: Role::TicketOwner(ticket_id),
            });
        }
        Ok(ticket)
    }

    /// Applies an event to state
    fn apply_event(state: &mut TicketState, event: &TicketEvent) {
        match event {
            TicketEvent::TicketIssued {
                id,
                event_name,
                owner,
            } => {
                state.tickets.insert(
                    *id,
                    Ticket {
                        id: *id,
                        event_name: event_name.clone(),
                        owner: *owner,
                        is_valid: true,
                    },
                );
                state.ids.commit(id.value());
            }
            TicketEvent::TicketTransferred { id, to, .. } => {
                if let Some(ticket) = state.tickets.get_mut(id) {
                    ticket.owner = *to;
                }
            }
            TicketEvent::TicketInvalidated { id, .. } => {
                if let Some(ticket) = state.tickets.get_mut(id) {
                    ticket.is_valid = false;
                }
            }
        }
    }
}

impl Reducer for TicketReducer {
    type State = TicketState;
    type Command = TicketCommand;
    type Event = TicketEvent;
    type Reply = TicketId;
    type Error = RegistryError;
    type Environment = RegistryEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<Transition<TicketId, TicketEvent>, RegistryError> {
        let event = match command {
            TicketCommand::Issue { event_name, issuer } => {
                env.check_label("Event name", &event_name)?;
                let id = state
                    .ids
                    .peek()
                    .ok_or_else(|| RegistryError::invalid("Ticket id space exhausted"))?;

                TicketEvent::TicketIssued {
                    id: TicketId::new(id),
                    event_name,
                    owner: issuer,
                }
            }

            TicketCommand::Transfer {
                ticket_id,
                new_owner,
                caller,
            } => {
                let ticket = Self::owned_ticket(state, ticket_id, caller)?;
                if new_owner.is_zero() {
                    return Err(RegistryError::invalid(
                        "Cannot transfer a ticket to the zero address",
                    ));
                }

                TicketEvent::TicketTransferred {
                    id: ticket_id,
                    from: ticket.owner,
                    to: new_owner,
                }
            }

            TicketCommand::Invalidate { ticket_id, caller } => {
                let ticket = Self::owned_ticket(state, ticket_id, caller)?;
                if !ticket.is_valid {
                    tracing::debug!(%ticket_id, "Ticket already invalid, recording again");
                }

                TicketEvent::TicketInvalidated {
                    id: ticket_id,
                    by: caller,
                }
            }
        };

        let reply = match &event {
            TicketEvent::TicketIssued { id, .. }
            | TicketEvent::TicketTransferred { id, .. }
            | TicketEvent::TicketInvalidated { id, .. } => *id,
        };

        Self::apply_event(state, &event);
        Ok(Transition::emit(reply, event))
    }

    fn apply(state: &mut Self::State, event: &Self::Event) {
        Self::apply_event(state, event);
    }
}
