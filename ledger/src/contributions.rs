//! Contribution Ledger.
//!
//! Anyone may donate to a pooled balance and apply for a scholarship; only
//! the administrator fixed at construction may release funds. The balance
//! always equals total donations minus total releases.

use crate::environment::RegistryEnvironment;
use crate::error::{RegistryError, Role};
use crate::types::{Address, Amount};
use dapp_ledger_core::{event::Event, reducer::Reducer, transition::Transition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// State of the contribution ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionState {
    administrator: Address,
    balance: Amount,
    total_donations: Amount,
    applicants: BTreeSet<Address>,
}

impl ContributionState {
    /// Creates an empty ledger administered by `administrator`
    #[must_use]
    pub const fn new(administrator: Address) -> Self {
        Self {
            administrator,
            balance: Amount::ZERO,
            total_donations: Amount::ZERO,
            applicants: BTreeSet::new(),
        }
    }

    /// The address allowed to release funds
    #[must_use]
    pub const fn administrator(&self) -> Address {
        self.administrator
    }

    /// Funds currently held
    #[must_use]
    pub const fn balance(&self) -> Amount {
        self.balance
    }

    /// Sum of every donation ever accepted
    #[must_use]
    pub const fn total_donations(&self) -> Amount {
        self.total_donations
    }

    /// Sum of every release ever made
    #[must_use]
    pub const fn total_released(&self) -> Amount {
        self.total_donations.saturating_sub(self.balance)
    }

    /// Whether `applicant` has applied
    #[must_use]
    pub fn has_applied(&self, applicant: Address) -> bool {
        self.applicants.contains(&applicant)
    }

    /// Number of distinct applicants
    #[must_use]
    pub fn applicant_count(&self) -> usize {
        self.applicants.len()
    }
}

/// Commands accepted by the contribution ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionCommand {
    /// Add funds to the pool
    Donate {
        /// Amount attached to the call, must be positive
        amount: Amount,
        /// Caller
        donor: Address,
    },

    /// Register as a scholarship applicant
    Apply {
        /// Caller
        applicant: Address,
    },

    /// Pay out part of the pool (administrator only)
    ReleaseFunds {
        /// Who receives the funds
        recipient: Address,
        /// Amount to release, must be positive and at most the balance
        amount: Amount,
        /// Caller, must be the administrator
        caller: Address,
    },
}

/// Notifications emitted by the contribution ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionEvent {
    /// Funds were donated
    Donated {
        /// Donor
        donor: Address,
        /// Amount donated
        amount: Amount,
    },

    /// Someone applied for a scholarship
    Applied {
        /// Applicant
        applicant: Address,
    },

    /// Funds were released to a recipient
    FundsReleased {
        /// Recipient
        recipient: Address,
        /// Amount released
        amount: Amount,
    },
}

impl Event for ContributionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::Donated { .. } => "Donated.v1",
            Self::Applied { .. } => "Applied.v1",
            Self::FundsReleased { .. } => "FundsReleased.v1",
        }
    }
}

/// Reducer for the contribution ledger
///
/// Replies with the balance after the command.
#[derive(Clone, Debug, Default)]
pub struct ContributionReducer;

impl ContributionReducer {
    /// Creates a new `ContributionReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_donation(state: &ContributionState, amount: Amount) -> Result<(), RegistryError> {
        if amount.is_zero() {
            return Err(RegistryError::invalid("Donation amount must be positive"));
        }
        if state.total_donations.checked_add(amount).is_none() {
            return Err(RegistryError::invalid(
                "Donation would overflow the ledger's total",
            ));
        }
        Ok(())
    }

    /// Checks in order: caller role, arguments, then available balance
    fn validate_release(
        state: &ContributionState,
        recipient: Address,
        amount: Amount,
        caller: Address,
    ) -> Result<(), RegistryError> {
        if caller != state.administrator {
            tracing::warn!(%caller, "Non-administrator tried to release funds");
            return Err(RegistryError::Unauthorized {
                caller,
                required: Role::Administrator,
            });
        }
        if amount.is_zero() {
            return Err(RegistryError::invalid("Release amount must be positive"));
        }
        if recipient.is_zero() {
            return Err(RegistryError::invalid(
                "Cannot release funds to the zero address",
            ));
        }
        if amount > state.balance {
            return Err(RegistryError::InsufficientFunds {
                requested: amount,
                available: state.balance,
            });
        }
        Ok(())
    }

    /// Applies an event to state
    fn apply_event(state: &mut ContributionState, event: &ContributionEvent) {
        match event {
            ContributionEvent::Donated { amount, .. } => {
                state.balance = state.balance.saturating_add(*amount);
                state.total_donations = state.total_donations.saturating_add(*amount);
            }
            ContributionEvent::Applied { applicant } => {
                state.applicants.insert(*applicant);
            }
            ContributionEvent::FundsReleased { amount, .. } => {
                state.balance = state.balance.saturating_sub(*amount);
            }
        }
    }
}

impl Reducer for ContributionReducer {
    type State = ContributionState;
    type Command = ContributionCommand;
    type Event = ContributionEvent;
    type Reply = Amount;
    type Error = RegistryError;
    type Environment = RegistryEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        command: Self::Command,
        _env: &Self::Environment,
    ) -> Result<Transition<Amount, ContributionEvent>, RegistryError> {
        let event = match command {
            ContributionCommand::Donate { amount, donor } => {
                Self::validate_donation(state, amount)?;
                ContributionEvent::Donated { donor, amount }
            }

            ContributionCommand::Apply { applicant } => {
                if state.has_applied(applicant) {
                    return Err(RegistryError::AlreadyApplied { applicant });
                }
                ContributionEvent::Applied { applicant }
            }

            ContributionCommand::ReleaseFunds {
                recipient,
                amount,
                caller,
            } => {
                Self::validate_release(state, recipient, amount, caller)?;
                tracing::info!(%recipient, %amount, "Releasing funds");
                ContributionEvent::FundsReleased { recipient, amount }
            }
        };

        Self::apply_event(state, &event);
        Ok(Transition::emit(state.balance, event))
    }

    fn apply(state: &mut Self::State, event: &Self::Event) {
        Self::apply_event(state, event);
    }
}
