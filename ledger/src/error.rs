//! Failure kinds returned by the registries.
//!
//! Every failure is recoverable by the caller and is returned before any
//! mutation, so a failed call leaves its registry exactly as it was. The
//! variants carry the ids, addresses and amounts involved; presenting them
//! to a user is the boundary layer's job.

use crate::types::{Address, Amount, CandidateId, TicketId};
use dapp_ledger_core::rejection::Rejection;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A role required by a gated operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Current owner of a specific ticket
    TicketOwner(TicketId),
    /// Administrator of the contribution ledger
    Administrator,
    /// Administrator of the ballot (may add candidates)
    BallotAdministrator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TicketOwner(id) => write!(f, "owner of ticket {id}"),
            Self::Administrator => write!(f, "scholarship administrator"),
            Self::BallotAdministrator => write!(f, "ballot administrator"),
        }
    }
}

/// Errors returned by registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryError {
    /// Malformed input (empty name, non-positive amount, null recipient)
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the input
        reason: String,
    },

    /// The ticket does not exist
    #[error("Ticket {ticket_id} not found")]
    NotFound {
        /// Requested ticket
        ticket_id: TicketId,
    },

    /// The candidate id is outside `[1, candidates_count]`
    #[error("Candidate {candidate_id} does not exist ({candidates_count} candidates registered)")]
    InvalidCandidate {
        /// Requested candidate
        candidate_id: CandidateId,
        /// Number of registered candidates
        candidates_count: u64,
    },

    /// The caller lacks the role the operation requires
    #[error("{caller} is not the {required}")]
    Unauthorized {
        /// Who made the call
        caller: Address,
        /// Role that was required
        required: Role,
    },

    /// The voter has already cast their vote
    #[error("{voter} has already voted")]
    AlreadyVoted {
        /// Repeat voter
        voter: Address,
    },

    /// The applicant has already applied
    #[error("{applicant} has already applied")]
    AlreadyApplied {
        /// Repeat applicant
        applicant: Address,
    },

    /// Release amount exceeds the current balance
    #[error("Insufficient funds: requested {requested}, balance {available}")]
    InsufficientFunds {
        /// Amount asked for
        requested: Amount,
        /// Balance at the time of the call
        available: Amount,
    },
}

impl RegistryError {
    /// Shorthand for [`RegistryError::InvalidArgument`]
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// The fieldless kind of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidCandidate { .. } => ErrorKind::InvalidCandidate,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::AlreadyVoted { .. } => ErrorKind::AlreadyVoted,
            Self::AlreadyApplied { .. } => ErrorKind::AlreadyApplied,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
        }
    }
}

impl Rejection for RegistryError {
    fn kind_label(&self) -> &'static str {
        self.kind().as_str()
    }
}

/// Failure kinds, for boundary mapping and metric labels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`RegistryError::InvalidArgument`]
    InvalidArgument,
    /// See [`RegistryError::NotFound`]
    NotFound,
    /// See [`RegistryError::InvalidCandidate`]
    InvalidCandidate,
    /// See [`RegistryError::Unauthorized`]
    Unauthorized,
    /// See [`RegistryError::AlreadyVoted`]
    AlreadyVoted,
    /// See [`RegistryError::AlreadyApplied`]
    AlreadyApplied,
    /// See [`RegistryError::InsufficientFunds`]
    InsufficientFunds,
}

impl ErrorKind {
    /// Stable snake-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::InvalidCandidate => "invalid_candidate",
            Self::Unauthorized => "unauthorized",
            Self::AlreadyVoted => "already_voted",
            Self::AlreadyApplied => "already_applied",
            Self::InsufficientFunds => "insufficient_funds",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
