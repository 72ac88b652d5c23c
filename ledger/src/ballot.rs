//! Ballot Registry.
//!
//! Candidates are registered by the ballot administrator and numbered from 1.
//! Every address may vote exactly once; the voter flag is never cleared.

use crate::allocator::IdAllocator;
use crate::environment::RegistryEnvironment;
use crate::error::{RegistryError, Role};
use crate::types::{Address, CandidateId};
use dapp_ledger_core::{event::Event, reducer::Reducer, transition::Transition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A candidate on the ballot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate identifier (1-based)
    pub id: CandidateId,
    /// Display name
    pub name: String,
    /// Votes received so far
    pub vote_count: u64,
}

/// State of the ballot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotState {
    administrator: Address,
    candidates: BTreeMap<CandidateId, Candidate>,
    ids: IdAllocator,
    voters: BTreeSet<Address>,
}

impl BallotState {
    /// Creates an empty ballot administered by `administrator`
    #[must_use]
    pub const fn new(administrator: Address) -> Self {
        Self {
            administrator,
            candidates: BTreeMap::new(),
            ids: IdAllocator::starting_at(1),
            voters: BTreeSet::new(),
        }
    }

    /// The address allowed to add candidates
    #[must_use]
    pub const fn administrator(&self) -> Address {
        self.administrator
    }

    /// Number of registered candidates
    #[must_use]
    pub fn candidates_count(&self) -> u64 {
        self.candidates.len() as u64
    }

    /// Returns a candidate by id
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidCandidate`] if `id` is outside `[1, candidates_count]`.
    pub fn candidate(&self, candidate_id: CandidateId) -> Result<&Candidate, RegistryError> {
        self.candidates
            .get(&candidate_id)
            .ok_or(RegistryError::InvalidCandidate {
                candidate_id,
                candidates_count: self.candidates_count(),
            })
    }

    /// Whether `voter` has already voted
    #[must_use]
    pub fn has_voted(&self, voter: Address) -> bool {
        self.voters.contains(&voter)
    }

    /// Number of distinct addresses that have voted
    #[must_use]
    pub fn voter_count(&self) -> u64 {
        self.voters.len() as u64
    }

    /// All candidates with their counts, in id order
    #[must_use]
    pub fn tally(&self) -> Tally {
        Tally {
            standings: self.candidates.values().cloned().collect(),
        }
    }
}

/// Read-only snapshot of the ballot results
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Candidates in id order
    pub standings: Vec<Candidate>,
}

impl Tally {
    /// Sum of all vote counts
    #[must_use]
    pub fn total_votes(&self) -> u64 {
        self.standings.iter().map(|c| c.vote_count).sum()
    }

    /// Candidates sharing the highest vote count (all of them on a tie)
    #[must_use]
    pub fn leaders(&self) -> Vec<&Candidate> {
        let Some(top) = self.standings.iter().map(|c| c.vote_count).max() else {
            return Vec::new();
        };
        self.standings
            .iter()
            .filter(|c| c.vote_count == top)
            .collect()
    }
}

/// Commands accepted by the ballot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotCommand {
    /// Register a candidate (administrator only)
    AddCandidate {
        /// Candidate name, must be non-empty
        name: String,
        /// Caller, must be the ballot administrator
        caller: Address,
    },

    /// Cast a vote
    Vote {
        /// Chosen candidate
        candidate_id: CandidateId,
        /// Caller casting the vote
        voter: Address,
    },
}

/// Notifications emitted by the ballot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotEvent {
    /// A candidate was registered
    CandidateAdded {
        /// New candidate id
        id: CandidateId,
        /// Candidate name
        name: String,
    },

    /// A vote was cast
    ///
    /// The voter is carried so the voter flag can be rebuilt on replay.
    Voted {
        /// Candidate that received the vote
        candidate_id: CandidateId,
        /// Who voted
        voter: Address,
    },
}

impl Event for BallotEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::CandidateAdded { .. } => "CandidateAdded.v1",
            Self::Voted { .. } => "VotedEvent.v1",
        }
    }
}

/// Reducer for the ballot
#[derive(Clone, Debug, Default)]
pub struct BallotReducer;

impl BallotReducer {
    /// Creates a new `BallotReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates an `AddCandidate` command and returns the id to assign
    fn validate_add_candidate(
        state: &BallotState,
        name: &str,
        caller: Address,
        env: &RegistryEnvironment,
    ) -> Result<CandidateId, RegistryError> {
        if caller != state.administrator {
            tracing::warn!(%caller, "Non-administrator tried to add a candidate");
            return Err(RegistryError::Unauthorized {
                caller,
                required: Role::BallotAdministrator,
            });
        }
        env.check_label("Candidate name", name)?;

        state
            .ids
            .peek()
            .map(CandidateId::new)
            .ok_or_else(|| RegistryError::invalid("Candidate id space exhausted"))
    }

    /// Validates a `Vote` command
    ///
    /// The voter flag is checked before the candidate range.
    fn validate_vote(
        state: &BallotState,
        candidate_id: CandidateId,
        voter: Address,
    ) -> Result<(), RegistryError> {
        if state.has_voted(voter) {
            return Err(RegistryError::AlreadyVoted { voter });
        }
        state.candidate(candidate_id)?;
        Ok(())
    }

    /// Applies an event to state
    fn apply_event(state: &mut BallotState, event: &BallotEvent) {
        match event {
            BallotEvent::CandidateAdded { id, name } => {
                state.candidates.insert(
                    *id,
                    Candidate {
                        id: *id,
                        name: name.clone(),
                        vote_count: 0,
                    },
                );
                state.ids.commit(id.value());
            }
            BallotEvent::Voted {
                candidate_id,
                voter,
            } => {
                if let Some(candidate) = state.candidates.get_mut(candidate_id) {
                    candidate.vote_count = candidate.vote_count.saturating_add(1);
                }
                state.voters.insert(*voter);
            }
        }
    }
}

impl Reducer for BallotReducer {
    type State = BallotState;
    type Command = BallotCommand;
    type Event = BallotEvent;
    type Reply = CandidateId;
    type Error = RegistryError;
    type Environment = RegistryEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<Transition<CandidateId, BallotEvent>, RegistryError> {
        match command {
            BallotCommand::AddCandidate { name, caller } => {
                let id = Self::validate_add_candidate(state, &name, caller, env)?;
                tracing::debug!(%id, %name, "Adding candidate");

                let event = BallotEvent::CandidateAdded { id, name };
                Self::apply_event(state, &event);
                Ok(Transition::emit(id, event))
            }

            BallotCommand::Vote {
                candidate_id,
                voter,
            } => {
                Self::validate_vote(state, candidate_id, voter)?;

                let event = BallotEvent::Voted {
                    candidate_id,
                    voter,
                };
                Self::apply_event(state, &event);
                Ok(Transition::emit(candidate_id, event))
            }
        }
    }

    fn apply(state: &mut Self::State, event: &Self::Event) {
        Self::apply_event(state, event);
    }
}
