//! Registry Facade.
//!
//! Owns one [`Store`] per registry, constructed once at startup and shared
//! by handle with every request handler. Each registry is serialized on its
//! own; there is no cross-registry transaction and no registry reads
//! another's state.
//!
//! Callers either use the typed methods or route a closed [`Request`] enum
//! through [`Registry::dispatch`], which also returns the notifications the
//! call produced.

use crate::ballot::{BallotCommand, BallotEvent, BallotReducer, BallotState, Candidate, Tally};
use crate::config::LedgerConfig;
use crate::contributions::{
    ContributionCommand, ContributionEvent, ContributionReducer, ContributionState,
};
use crate::directory::{DirectoryCommand, DirectoryEvent, DirectoryReducer, DirectoryState};
use crate::error::RegistryError;
use crate::tickets::{Ticket, TicketCommand, TicketEvent, TicketReducer, TicketState};
use crate::types::{Address, Amount, CandidateId, TicketId};
use dapp_ledger_core::environment::{Clock, SystemClock};
use dapp_ledger_core::journal::Envelope;
use dapp_ledger_runtime::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Every registry behind one handle
#[derive(Debug)]
pub struct Registry {
    tickets: Store<TicketReducer>,
    ballot: Store<BallotReducer>,
    contributions: Store<ContributionReducer>,
    directory: Store<DirectoryReducer>,
}

impl Registry {
    /// Creates every registry and seeds the configured candidates
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] if a seeded candidate name is empty
    /// or too long.
    pub async fn start(config: &LedgerConfig) -> Result<Self, RegistryError> {
        Self::start_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Like [`Registry::start`], timestamping envelopes with `clock`
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] if a seeded candidate name is empty
    /// or too long.
    pub async fn start_with_clock(
        config: &LedgerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RegistryError> {
        let env = config.registry_environment();
        let store_config = config.store_config();

        let registry = Self {
            tickets: Store::with_config(TicketState::new(), TicketReducer::new(), env, store_config)
                .with_clock(Arc::clone(&clock)),
            ballot: Store::with_config(
                BallotState::new(config.ballot_admin),
                BallotReducer::new(),
                env,
                store_config,
            )
            .with_clock(Arc::clone(&clock)),
            contributions: Store::with_config(
                ContributionState::new(config.scholarship_admin),
                ContributionReducer::new(),
                env,
                store_config,
            )
            .with_clock(Arc::clone(&clock)),
            directory: Store::with_config(
                DirectoryState::new(),
                DirectoryReducer::new(),
                env,
                store_config,
            )
            .with_clock(clock),
        };

        for name in &config.candidates {
            registry.add_candidate(name.clone(), config.ballot_admin).await?;
        }

        tracing::info!(
            scholarship_admin = %config.scholarship_admin,
            ballot_admin = %config.ballot_admin,
            candidates = config.candidates.len(),
            "Registry started"
        );

        Ok(registry)
    }

    /// Builds a facade from already constructed stores (for example, replayed ones)
    #[must_use]
    pub fn from_stores(
        tickets: Store<TicketReducer>,
        ballot: Store<BallotReducer>,
        contributions: Store<ContributionReducer>,
        directory: Store<DirectoryReducer>,
    ) -> Self {
        Self {
            tickets,
            ballot,
            contributions,
            directory,
        }
    }

    // ========== Ticket Registry ==========

    /// Issues a ticket owned by `issuer`
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidArgument`] if `event_name` is empty.
    pub async fn issue_ticket(
        &self,
        event_name: impl Into<String>,
        issuer: Address,
    ) -> Result<TicketId, RegistryError> {
        self.tickets
            .send(TicketCommand::Issue {
                event_name: event_name.into(),
                issuer,
            })
            .await
            .map(|outcome| outcome.reply)
    }

    /// Transfers a ticket from its current owner to `new_owner`
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized` if `caller` is not the owner, or
    /// `InvalidArgument` for the zero address.
    pub async fn transfer_ticket(
        &self,
        ticket_id: TicketId,
        new_owner: Address,
        caller: Address,
    ) -> Result<(), RegistryError> {
        self.tickets
            .send(TicketCommand::Transfer {
                ticket_id,
                new_owner,
                caller,
            })
            .await
            .map(|_| ())
    }

    /// Marks a ticket invalid
    ///
    /// Invalidating an invalid ticket succeeds and is recorded again.
    ///
    /// # Errors
    ///
    /// `NotFound`, or `Unauthorized` if `caller` is not the owner.
    pub async fn invalidate_ticket(
        &self,
        ticket_id: TicketId,
        caller: Address,
    ) -> Result<(), RegistryError> {
        self.tickets
            .send(TicketCommand::Invalidate { ticket_id, caller })
            .await
            .map(|_| ())
    }

    /// Current validity of a ticket
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if the ticket was never issued.
    pub async fn verify_ticket(&self, ticket_id: TicketId) -> Result<bool, RegistryError> {
        self.tickets.state(|s| s.verify(ticket_id)).await
    }

    /// Full ticket record
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if the ticket was never issued.
    pub async fn ticket(&self, ticket_id: TicketId) -> Result<Ticket, RegistryError> {
        self.tickets.state(|s| s.get(ticket_id).cloned()).await
    }

    /// The id the next issued ticket will receive
    pub async fn next_ticket_id(&self) -> TicketId {
        self.tickets.state(TicketState::next_ticket_id).await
    }

    // ========== Ballot Registry ==========

    /// Registers a candidate
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the ballot administrator, or
    /// `InvalidArgument` for an empty name.
    pub async fn add_candidate(
        &self,
        name: impl Into<String>,
        caller: Address,
    ) -> Result<CandidateId, RegistryError> {
        self.ballot
            .send(BallotCommand::AddCandidate {
                name: name.into(),
                caller,
            })
            .await
            .map(|outcome| outcome.reply)
    }

    /// Casts `voter`'s single vote
    ///
    /// # Errors
    ///
    /// `AlreadyVoted` if `voter` has voted, otherwise `InvalidCandidate` for
    /// an unknown candidate.
    pub async fn vote(
        &self,
        candidate_id: CandidateId,
        voter: Address,
    ) -> Result<(), RegistryError> {
        self.ballot
            .send(BallotCommand::Vote {
                candidate_id,
                voter,
            })
            .await
            .map(|_| ())
    }

    /// All candidates and their counts, in id order
    pub async fn tally(&self) -> Tally {
        self.ballot.state(BallotState::tally).await
    }

    /// Whether `voter` has voted
    pub async fn has_voted(&self, voter: Address) -> bool {
        self.ballot.state(|s| s.has_voted(voter)).await
    }

    /// A single candidate
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidCandidate`] for an unknown id.
    pub async fn candidate(&self, candidate_id: CandidateId) -> Result<Candidate, RegistryError> {
        self.ballot
            .state(|s| s.candidate(candidate_id).cloned())
            .await
    }

    /// Number of registered candidates
    pub async fn candidates_count(&self) -> u64 {
        self.ballot.state(BallotState::candidates_count).await
    }

    /// Address allowed to add candidates
    pub async fn ballot_administrator(&self) -> Address {
        self.ballot.state(BallotState::administrator).await
    }

    // ========== Contribution Ledger ==========

    /// Adds `amount` to the pool
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidArgument`] for a zero or overflowing amount.
    pub async fn donate(&self, amount: Amount, donor: Address) -> Result<(), RegistryError> {
        self.contributions
            .send(ContributionCommand::Donate { amount, donor })
            .await
            .map(|_| ())
    }

    /// Registers `applicant` for a scholarship
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyApplied`] on a repeat application.
    pub async fn apply_for_scholarship(&self, applicant: Address) -> Result<(), RegistryError> {
        self.contributions
            .send(ContributionCommand::Apply { applicant })
            .await
            .map(|_| ())
    }

    /// Pays `amount` out of the pool to `recipient`
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the administrator, `InvalidArgument`
    /// for a zero amount or recipient, then `InsufficientFunds`.
    pub async fn release_funds(
        &self,
        recipient: Address,
        amount: Amount,
        caller: Address,
    ) -> Result<(), RegistryError> {
        self.contributions
            .send(ContributionCommand::ReleaseFunds {
                recipient,
                amount,
                caller,
            })
            .await
            .map(|_| ())
    }

    /// Funds currently held
    pub async fn balance(&self) -> Amount {
        self.contributions.state(ContributionState::balance).await
    }

    /// Sum of every donation
    pub async fn total_donations(&self) -> Amount {
        self.contributions
            .state(ContributionState::total_donations)
            .await
    }

    /// Whether `applicant` has applied
    pub async fn has_applied(&self, applicant: Address) -> bool {
        self.contributions
            .state(|s| s.has_applied(applicant))
            .await
    }

    /// Address allowed to release funds
    pub async fn administrator(&self) -> Address {
        self.contributions
            .state(ContributionState::administrator)
            .await
    }

    // ========== Name Directory ==========

    /// Records a display name for `caller`
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidArgument`] for a blank or oversized name.
    pub async fn set_name(
        &self,
        name: impl Into<String>,
        caller: Address,
    ) -> Result<(), RegistryError> {
        self.directory
            .send(DirectoryCommand::SetName {
                name: name.into(),
                caller,
            })
            .await
            .map(|_| ())
    }

    /// Name recorded for `user`
    pub async fn name_of(&self, user: Address) -> Option<String> {
        self.directory
            .state(|s| s.name_of(user).map(str::to_string))
            .await
    }

    /// Name the caller recorded for themselves
    pub async fn my_name(&self, caller: Address) -> Option<String> {
        self.name_of(caller).await
    }

    // ========== Stores and subscriptions ==========

    /// The ticket registry store
    #[must_use]
    pub const fn tickets(&self) -> &Store<TicketReducer> {
        &self.tickets
    }

    /// The ballot store
    #[must_use]
    pub const fn ballot(&self) -> &Store<BallotReducer> {
        &self.ballot
    }

    /// The contribution ledger store
    #[must_use]
    pub const fn contributions(&self) -> &Store<ContributionReducer> {
        &self.contributions
    }

    /// The name directory store
    #[must_use]
    pub const fn directory(&self) -> &Store<DirectoryReducer> {
        &self.directory
    }

    /// Ticket notifications recorded from now on
    #[must_use]
    pub fn subscribe_tickets(&self) -> broadcast::Receiver<Envelope<TicketEvent>> {
        self.tickets.subscribe()
    }

    /// Ballot notifications recorded from now on
    #[must_use]
    pub fn subscribe_ballot(&self) -> broadcast::Receiver<Envelope<BallotEvent>> {
        self.ballot.subscribe()
    }

    /// Contribution notifications recorded from now on
    #[must_use]
    pub fn subscribe_contributions(&self) -> broadcast::Receiver<Envelope<ContributionEvent>> {
        self.contributions.subscribe()
    }

    /// Directory notifications recorded from now on
    #[must_use]
    pub fn subscribe_directory(&self) -> broadcast::Receiver<Envelope<DirectoryEvent>> {
        self.directory.subscribe()
    }

    // ========== Dispatch ==========

    /// Executes one request
    ///
    /// # Errors
    ///
    /// Returns the registry's error; nothing is recorded in that case.
    #[tracing::instrument(skip(self, request), fields(op = request.name()))]
    pub async fn dispatch(&self, request: Request) -> Result<Dispatched, RegistryError> {
        let dispatched = match request {
            Request::IssueTicket { event_name, issuer } => {
                let outcome = self
                    .tickets
                    .send(TicketCommand::Issue { event_name, issuer })
                    .await?;
                Dispatched::new(
                    Response::TicketIssued(outcome.reply),
                    outcome.notifications.into_iter().map(Notification::Ticket),
                )
            }
            Request::TransferTicket {
                ticket_id,
                new_owner,
                caller,
            } => {
                let outcome = self
                    .tickets
                    .send(TicketCommand::Transfer {
                        ticket_id,
                        new_owner,
                        caller,
                    })
                    .await?;
                Dispatched::new(
                    Response::Done,
                    outcome.notifications.into_iter().map(Notification::Ticket),
                )
            }
            Request::InvalidateTicket { ticket_id, caller } => {
                let outcome = self
                    .tickets
                    .send(TicketCommand::Invalidate { ticket_id, caller })
                    .await?;
                Dispatched::new(
                    Response::Done,
                    outcome.notifications.into_iter().map(Notification::Ticket),
                )
            }
            Request::VerifyTicket { ticket_id } => {
                Dispatched::read(Response::Validity(self.verify_ticket(ticket_id).await?))
            }
            Request::GetTicket { ticket_id } => {
                Dispatched::read(Response::Ticket(self.ticket(ticket_id).await?))
            }
            Request::NextTicketId => Dispatched::read(Response::TicketId(self.next_ticket_id().await)),

            Request::AddCandidate { name, caller } => {
                let outcome = self
                    .ballot
                    .send(BallotCommand::AddCandidate { name, caller })
                    .await?;
                Dispatched::new(
                    Response::CandidateAdded(outcome.reply),
                    outcome.notifications.into_iter().map(Notification::Ballot),
                )
            }
            Request::Vote {
                candidate_id,
                voter,
            } => {
                let outcome = self
                    .ballot
                    .send(BallotCommand::Vote {
                        candidate_id,
                        voter,
                    })
                    .await?;
                Dispatched::new(
                    Response::Done,
                    outcome.notifications.into_iter().map(Notification::Ballot),
                )
            }
            Request::Tally => Dispatched::read(Response::Tally(self.tally().await)),
            Request::HasVoted { voter } => {
                Dispatched::read(Response::Flag(self.has_voted(voter).await))
            }
            Request::GetCandidate { candidate_id } => {
                Dispatched::read(Response::Candidate(self.candidate(candidate_id).await?))
            }
            Request::CandidatesCount => {
                Dispatched::read(Response::Count(self.candidates_count().await))
            }

            Request::Donate { amount, donor } => {
                let outcome = self
                    .contributions
                    .send(ContributionCommand::Donate { amount, donor })
                    .await?;
                Dispatched::new(
                    Response::Done,
                    outcome
                        .notifications
                        .into_iter()
                        .map(Notification::Contribution),
                )
            }
            Request::ApplyForScholarship { applicant } => {
                let outcome = self
                    .contributions
                    .send(ContributionCommand::Apply { applicant })
                    .await?;
                Dispatched::new(
                    Response::Done,
                    outcome
                        .notifications
                        .into_iter()
                        .map(Notification::Contribution),
                )
            }
            Request::ReleaseFunds {
                recipient,
                amount,
                caller,
            } => {
                let outcome = self
                    .contributions
                    .send(ContributionCommand::ReleaseFunds {
                        recipient,
                        amount,
                        caller,
                    })
                    .await?;
                Dispatched::new(
                    Response::Done,
                    outcome
                        .notifications
                        .into_iter()
                        .map(Notification::Contribution),
                )
            }
            Request::Balance => Dispatched::read(Response::Amount(self.balance().await)),
            Request::TotalDonations => {
                Dispatched::read(Response::Amount(self.total_donations().await))
            }
            Request::HasApplied { applicant } => {
                Dispatched::read(Response::Flag(self.has_applied(applicant).await))
            }
            Request::Administrator => {
                Dispatched::read(Response::Address(self.administrator().await))
            }

            Request::SetName { name, caller } => {
                let outcome = self
                    .directory
                    .send(DirectoryCommand::SetName { name, caller })
                    .await?;
                Dispatched::new(
                    Response::Done,
                    outcome.notifications.into_iter().map(Notification::Directory),
                )
            }
            Request::GetName { user } => Dispatched::read(Response::Name(self.name_of(user).await)),
            Request::GetMyName { caller } => {
                Dispatched::read(Response::Name(self.my_name(caller).await))
            }
        };

        Ok(dispatched)
    }
}

/// The closed set of operations the facade accepts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// See [`Registry::issue_ticket`]
    IssueTicket {
        /// Event name
        event_name: String,
        /// Caller
        issuer: Address,
    },
    /// See [`Registry::transfer_ticket`]
    TransferTicket {
        /// Ticket
        ticket_id: TicketId,
        /// Recipient
        new_owner: Address,
        /// Caller
        caller: Address,
    },
    /// See [`Registry::invalidate_ticket`]
    InvalidateTicket {
        /// Ticket
        ticket_id: TicketId,
        /// Caller
        caller: Address,
    },
    /// See [`Registry::verify_ticket`]
    VerifyTicket {
        /// Ticket
        ticket_id: TicketId,
    },
    /// See [`Registry::ticket`]
    GetTicket {
        /// Ticket
        ticket_id: TicketId,
    },
    /// See [`Registry::next_ticket_id`]
    NextTicketId,
    /// See [`Registry::add_candidate`]
    AddCandidate {
        /// Candidate name
        name: String,
        /// Caller
        caller: Address,
    },
    /// See [`Registry::vote`]
    Vote {
        /// Candidate
        candidate_id: CandidateId,
        /// Caller
        voter: Address,
    },
    /// See [`Registry::tally`]
    Tally,
    /// See [`Registry::has_voted`]
    HasVoted {
        /// Address to check
        voter: Address,
    },
    /// See [`Registry::candidate`]
    GetCandidate {
        /// Candidate
        candidate_id: CandidateId,
    },
    /// See [`Registry::candidates_count`]
    CandidatesCount,
    /// See [`Registry::donate`]
    Donate {
        /// Amount attached
        amount: Amount,
        /// Caller
        donor: Address,
    },
    /// See [`Registry::apply_for_scholarship`]
    ApplyForScholarship {
        /// Caller
        applicant: Address,
    },
    /// See [`Registry::release_funds`]
    ReleaseFunds {
        /// Recipient
        recipient: Address,
        /// Amount
        amount: Amount,
        /// Caller
        caller: Address,
    },
    /// See [`Registry::balance`]
    Balance,
    /// See [`Registry::total_donations`]
    TotalDonations,
    /// See [`Registry::has_applied`]
    HasApplied {
        /// Address to check
        applicant: Address,
    },
    /// See [`Registry::administrator`]
    Administrator,
    /// See [`Registry::set_name`]
    SetName {
        /// Name
        name: String,
        /// Caller
        caller: Address,
    },
    /// See [`Registry::name_of`]
    GetName {
        /// Address to look up
        user: Address,
    },
    /// See [`Registry::my_name`]
    GetMyName {
        /// Caller
        caller: Address,
    },
}

impl Request {
    /// Stable operation name, used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IssueTicket { .. } => "issue_ticket",
            Self::TransferTicket { .. } => "transfer_ticket",
            Self::InvalidateTicket { .. } => "invalidate_ticket",
            Self::VerifyTicket { .. } => "verify_ticket",
            Self::GetTicket { .. } => "get_ticket",
            Self::NextTicketId => "next_ticket_id",
            Self::AddCandidate { .. } => "add_candidate",
            Self::Vote { .. } => "vote",
            Self::Tally => "tally",
            Self::HasVoted { .. } => "has_voted",
            Self::GetCandidate { .. } => "get_candidate",
            Self::CandidatesCount => "candidates_count",
            Self::Donate { .. } => "donate",
            Self::ApplyForScholarship { .. } => "apply_for_scholarship",
            Self::ReleaseFunds { .. } => "release_funds",
            Self::Balance => "balance",
            Self::TotalDonations => "total_donations",
            Self::HasApplied { .. } => "has_applied",
            Self::Administrator => "administrator",
            Self::SetName { .. } => "set_name",
            Self::GetName { .. } => "get_name",
            Self::GetMyName { .. } => "get_my_name",
        }
    }

    /// Whether the request can change registry state
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::IssueTicket { .. }
                | Self::TransferTicket { .. }
                | Self::InvalidateTicket { .. }
                | Self::AddCandidate { .. }
                | Self::Vote { .. }
                | Self::Donate { .. }
                | Self::ApplyForScholarship { .. }
                | Self::ReleaseFunds { .. }
                | Self::SetName { .. }
        )
    }
}

/// Result of a successful request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Response {
    /// A mutation with no return value succeeded
    Done,
    /// Id of a newly issued ticket
    TicketIssued(TicketId),
    /// Id of a newly added candidate
    CandidateAdded(CandidateId),
    /// A ticket id
    TicketId(TicketId),
    /// Ticket validity
    Validity(bool),
    /// A ticket record
    Ticket(Ticket),
    /// Ballot results
    Tally(Tally),
    /// A candidate record
    Candidate(Candidate),
    /// A count
    Count(u64),
    /// A yes/no answer
    Flag(bool),
    /// An amount
    Amount(Amount),
    /// An address
    Address(Address),
    /// A directory name
    Name(Option<String>),
}

/// A recorded notification from any registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "registry", content = "envelope", rename_all = "snake_case")]
pub enum Notification {
    /// From the ticket registry
    Ticket(Envelope<TicketEvent>),
    /// From the ballot
    Ballot(Envelope<BallotEvent>),
    /// From the contribution ledger
    Contribution(Envelope<ContributionEvent>),
    /// From the name directory
    Directory(Envelope<DirectoryEvent>),
}

impl Notification {
    /// Sequence number within the originating registry's journal
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        match self {
            Self::Ticket(envelope) => envelope.sequence,
            Self::Ballot(envelope) => envelope.sequence,
            Self::Contribution(envelope) => envelope.sequence,
            Self::Directory(envelope) => envelope.sequence,
        }
    }
}

/// Response plus the notifications the request recorded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatched {
    /// The call's result
    pub response: Response,
    /// Notifications in application order (empty for reads)
    pub notifications: Vec<Notification>,
}

impl Dispatched {
    fn new(response: Response, notifications: impl IntoIterator<Item = Notification>) -> Self {
        Self {
            response,
            notifications: notifications.into_iter().collect(),
        }
    }

    const fn read(response: Response) -> Self {
        Self {
            response,
            notifications: Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use dapp_ledger_testing::test_clock;

    const ADMIN: Address = Address::from_bytes([0xAD; 20]);
    const ALICE: Address = Address::from_bytes([0xA1; 20]);

    async fn registry() -> Registry {
        let config = LedgerConfig::new(ADMIN).with_candidates(["Alice", "Bob"]);
        Registry::start_with_clock(&config, Arc::new(test_clock()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_start_seeds_candidates() {
        let registry = registry().await;
        assert_eq!(registry.candidates_count().await, 2);
        assert_eq!(
            registry.candidate(CandidateId::new(2)).await.unwrap().name,
            "Bob"
        );
        assert_eq!(registry.ballot().journal(|j| j.len()).await, 2);
    }

    #[tokio::test]
    async fn test_start_rejects_blank_candidate() {
        let config = LedgerConfig::new(ADMIN).with_candidates(["Alice", " "]);
        let error = Registry::start(&config).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_dispatch_mutation_returns_notifications() {
        let registry = registry().await;
        let dispatched = registry
            .dispatch(Request::IssueTicket {
                event_name: "Concert A".to_string(),
                issuer: ALICE,
            })
            .await
            .unwrap();

        assert_eq!(dispatched.response, Response::TicketIssued(TicketId::new(0)));
        assert_eq!(dispatched.notifications.len(), 1);
        assert_eq!(dispatched.notifications[0].sequence(), 0);
        assert!(matches!(
            &dispatched.notifications[0],
            Notification::Ticket(envelope) if envelope.event == TicketEvent::TicketIssued {
                id: TicketId::new(0),
                event_name: "Concert A".to_string(),
                owner: ALICE,
            }
        ));
    }

    #[tokio::test]
    async fn test_dispatch_read_has_no_notifications() {
        let registry = registry().await;
        let dispatched = registry.dispatch(Request::Balance).await.unwrap();
        assert_eq!(dispatched.response, Response::Amount(Amount::ZERO));
        assert!(dispatched.notifications.is_empty());
        assert!(!Request::Balance.is_mutation());
    }

    #[tokio::test]
    async fn test_dispatch_failure_records_nothing() {
        let registry = registry().await;
        let error = registry
            .dispatch(Request::ReleaseFunds {
                recipient: ALICE,
                amount: Amount::new(1),
                caller: ALICE,
            })
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        assert!(registry.contributions().journal(|j| j.is_empty()).await);
    }

    #[tokio::test]
    async fn test_name_directory_round_trip() {
        let registry = registry().await;
        assert_eq!(registry.name_of(ALICE).await, None);
        registry.set_name(" Alice ", ALICE).await.unwrap();
        assert_eq!(registry.name_of(ALICE).await.as_deref(), Some("Alice"));

        let dispatched = registry.dispatch(Request::GetName { user: ALICE }).await.unwrap();
        assert_eq!(dispatched.response, Response::Name(Some("Alice".to_string())));

        let dispatched = registry
            .dispatch(Request::GetMyName { caller: ADMIN })
            .await
            .unwrap();
        assert_eq!(dispatched.response, Response::Name(None));
        assert!(dispatched.notifications.is_empty());
    }

    #[test]
    fn test_request_serializes_with_op_tag() {
        let json = serde_json::to_value(Request::Vote {
            candidate_id: CandidateId::new(1),
            voter: ALICE,
        })
        .unwrap();
        assert_eq!(json["op"], "vote");
        assert_eq!(json["candidate_id"], 1);
        assert_eq!(json["voter"], ALICE.to_string());
    }
}
