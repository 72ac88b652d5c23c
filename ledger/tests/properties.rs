//! Property-based tests for the registry reducers
//!
//! Random command sequences are driven straight through each reducer; the
//! invariants below must hold after every step, and replaying the accepted
//! events must rebuild the same state.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use dapp_ledger::ballot::{BallotCommand, BallotReducer, BallotState};
use dapp_ledger::contributions::{ContributionCommand, ContributionReducer, ContributionState};
use dapp_ledger::tickets::{TicketCommand, TicketReducer, TicketState};
use dapp_ledger::{Address, Amount, CandidateId, ErrorKind, RegistryEnvironment, TicketId};
use dapp_ledger_core::reducer::Reducer;
use dapp_ledger_testing::properties::{account_bytes, label, pooled_account, positive_amount};
use proptest::prelude::*;
use std::collections::BTreeSet;

const ADMIN: Address = Address::from_bytes([0xAD; 20]);

fn account(index: u8) -> Address {
    Address::from_bytes(pooled_account(index))
}

/// Runs `command`, checks rejections left state untouched, and collects accepted events
fn step<R>(
    reducer: &R,
    state: &mut R::State,
    command: R::Command,
    journal: &mut Vec<R::Event>,
) -> Result<R::Reply, R::Error>
where
    R: Reducer<Environment = RegistryEnvironment>,
    R::State: Clone + PartialEq + std::fmt::Debug,
{
    let before = state.clone();
    match reducer.reduce(state, command, &RegistryEnvironment::default()) {
        Ok(transition) => {
            journal.extend(transition.events);
            Ok(transition.reply)
        }
        Err(error) => {
            assert_eq!(*state, before, "rejected command mutated state");
            Err(error)
        }
    }
}

fn replay<R: Reducer>(initial: R::State, events: &[R::Event]) -> R::State {
    let mut state = initial;
    for event in events {
        R::apply(&mut state, event);
    }
    state
}

// ============================================================================
// Ballot
// ============================================================================

proptest! {
    #[test]
    fn vote_total_equals_distinct_voters(
        votes in prop::collection::vec((0_u8..8, 0_u64..5), 0..64)
    ) {
        let reducer = BallotReducer::new();
        let mut state = BallotState::new(ADMIN);
        let mut journal = Vec::new();
        for name in ["Alice", "Bob", "Carol"] {
            step(&reducer, &mut state, BallotCommand::AddCandidate {
                name: name.to_string(),
                caller: ADMIN,
            }, &mut journal).unwrap();
        }

        let mut voted = BTreeSet::new();
        for (voter, candidate) in votes {
            let voter = account(voter);
            let result = step(&reducer, &mut state, BallotCommand::Vote {
                candidate_id: CandidateId::new(candidate),
                voter,
            }, &mut journal);

            match result {
                Ok(_) => prop_assert!(voted.insert(voter), "voter counted twice"),
                Err(error) if voted.contains(&voter) => {
                    prop_assert_eq!(error.kind(), ErrorKind::AlreadyVoted);
                }
                Err(error) => prop_assert_eq!(error.kind(), ErrorKind::InvalidCandidate),
            }
        }

        prop_assert_eq!(state.tally().total_votes(), voted.len() as u64);
        prop_assert_eq!(state.voter_count(), voted.len() as u64);
        prop_assert_eq!(replay::<BallotReducer>(BallotState::new(ADMIN), &journal), state);
    }
}

// ============================================================================
// Contribution Ledger
// ============================================================================

#[derive(Debug, Clone)]
enum PoolOp {
    Donate(u128),
    Release { amount: u128, by_admin: bool },
    Apply(u8),
}

fn pool_op() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        positive_amount().prop_map(PoolOp::Donate),
        (positive_amount(), any::<bool>())
            .prop_map(|(amount, by_admin)| PoolOp::Release { amount, by_admin }),
        (0_u8..4).prop_map(PoolOp::Apply),
    ]
}

proptest! {
    #[test]
    fn balance_is_donations_minus_releases(ops in prop::collection::vec(pool_op(), 0..64)) {
        let reducer = ContributionReducer::new();
        let mut state = ContributionState::new(ADMIN);
        let mut journal = Vec::new();
        let mut donated = 0_u128;
        let mut released = 0_u128;

        for op in ops {
            let balance_before = state.balance();
            match op {
                PoolOp::Donate(units) => {
                    step(&reducer, &mut state, ContributionCommand::Donate {
                        amount: Amount::new(units),
                        donor: account(9),
                    }, &mut journal).unwrap();
                    donated += units;
                }
                PoolOp::Release { amount, by_admin } => {
                    let caller = if by_admin { ADMIN } else { account(9) };
                    let result = step(&reducer, &mut state, ContributionCommand::ReleaseFunds {
                        recipient: account(1),
                        amount: Amount::new(amount),
                        caller,
                    }, &mut journal);

                    if !by_admin {
                        prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::Unauthorized);
                    } else if Amount::new(amount) > balance_before {
                        prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::InsufficientFunds);
                    } else {
                        prop_assert!(result.is_ok());
                        released += amount;
                    }
                }
                PoolOp::Apply(applicant) => {
                    let applicant = account(applicant);
                    let first = !state.has_applied(applicant);
                    let result = step(&reducer, &mut state, ContributionCommand::Apply {
                        applicant,
                    }, &mut journal);
                    prop_assert_eq!(result.is_ok(), first);
                }
            }

            prop_assert_eq!(state.total_donations(), Amount::new(donated));
            prop_assert_eq!(state.balance(), Amount::new(donated - released));
        }

        prop_assert_eq!(
            replay::<ContributionReducer>(ContributionState::new(ADMIN), &journal),
            state
        );
    }
}

// ============================================================================
// Ticket Registry
// ============================================================================

#[derive(Debug, Clone)]
enum TicketOp {
    Issue { name: String, issuer: u8 },
    Transfer { ticket: u64, to: u8, caller: u8 },
    Invalidate { ticket: u64, caller: u8 },
}

fn ticket_op() -> impl Strategy<Value = TicketOp> {
    prop_oneof![
        (label(), 0_u8..4).prop_map(|(name, issuer)| TicketOp::Issue { name, issuer }),
        (0_u64..6, 0_u8..4, 0_u8..4)
            .prop_map(|(ticket, to, caller)| TicketOp::Transfer { ticket, to, caller }),
        (0_u64..6, 0_u8..4).prop_map(|(ticket, caller)| TicketOp::Invalidate { ticket, caller }),
    ]
}

proptest! {
    #[test]
    fn transfers_only_move_ownership(ops in prop::collection::vec(ticket_op(), 0..64)) {
        let reducer = TicketReducer::new();
        let mut state = TicketState::new();
        let mut journal = Vec::new();
        // (event name, ever invalidated) per issued ticket
        let mut expected: Vec<(String, bool)> = Vec::new();

        for op in ops {
            match op {
                TicketOp::Issue { name, issuer } => {
                    let id = step(&reducer, &mut state, TicketCommand::Issue {
                        event_name: name.clone(),
                        issuer: account(issuer),
                    }, &mut journal).unwrap();
                    prop_assert_eq!(id, TicketId::new(expected.len() as u64));
                    expected.push((name, false));
                }
                TicketOp::Transfer { ticket, to, caller } => {
                    let ticket_id = TicketId::new(ticket);
                    let owner = state.get(ticket_id).map(|t| t.owner).ok();
                    let result = step(&reducer, &mut state, TicketCommand::Transfer {
                        ticket_id,
                        new_owner: account(to),
                        caller: account(caller),
                    }, &mut journal);
                    match owner {
                        None => prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound),
                        Some(owner) if owner != account(caller) => {
                            prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::Unauthorized);
                        }
                        Some(_) => {
                            prop_assert!(result.is_ok());
                            prop_assert_eq!(state.get(ticket_id).unwrap().owner, account(to));
                        }
                    }
                }
                TicketOp::Invalidate { ticket, caller } => {
                    let ticket_id = TicketId::new(ticket);
                    if step(&reducer, &mut state, TicketCommand::Invalidate {
                        ticket_id,
                        caller: account(caller),
                    }, &mut journal).is_ok() {
                        expected[usize::try_from(ticket).unwrap()].1 = true;
                    }
                }
            }
        }

        for (index, (name, invalidated)) in expected.iter().enumerate() {
            let ticket = state.get(TicketId::new(index as u64)).unwrap();
            prop_assert_eq!(&ticket.event_name, name);
            prop_assert_eq!(ticket.is_valid, !invalidated);
        }
        prop_assert_eq!(state.next_ticket_id(), TicketId::new(expected.len() as u64));
        prop_assert_eq!(replay::<TicketReducer>(TicketState::new(), &journal), state);
    }
}

proptest! {
    #[test]
    fn owner_can_hand_a_ticket_to_any_account(name in label(), to in account_bytes()) {
        let reducer = TicketReducer::new();
        let mut state = TicketState::new();
        let mut journal = Vec::new();
        let owner = account(0);
        let to = Address::from_bytes(to);

        let id = step(&reducer, &mut state, TicketCommand::Issue {
            event_name: name,
            issuer: owner,
        }, &mut journal).unwrap();
        step(&reducer, &mut state, TicketCommand::Transfer {
            ticket_id: id,
            new_owner: to,
            caller: owner,
        }, &mut journal).unwrap();

        prop_assert_eq!(state.get(id).unwrap().owner, to);
        prop_assert_eq!(state.verify(id), Ok(true));
        prop_assert_eq!(to.to_string().parse::<Address>(), Ok(to));
    }
}
