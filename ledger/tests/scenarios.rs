//! End-to-end scenarios against the Registry facade
//!
//! Each test walks one user flow through the public API and checks both the
//! results and what ended up in the registry's journal.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use dapp_ledger::ballot::BallotEvent;
use dapp_ledger::contributions::ContributionEvent;
use dapp_ledger::tickets::TicketEvent;
use dapp_ledger::{
    Address, Amount, CandidateId, ErrorKind, LedgerConfig, Registry, RegistryError, Role, TicketId,
};
use dapp_ledger_testing::{init_test_tracing, test_clock};
use std::sync::Arc;

const ADMIN: Address = Address::from_bytes([0xAD; 20]);
const A: Address = Address::from_bytes([0x0A; 20]);
const B: Address = Address::from_bytes([0x0B; 20]);
const V: Address = Address::from_bytes([0x76; 20]);

async fn registry(candidates: &[&str]) -> Registry {
    init_test_tracing();
    let config = LedgerConfig::new(ADMIN).with_candidates(candidates.iter().copied());
    Registry::start_with_clock(&config, Arc::new(test_clock()))
        .await
        .unwrap()
}

// ============================================================================
// Ticket Registry
// ============================================================================

#[tokio::test]
async fn ticket_issue_transfer_invalidate() {
    let registry = registry(&[]).await;

    let id = registry.issue_ticket("Concert A", A).await.unwrap();
    assert_eq!(id, TicketId::new(0));
    let ticket = registry.ticket(id).await.unwrap();
    assert_eq!(ticket.owner, A);
    assert!(ticket.is_valid);

    registry.transfer_ticket(id, B, A).await.unwrap();
    assert_eq!(registry.ticket(id).await.unwrap().owner, B);

    registry.invalidate_ticket(id, B).await.unwrap();
    assert!(!registry.verify_ticket(id).await.unwrap());

    let error = registry.invalidate_ticket(id, A).await.unwrap_err();
    assert_eq!(
        error,
        RegistryError::Unauthorized {
            caller: A,
            required: Role::TicketOwner(id),
        }
    );

    let events: Vec<_> = registry
        .tickets()
        .journal(|journal| journal.events().cloned().collect())
        .await;
    assert_eq!(
        events,
        vec![
            TicketEvent::TicketIssued {
                id,
                event_name: "Concert A".to_string(),
                owner: A,
            },
            TicketEvent::TicketTransferred { id, from: A, to: B },
            TicketEvent::TicketInvalidated { id, by: B },
        ]
    );
}

#[tokio::test]
async fn ticket_stays_invalid_through_transfers() {
    let registry = registry(&[]).await;
    let id = registry.issue_ticket("Gala", A).await.unwrap();
    registry.invalidate_ticket(id, A).await.unwrap();

    registry.transfer_ticket(id, B, A).await.unwrap();
    registry.transfer_ticket(id, A, B).await.unwrap();

    let ticket = registry.ticket(id).await.unwrap();
    assert_eq!(ticket.owner, A);
    assert_eq!(ticket.event_name, "Gala");
    assert!(!ticket.is_valid);
}

#[tokio::test]
async fn ticket_ids_are_never_reused() {
    let registry = registry(&[]).await;
    for expected in 0..5 {
        let id = registry.issue_ticket(format!("Show {expected}"), A).await.unwrap();
        assert_eq!(id, TicketId::new(expected));
    }
    assert!(registry.issue_ticket("", A).await.is_err());
    assert_eq!(registry.next_ticket_id().await, TicketId::new(5));
}

#[tokio::test]
async fn unknown_ticket_is_not_found() {
    let registry = registry(&[]).await;
    let missing = TicketId::new(42);

    for error in [
        registry.verify_ticket(missing).await.unwrap_err(),
        registry.ticket(missing).await.map(|_| ()).unwrap_err(),
        registry.transfer_ticket(missing, B, A).await.unwrap_err(),
        registry.invalidate_ticket(missing, A).await.unwrap_err(),
    ] {
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }
}

// ============================================================================
// Ballot Registry
// ============================================================================

#[tokio::test]
async fn ballot_single_vote_per_voter() {
    let registry = registry(&["Alice", "Bob"]).await;

    registry.vote(CandidateId::new(1), V).await.unwrap();
    let tally = registry.tally().await;
    let rows: Vec<_> = tally
        .standings
        .iter()
        .map(|c| (c.id.value(), c.name.as_str(), c.vote_count))
        .collect();
    assert_eq!(rows, vec![(1, "Alice", 1), (2, "Bob", 0)]);

    let error = registry.vote(CandidateId::new(2), V).await.unwrap_err();
    assert_eq!(error, RegistryError::AlreadyVoted { voter: V });
    assert_eq!(registry.tally().await, tally);
    assert!(registry.has_voted(V).await);

    let last = registry
        .ballot()
        .journal(|journal| journal.entries().last().cloned())
        .await
        .unwrap();
    assert_eq!(
        last.event,
        BallotEvent::Voted {
            candidate_id: CandidateId::new(1),
            voter: V,
        }
    );
}

#[tokio::test]
async fn ballot_candidates_are_admin_only() {
    let registry = registry(&[]).await;

    let error = registry.add_candidate("Mallory", V).await.unwrap_err();
    assert_eq!(
        error,
        RegistryError::Unauthorized {
            caller: V,
            required: Role::BallotAdministrator,
        }
    );
    assert_eq!(registry.candidates_count().await, 0);

    let id = registry.add_candidate("Carol", ADMIN).await.unwrap();
    assert_eq!(id, CandidateId::new(1));
    assert_eq!(registry.ballot_administrator().await, ADMIN);
}

#[tokio::test]
async fn ballot_rejects_out_of_range_candidate() {
    let registry = registry(&["Alice"]).await;

    let error = registry.vote(CandidateId::new(2), V).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidCandidate);
    assert!(!registry.has_voted(V).await);

    registry.vote(CandidateId::new(1), V).await.unwrap();
}

// ============================================================================
// Contribution Ledger
// ============================================================================

#[tokio::test]
async fn donations_and_release() {
    let registry = registry(&[]).await;

    registry.donate(Amount::new(300), A).await.unwrap();
    registry.donate(Amount::new(200), B).await.unwrap();
    assert_eq!(registry.balance().await, Amount::new(500));
    assert_eq!(registry.total_donations().await, Amount::new(500));

    registry.release_funds(V, Amount::new(300), ADMIN).await.unwrap();
    assert_eq!(registry.balance().await, Amount::new(200));
    assert_eq!(registry.total_donations().await, Amount::new(500));

    let events: Vec<_> = registry
        .contributions()
        .journal(|journal| journal.events().cloned().collect())
        .await;
    assert_eq!(
        events.last(),
        Some(&ContributionEvent::FundsReleased {
            recipient: V,
            amount: Amount::new(300),
        })
    );
}

#[tokio::test]
async fn release_guards_leave_balance_alone() {
    let registry = registry(&[]).await;
    registry.donate(Amount::new(10), A).await.unwrap();

    let stranger = registry
        .release_funds(A, Amount::new(5), A)
        .await
        .unwrap_err();
    assert_eq!(stranger.kind(), ErrorKind::Unauthorized);

    let too_much = registry
        .release_funds(A, Amount::new(11), ADMIN)
        .await
        .unwrap_err();
    assert_eq!(
        too_much,
        RegistryError::InsufficientFunds {
            requested: Amount::new(11),
            available: Amount::new(10),
        }
    );

    assert_eq!(registry.balance().await, Amount::new(10));
    assert_eq!(registry.administrator().await, ADMIN);
}

#[tokio::test]
async fn scholarship_applications_are_set_once() {
    let registry = registry(&[]).await;
    assert!(!registry.has_applied(V).await);

    registry.apply_for_scholarship(V).await.unwrap();
    assert!(registry.has_applied(V).await);

    let error = registry.apply_for_scholarship(V).await.unwrap_err();
    assert_eq!(error, RegistryError::AlreadyApplied { applicant: V });
    assert_eq!(registry.contributions().journal(|j| j.len()).await, 1);
}

#[tokio::test]
async fn zero_donation_is_rejected() {
    let registry = registry(&[]).await;
    let error = registry.donate(Amount::ZERO, A).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    assert!(registry.balance().await.is_zero());
}

// ============================================================================
// Name Directory
// ============================================================================

#[tokio::test]
async fn names_can_be_replaced() {
    let registry = registry(&[]).await;

    registry.set_name("Ada", A).await.unwrap();
    registry.set_name("Ada L.", A).await.unwrap();
    assert_eq!(registry.name_of(A).await.as_deref(), Some("Ada L."));
    assert_eq!(registry.name_of(B).await, None);

    assert!(registry.set_name("", A).await.is_err());
    assert_eq!(registry.directory().journal(|j| j.len()).await, 2);
}

// ============================================================================
// Subscriptions
// ============================================================================

#[tokio::test]
async fn subscribers_receive_recorded_notifications() {
    let registry = registry(&[]).await;
    let mut tickets = registry.subscribe_tickets();
    let mut contributions = registry.subscribe_contributions();

    let id = registry.issue_ticket("Concert A", A).await.unwrap();
    registry.donate(Amount::new(5), B).await.unwrap();

    let envelope = tickets.recv().await.unwrap();
    assert_eq!(envelope.sequence, 0);
    assert!(matches!(envelope.event, TicketEvent::TicketIssued { id: issued, .. } if issued == id));

    let envelope = contributions.recv().await.unwrap();
    assert_eq!(
        envelope.event,
        ContributionEvent::Donated {
            donor: B,
            amount: Amount::new(5),
        }
    );
}
