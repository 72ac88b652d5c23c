//! Ledger demo.
//!
//! Walks through the ticket, ballot, scholarship and directory flows against
//! an in-process [`Registry`], logging every result and notification.
//!
//! Run with:
//! ```bash
//! LEDGER_CANDIDATES="Alice,Bob" cargo run --bin ledger-demo
//! ```
//!
//! Set `RUST_LOG=debug` to see the store's per-command logs.

use dapp_ledger::{Address, Amount, CandidateId, ConfigError, LedgerConfig, Registry, Request};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_ADMIN: Address = Address::from_bytes([0xAD; 20]);
const ALICE: Address = Address::from_bytes([0xA1; 20]);
const BOB: Address = Address::from_bytes([0xB0; 20]);
const VOTER: Address = Address::from_bytes([0x70; 20]);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dapp_ledger=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    tracing::info!("Starting ledger demo");

    let config = match LedgerConfig::from_env() {
        Ok(config) => config,
        Err(ConfigError::Missing { var }) => {
            tracing::info!(var, admin = %DEMO_ADMIN, "No administrator configured, using demo address");
            LedgerConfig::new(DEMO_ADMIN).with_candidates(["Alice", "Bob"])
        }
        Err(error) => return Err(error.into()),
    };

    let registry = Registry::start(&config).await?;
    let admin = config.scholarship_admin;

    // Tickets
    let ticket = registry.issue_ticket("Concert A", ALICE).await?;
    tracing::info!(%ticket, owner = %ALICE, "Issued ticket");

    registry.transfer_ticket(ticket, BOB, ALICE).await?;
    registry.invalidate_ticket(ticket, BOB).await?;
    tracing::info!(%ticket, valid = registry.verify_ticket(ticket).await?, "Ticket after invalidation");

    if let Err(error) = registry.invalidate_ticket(ticket, ALICE).await {
        tracing::info!(%error, kind = %error.kind(), "Previous owner cannot invalidate");
    }

    // Ballot
    if registry.candidates_count().await == 0 {
        registry.add_candidate("Alice", config.ballot_admin).await?;
        registry.add_candidate("Bob", config.ballot_admin).await?;
    }
    registry.vote(CandidateId::new(1), VOTER).await?;
    if let Err(error) = registry.vote(CandidateId::new(2), VOTER).await {
        tracing::info!(%error, "Second vote refused");
    }
    for candidate in registry.tally().await.standings {
        tracing::info!(id = %candidate.id, name = %candidate.name, votes = candidate.vote_count, "Tally");
    }

    // Scholarship
    registry.donate(Amount::new(100), ALICE).await?;
    registry.donate(Amount::new(50), BOB).await?;
    registry.apply_for_scholarship(VOTER).await?;
    registry.release_funds(VOTER, Amount::new(100), admin).await?;
    tracing::info!(
        balance = %registry.balance().await,
        total_donations = %registry.total_donations().await,
        "Scholarship pool"
    );

    // Directory, through the request enum
    let dispatched = registry
        .dispatch(Request::SetName {
            name: "Ada".to_string(),
            caller: ALICE,
        })
        .await?;
    for notification in &dispatched.notifications {
        tracing::info!(sequence = notification.sequence(), ?notification, "Notification");
    }
    tracing::info!(name = ?registry.name_of(ALICE).await, "Directory lookup");

    tracing::info!("Demo complete");
    Ok(())
}
