//! # Dapp Ledger
//!
//! Deterministic ledger registries with role-gated, single-writer state
//! transitions:
//!
//! - **Ticket Registry**: issue, transfer, invalidate and verify tickets
//! - **Ballot Registry**: one vote per address, tallied per candidate
//! - **Contribution Ledger**: donations into a pool, scholarship applications,
//!   administrator-only releases
//! - **Name Directory**: a display name per address
//!
//! Each registry is a [`Reducer`](dapp_ledger_core::reducer::Reducer) run by
//! its own [`Store`](dapp_ledger_runtime::Store). The [`Registry`] facade
//! owns all four and exposes typed methods plus a closed [`Request`] enum.
//!
//! No operation reverses a completed transition: tickets only go from valid
//! to invalid, voter and applicant flags are set once, and balances only
//! move by donation and release.
//!
//! ## Example
//!
//! ```
//! use dapp_ledger::{Address, LedgerConfig, Registry, TicketId};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let admin = Address::from_bytes([0xAD; 20]);
//! let alice = Address::from_bytes([0xA1; 20]);
//! let registry = Registry::start(&LedgerConfig::new(admin)).await?;
//!
//! let ticket = registry.issue_ticket("Concert A", alice).await?;
//! assert_eq!(ticket, TicketId::new(0));
//! assert!(registry.verify_ticket(ticket).await?);
//! # Ok(())
//! # }
//! ```

pub mod allocator;
pub mod ballot;
pub mod config;
pub mod contributions;
pub mod directory;
pub mod environment;
pub mod error;
pub mod facade;
pub mod tickets;
pub mod types;

pub use ballot::{Candidate, Tally};
pub use config::{ConfigError, LedgerConfig};
pub use environment::RegistryEnvironment;
pub use error::{ErrorKind, RegistryError, Role};
pub use facade::{Dispatched, Notification, Registry, Request, Response};
pub use tickets::Ticket;
pub use types::{Address, AddressParseError, Amount, CandidateId, TicketId};
