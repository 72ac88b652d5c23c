//! Configuration for a ledger deployment.
//!
//! Loaded from environment variables (a `.env` file is honoured by the demo
//! binary) or built in code:
//!
//! | Variable | Default |
//! |---|---|
//! | `LEDGER_SCHOLARSHIP_ADMIN` | required |
//! | `LEDGER_BALLOT_ADMIN` | the scholarship administrator |
//! | `LEDGER_CANDIDATES` | none (comma separated) |
//! | `LEDGER_MAX_LABEL_LEN` | 256 |
//! | `LEDGER_NOTIFICATION_CAPACITY` | 64 |
//!
//! # Example
//!
//! ```
//! use dapp_ledger::{Address, LedgerConfig};
//!
//! let admin: Address = "0x00000000000000000000000000000000000000ad".parse().unwrap();
//! let config = LedgerConfig::new(admin).with_candidates(["Alice", "Bob"]);
//! assert_eq!(config.ballot_admin, admin);
//! assert_eq!(config.candidates.len(), 2);
//! ```

use crate::environment::{DEFAULT_MAX_LABEL_LEN, RegistryEnvironment};
use crate::types::{Address, AddressParseError};
use dapp_ledger_runtime::{DEFAULT_NOTIFICATION_CAPACITY, StoreConfig};
use thiserror::Error;

/// Administrator address of the contribution ledger
pub const SCHOLARSHIP_ADMIN_VAR: &str = "LEDGER_SCHOLARSHIP_ADMIN";
/// Address allowed to add candidates
pub const BALLOT_ADMIN_VAR: &str = "LEDGER_BALLOT_ADMIN";
/// Candidates seeded at startup
pub const CANDIDATES_VAR: &str = "LEDGER_CANDIDATES";
/// Label length limit
pub const MAX_LABEL_LEN_VAR: &str = "LEDGER_MAX_LABEL_LEN";
/// Broadcast capacity per registry
pub const NOTIFICATION_CAPACITY_VAR: &str = "LEDGER_NOTIFICATION_CAPACITY";

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Environment variable not set: {var}")]
    Missing {
        /// Variable name
        var: &'static str,
    },

    /// A variable does not hold a valid address
    #[error("{var} is not a valid address: {source}")]
    InvalidAddress {
        /// Variable name
        var: &'static str,
        /// Parse failure
        source: AddressParseError,
    },

    /// A variable does not hold a valid number
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Administrator of the contribution ledger (fixed for its lifetime)
    pub scholarship_admin: Address,
    /// Address allowed to add candidates
    pub ballot_admin: Address,
    /// Candidates registered at startup, in id order
    pub candidates: Vec<String>,
    /// Maximum label length in bytes
    pub max_label_len: usize,
    /// Broadcast channel capacity per registry
    pub notification_capacity: usize,
}

impl LedgerConfig {
    /// Creates a config where `admin` administers both the ledger and the ballot
    #[must_use]
    pub const fn new(admin: Address) -> Self {
        Self {
            scholarship_admin: admin,
            ballot_admin: admin,
            candidates: Vec::new(),
            max_label_len: DEFAULT_MAX_LABEL_LEN,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
        }
    }

    /// Sets a separate ballot administrator
    #[must_use]
    pub fn with_ballot_admin(mut self, ballot_admin: Address) -> Self {
        self.ballot_admin = ballot_admin;
        self
    }

    /// Sets the candidates seeded at startup
    #[must_use]
    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the label length limit
    #[must_use]
    pub fn with_max_label_len(mut self, max_label_len: usize) -> Self {
        self.max_label_len = max_label_len;
        self
    }

    /// Sets the notification channel capacity
    #[must_use]
    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity;
        self
    }

    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let scholarship_admin = lookup(SCHOLARSHIP_ADMIN_VAR)
            .ok_or(ConfigError::Missing {
                var: SCHOLARSHIP_ADMIN_VAR,
            })
            .and_then(|raw| parse_address(SCHOLARSHIP_ADMIN_VAR, &raw))?;

        let mut config = Self::new(scholarship_admin);

        if let Some(raw) = lookup(BALLOT_ADMIN_VAR) {
            config.ballot_admin = parse_address(BALLOT_ADMIN_VAR, &raw)?;
        }

        if let Some(raw) = lookup(CANDIDATES_VAR) {
            config.candidates = raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(raw) = lookup(MAX_LABEL_LEN_VAR) {
            config.max_label_len = parse_positive(MAX_LABEL_LEN_VAR, &raw)?;
        }

        if let Some(raw) = lookup(NOTIFICATION_CAPACITY_VAR) {
            config.notification_capacity = parse_positive(NOTIFICATION_CAPACITY_VAR, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if an administrator is the zero address or a seeded
    /// candidate name exceeds the label limit
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scholarship_admin.is_zero() {
            return Err(ConfigError::Validation(
                "Scholarship administrator cannot be the zero address".to_string(),
            ));
        }
        if self.ballot_admin.is_zero() {
            return Err(ConfigError::Validation(
                "Ballot administrator cannot be the zero address".to_string(),
            ));
        }
        if self.max_label_len == 0 {
            return Err(ConfigError::Validation(
                "Label limit must be positive".to_string(),
            ));
        }
        if let Some(name) = self
            .candidates
            .iter()
            .find(|name| name.len() > self.max_label_len)
        {
            return Err(ConfigError::Validation(format!(
                "Candidate name {name:?} exceeds {} bytes",
                self.max_label_len
            )));
        }
        Ok(())
    }

    /// Environment handed to every registry reducer
    #[must_use]
    pub const fn registry_environment(&self) -> RegistryEnvironment {
        RegistryEnvironment::new(self.max_label_len)
    }

    /// Store configuration shared by every registry
    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.notification_capacity)
    }
}

fn parse_address(var: &'static str, raw: &str) -> Result<Address, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|source| ConfigError::InvalidAddress { var, source })
}

fn parse_positive(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: raw.to_string(),
        }),
    }
}
