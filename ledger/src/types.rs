//! Domain value types shared by every registry.
//!
//! - [`Address`]: the Identity Reference used for ownership and authorization
//! - [`Amount`]: a non-negative quantity of the ledger's currency
//! - [`TicketId`] / [`CandidateId`]: allocator-assigned record identifiers

use hex::{FromHex, FromHexError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of bytes in an account address
pub const ADDRESS_LEN: usize = 20;

/// An account address (opaque, comparable principal identifier)
///
/// Parsed from and displayed as `0x`-prefixed hex, and serialized the same
/// way. The all-zero address is the null identity and never owns anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null identity
    pub const ZERO: Self = Self([0; ADDRESS_LEN]);

    /// Creates an address from raw bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Checks if this is the null identity
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Errors from parsing an [`Address`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    /// Wrong number of hex digits
    #[error("Address must have {expected} hex digits, found {found}")]
    InvalidLength {
        /// Digits required
        expected: usize,
        /// Digits supplied
        found: usize,
    },

    /// A character that is not a hex digit
    #[error("Invalid hex digit {character:?} at position {position}")]
    InvalidDigit {
        /// Offending character
        character: char,
        /// Position after the optional `0x` prefix
        position: usize,
    },
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        <[u8; ADDRESS_LEN]>::from_hex(digits)
            .map(Self)
            .map_err(|error| match error {
                FromHexError::InvalidHexCharacter { c, index } => AddressParseError::InvalidDigit {
                    character: c,
                    position: index,
                },
                FromHexError::OddLength | FromHexError::InvalidStringLength => {
                    AddressParseError::InvalidLength {
                        expected: ADDRESS_LEN * 2,
                        found: digits.len(),
                    }
                }
            })
    }
}

/// A non-negative amount in the ledger's smallest unit (wei-style)
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Amount(u128);

impl Amount {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Creates an amount from its smallest unit
    #[must_use]
    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    /// Returns the amount in its smallest unit
    #[must_use]
    pub const fn units(&self) -> u128 {
        self.0
    }

    /// Checks if this amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds, returning `None` on overflow
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Subtracts, returning `None` if `other` is larger
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(difference) => Some(Self(difference)),
            None => None,
        }
    }

    /// Adds, clamping at the maximum
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts, clamping at zero
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a ticket (0-based, allocator-assigned)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketId(u64);

impl TicketId {
    /// Creates a `TicketId` from its raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a ballot candidate (1-based, allocator-assigned)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(u64);

impl CandidateId {
    /// Creates a `CandidateId` from its raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;

    #[test]
    fn address_parse_and_display() {
        let address: Address = "0x53B57865956abaCa2BA66136d68E1c80b998275D".parse().unwrap();
        assert_eq!(
            address.to_string(),
            "0x53b57865956abaca2ba66136d68e1c80b998275d"
        );
        assert_eq!(address.to_string().parse::<Address>().unwrap(), address);
    }

    #[test]
    fn address_without_prefix_parses() {
        let address: Address = "0000000000000000000000000000000000000001".parse().unwrap();
        assert_eq!(address.as_bytes()[19], 1);
        assert!(!address.is_zero());
    }

    #[test]
    fn address_rejects_bad_input() {
        assert_eq!(
            "0x1234".parse::<Address>(),
            Err(AddressParseError::InvalidLength {
                expected: 40,
                found: 4
            })
        );
        assert!(matches!(
            "0x123".parse::<Address>(),
            Err(AddressParseError::InvalidLength { found: 3, .. })
        ));
        assert_eq!(
            "0x00z0000000000000000000000000000000000000".parse::<Address>(),
            Err(AddressParseError::InvalidDigit {
                character: 'z',
                position: 2
            })
        );
    }

    #[test]
    fn address_serializes_as_hex_string() {
        let address = Address::from_bytes([0xAB; ADDRESS_LEN]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"0xabababababababababababababababababababab\"");
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);

        let upper = "\"0XABABABABABABABABABABABABABABABABABABABAB\"";
        assert_eq!(serde_json::from_str::<Address>(upper).unwrap(), address);
        assert!(serde_json::from_str::<Address>("\"0x12\"").is_err());
    }

    #[test]
    fn zero_address_is_null_identity() {
        assert!(Address::ZERO.is_zero());
        assert_eq!(
            Address::ZERO.to_string(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn amount_arithmetic() {
        let a = Amount::new(30);
        let b = Amount::new(12);
        assert_eq!(a.checked_add(b), Some(Amount::new(42)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(Amount::new(u128::MAX).checked_add(Amount::new(1)), None);
        assert_eq!(b.saturating_sub(a), Amount::ZERO);
    }
}
