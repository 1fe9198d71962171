//! Account records and identifiers
//!
//! Accounts are created once at registration and mutated only through the
//! ledger's atomic operations. `version` increments by one on every
//! committed mutation and drives optimistic-concurrency detection.

use crate::amount::Amount;
use crate::entry::LedgerEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Opaque unique account identifier, assigned at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Errors that can occur when parsing account numbers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountNumberError {
    #[error("account number must be exactly 10 digits: {0}")]
    InvalidLength(String),

    #[error("account number must be numeric: {0}")]
    NotNumeric(String),

    #[error("account number cannot start with zero: {0}")]
    LeadingZero(String),
}

/// A public 10-digit account number, unique across all accounts.
///
/// Drawn from the space 1000000000-9999999999; immutable after assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Digits in an account number
    pub const LEN: usize = 10;

    /// Build from an integer already inside the 10-digit space.
    pub fn from_u64(n: u64) -> Self {
        debug_assert!((1_000_000_000..=9_999_999_999).contains(&n));
        Self(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = AccountNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::LEN {
            return Err(AccountNumberError::InvalidLength(s.to_string()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AccountNumberError::NotNumeric(s.to_string()));
        }
        if s.starts_with('0') {
            return Err(AccountNumberError::LeadingZero(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = AccountNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountNumber> for String {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

/// A customer account.
///
/// The balance changes only through the ledger's atomic mutations, each of
/// which appends the matching journal entry in the same commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    /// Public routing handle; immutable after assignment
    pub number: AccountNumber,

    pub full_name: String,

    /// Stored lowercase; unique across accounts
    pub email: String,

    /// Reference into the external credential subsystem
    pub credential_ref: String,

    /// Current balance in minor units; never negative
    pub balance: Amount,

    /// Incremented on every committed mutation
    pub version: u64,

    pub created_at: DateTime<Utc>,

    /// Journal entries, oldest first
    pub entries: Vec<LedgerEntry>,
}

impl Account {
    /// Create a fresh account with a zero balance and empty journal.
    pub fn new(
        number: AccountNumber,
        full_name: impl Into<String>,
        email: impl Into<String>,
        credential_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            number,
            full_name: full_name.into(),
            email: email.into().to_lowercase(),
            credential_ref: credential_ref.into(),
            balance: Amount::ZERO,
            version: 0,
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Append a journal entry. The caller owns the matching balance change;
    /// both must land in the same store commit.
    pub fn record(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// Replay every journal entry from zero, in minor units.
    ///
    /// For a consistent account this equals `balance.minor_units()`.
    pub fn replayed_balance(&self) -> i64 {
        self.entries.iter().map(LedgerEntry::signed_effect).sum()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account {} ({}, balance: {})",
            self.number, self.full_name, self.balance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number() -> AccountNumber {
        "1234567890".parse().unwrap()
    }

    #[test]
    fn test_parse_account_number() {
        let parsed: AccountNumber = "1234567890".parse().unwrap();
        assert_eq!(parsed.as_str(), "1234567890");
    }

    #[test]
    fn test_account_number_wrong_length() {
        let result: Result<AccountNumber, _> = "12345".parse();
        assert!(matches!(result, Err(AccountNumberError::InvalidLength(_))));
    }

    #[test]
    fn test_account_number_not_numeric() {
        let result: Result<AccountNumber, _> = "12345abcde".parse();
        assert!(matches!(result, Err(AccountNumberError::NotNumeric(_))));
    }

    #[test]
    fn test_account_number_leading_zero() {
        let result: Result<AccountNumber, _> = "0123456789".parse();
        assert!(matches!(result, Err(AccountNumberError::LeadingZero(_))));
    }

    #[test]
    fn test_account_number_from_u64() {
        let number = AccountNumber::from_u64(9_999_999_999);
        assert_eq!(number.as_str(), "9999999999");
    }

    #[test]
    fn test_account_creation() {
        let account = Account::new(number(), "Alice Smith", "Alice@Example.COM", "cred-1");

        assert_eq!(account.full_name, "Alice Smith");
        assert_eq!(account.email, "alice@example.com");
        assert_eq!(account.balance, Amount::ZERO);
        assert_eq!(account.version, 0);
        assert!(account.entries.is_empty());
    }

    #[test]
    fn test_replayed_balance() {
        use crate::entry::LedgerEntry;

        let mut account = Account::new(number(), "Alice", "alice@example.com", "cred-1");
        account.record(LedgerEntry::deposit(
            account.id,
            Amount::new(1000).unwrap(),
            "Opening balance",
        ));
        account.record(LedgerEntry::withdrawal(
            account.id,
            Amount::new(300).unwrap(),
            "ATM",
        ));

        assert_eq!(account.replayed_balance(), 700);
    }

    #[test]
    fn test_account_serde_roundtrip() {
        let account = Account::new(number(), "Alice", "alice@example.com", "cred-1");
        let json = serde_json::to_string(&account).unwrap();
        let parsed: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(account, parsed);
    }
}
