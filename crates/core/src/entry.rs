//! Journal entries - immutable records of balance-affecting events
//!
//! An entry is never mutated or deleted once appended. The two sides of a
//! transfer are built together, cross-linked before anything is committed.

use crate::account::AccountId;
use crate::amount::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Unique identifier of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of balance movement an entry records
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Deposit,
    Withdrawal,
    TransferOut,
    TransferIn,
}

impl EntryKind {
    /// Sign of the entry's effect on the owning account's balance.
    pub fn sign(&self) -> i64 {
        match self {
            EntryKind::Deposit | EntryKind::TransferIn => 1,
            EntryKind::Withdrawal | EntryKind::TransferOut => -1,
        }
    }
}

/// One immutable journal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,

    /// The account whose balance this entry affects
    pub account_id: AccountId,

    /// The other account involved; present only for transfers
    pub counterparty: Option<AccountId>,

    pub kind: EntryKind,

    /// Magnitude of the movement; direction comes from `kind`
    pub amount: Amount,

    pub description: String,

    pub timestamp: DateTime<Utc>,

    /// Links the two sides of a transfer to each other
    pub related_entry_id: Option<EntryId>,
}

impl LedgerEntry {
    /// A deposit credited to `account_id`.
    pub fn deposit(account_id: AccountId, amount: Amount, description: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            account_id,
            counterparty: None,
            kind: EntryKind::Deposit,
            amount,
            description: description.into(),
            timestamp: Utc::now(),
            related_entry_id: None,
        }
    }

    /// A withdrawal debited from `account_id`.
    pub fn withdrawal(
        account_id: AccountId,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            account_id,
            counterparty: None,
            kind: EntryKind::Withdrawal,
            amount,
            description: description.into(),
            timestamp: Utc::now(),
            related_entry_id: None,
        }
    }

    /// Build the two linked sides of a transfer.
    ///
    /// Both ids are generated up front and each side carries the other's id,
    /// so neither entry can ever exist without its counterpart.
    pub fn transfer_pair(
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
        outgoing_description: impl Into<String>,
        incoming_description: impl Into<String>,
    ) -> (LedgerEntry, LedgerEntry) {
        let out_id = EntryId::new();
        let in_id = EntryId::new();
        let timestamp = Utc::now();

        let outgoing = LedgerEntry {
            id: out_id,
            account_id: sender,
            counterparty: Some(recipient),
            kind: EntryKind::TransferOut,
            amount,
            description: outgoing_description.into(),
            timestamp,
            related_entry_id: Some(in_id),
        };
        let incoming = LedgerEntry {
            id: in_id,
            account_id: recipient,
            counterparty: Some(sender),
            kind: EntryKind::TransferIn,
            amount,
            description: incoming_description.into(),
            timestamp,
            related_entry_id: Some(out_id),
        };
        (outgoing, incoming)
    }

    /// Signed effect of this entry on the owning account, in minor units.
    pub fn signed_effect(&self) -> i64 {
        self.kind.sign() * self.amount.minor_units()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(val: i64) -> Amount {
        Amount::new(val).unwrap()
    }

    #[test]
    fn test_entry_kind_sign() {
        assert_eq!(EntryKind::Deposit.sign(), 1);
        assert_eq!(EntryKind::TransferIn.sign(), 1);
        assert_eq!(EntryKind::Withdrawal.sign(), -1);
        assert_eq!(EntryKind::TransferOut.sign(), -1);
    }

    #[test]
    fn test_signed_effect() {
        let account = AccountId::new();
        let deposit = LedgerEntry::deposit(account, amount(500), "test");
        assert_eq!(deposit.signed_effect(), 500);

        let withdrawal = LedgerEntry::withdrawal(account, amount(200), "test");
        assert_eq!(withdrawal.signed_effect(), -200);
    }

    #[test]
    fn test_transfer_pair_cross_linked() {
        let sender = AccountId::new();
        let recipient = AccountId::new();
        let (out_entry, in_entry) =
            LedgerEntry::transfer_pair(sender, recipient, amount(300), "rent", "rent");

        assert_eq!(out_entry.kind, EntryKind::TransferOut);
        assert_eq!(in_entry.kind, EntryKind::TransferIn);
        assert_eq!(out_entry.amount, in_entry.amount);
        assert_eq!(out_entry.account_id, sender);
        assert_eq!(in_entry.account_id, recipient);
        assert_eq!(out_entry.counterparty, Some(recipient));
        assert_eq!(in_entry.counterparty, Some(sender));
        assert_eq!(out_entry.related_entry_id, Some(in_entry.id));
        assert_eq!(in_entry.related_entry_id, Some(out_entry.id));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&EntryKind::TransferOut).unwrap();
        assert_eq!(json, "\"transfer_out\"");
        let parsed: EntryKind = serde_json::from_str("\"transfer_in\"").unwrap();
        assert_eq!(parsed, EntryKind::TransferIn);
    }

    #[test]
    fn test_entry_serde_roundtrip() {
        let entry = LedgerEntry::deposit(AccountId::new(), amount(123), "Opening balance");
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: LedgerEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, parsed);
    }
}
