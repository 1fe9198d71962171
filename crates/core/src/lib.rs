//! MiniBank core domain types.
//!
//! Shared by every other crate: money amounts in integer minor units,
//! account records with optimistic-concurrency versions, immutable journal
//! entries, and the error taxonomy for ledger operations.

pub mod account;
pub mod amount;
pub mod entry;
pub mod error;

pub use account::{Account, AccountId, AccountNumber, AccountNumberError};
pub use amount::{Amount, AmountError};
pub use entry::{EntryId, EntryKind, LedgerEntry};
pub use error::LedgerError;
