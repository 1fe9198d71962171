//! Account storage - the only holder of mutable account state
//!
//! Exposes an optimistic single-record compare-and-swap and an
//! all-or-nothing two-record commit. Business rules run inside mutators
//! passed in by the ledger, so a balance change and its journal entry
//! always land in the same commit - there is no way to persist one without
//! the other.
//!
//! # Implementations
//! - [`MemoryStore`]: per-account locks, id-ordered pair locking
//! - [`SqliteStore`]: version-guarded updates, transaction-scoped pairs

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use minibank_core::{Account, AccountId, AccountNumber, LedgerError};

/// A state transition applied to a copy of the stored account.
///
/// Returning an error aborts the commit with no side effects.
pub type Mutator = Box<dyn FnOnce(&mut Account) -> Result<(), LedgerError> + Send>;

/// One side of a two-account commit.
pub struct PairSide {
    pub id: AccountId,
    pub expected_version: u64,
    pub mutate: Mutator,
}

impl PairSide {
    pub fn new(id: AccountId, expected_version: u64, mutate: Mutator) -> Self {
        Self {
            id,
            expected_version,
            mutate,
        }
    }
}

/// Storage capability consumed by the ledger.
///
/// Implementations must not assume anything about callers beyond this
/// contract; all concurrency control lives behind these six methods.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Load an account by id.
    async fn get(&self, id: AccountId) -> Result<Account, LedgerError>;

    /// Load an account by its public account number.
    async fn get_by_number(&self, number: &AccountNumber) -> Result<Account, LedgerError>;

    /// Fast-path uniqueness probe for the allocator. The unique constraint
    /// enforced by [`AccountStore::insert`] remains the final authority.
    async fn number_exists(&self, number: &AccountNumber) -> Result<bool, LedgerError>;

    /// Insert a new account. Fails on a duplicate account number or email.
    async fn insert(&self, account: Account) -> Result<Account, LedgerError>;

    /// Apply `mutate` to a copy of the account and persist it only if the
    /// stored version still equals `expected_version`. On success the
    /// version is incremented by one and the new state returned; on
    /// mismatch nothing changes and `VersionConflict` is returned.
    async fn compare_and_swap(
        &self,
        id: AccountId,
        expected_version: u64,
        mutate: Mutator,
    ) -> Result<Account, LedgerError>;

    /// Apply two mutations to two distinct accounts as one all-or-nothing
    /// commit. Records are taken in a fixed total order regardless of
    /// argument order, so two transfers moving money in opposite directions
    /// between the same pair cannot deadlock. Returns the new states in
    /// argument order.
    async fn atomic_pair(
        &self,
        first: PairSide,
        second: PairSide,
    ) -> Result<(Account, Account), LedgerError>;
}
