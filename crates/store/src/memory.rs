//! In-memory account store
//!
//! Each account lives behind its own mutex; an index keyed by id, account
//! number, and lowercase email sits behind an outer read-write lock.
//! Two-account commits take the per-account locks in id order, so no pair
//! of concurrent commits can wait on each other in a cycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use minibank_core::{Account, AccountId, AccountNumber, LedgerError};

use crate::{AccountStore, Mutator, PairSide};

#[derive(Default)]
struct Index {
    accounts: HashMap<AccountId, Arc<Mutex<Account>>>,
    by_number: HashMap<AccountNumber, AccountId>,
    by_email: HashMap<String, AccountId>,
}

/// Thread-safe in-memory [`AccountStore`].
#[derive(Default)]
pub struct MemoryStore {
    index: RwLock<Index>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: AccountId) -> Result<Arc<Mutex<Account>>, LedgerError> {
        let index = self.index.read().map_err(poisoned)?;
        index
            .accounts
            .get(&id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(id))
    }
}

fn poisoned<T>(_: PoisonError<T>) -> LedgerError {
    LedgerError::StorageUnavailable("account store lock poisoned".into())
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get(&self, id: AccountId) -> Result<Account, LedgerError> {
        let slot = self.slot(id)?;
        let account = slot.lock().map_err(poisoned)?;
        Ok(account.clone())
    }

    async fn get_by_number(&self, number: &AccountNumber) -> Result<Account, LedgerError> {
        let slot = {
            let index = self.index.read().map_err(poisoned)?;
            let id = index
                .by_number
                .get(number)
                .copied()
                .ok_or_else(|| LedgerError::UnknownAccountNumber(number.clone()))?;
            index
                .accounts
                .get(&id)
                .cloned()
                .ok_or(LedgerError::AccountNotFound(id))?
        };
        let account = slot.lock().map_err(poisoned)?;
        Ok(account.clone())
    }

    async fn number_exists(&self, number: &AccountNumber) -> Result<bool, LedgerError> {
        let index = self.index.read().map_err(poisoned)?;
        Ok(index.by_number.contains_key(number))
    }

    async fn insert(&self, account: Account) -> Result<Account, LedgerError> {
        let mut index = self.index.write().map_err(poisoned)?;
        if index.by_number.contains_key(&account.number) {
            return Err(LedgerError::DuplicateAccountNumber(account.number.clone()));
        }
        if index.by_email.contains_key(&account.email) {
            return Err(LedgerError::DuplicateEmail(account.email.clone()));
        }
        index.by_number.insert(account.number.clone(), account.id);
        index.by_email.insert(account.email.clone(), account.id);
        index
            .accounts
            .insert(account.id, Arc::new(Mutex::new(account.clone())));
        Ok(account)
    }

    async fn compare_and_swap(
        &self,
        id: AccountId,
        expected_version: u64,
        mutate: Mutator,
    ) -> Result<Account, LedgerError> {
        let slot = self.slot(id)?;
        let mut stored = slot.lock().map_err(poisoned)?;
        if stored.version != expected_version {
            return Err(LedgerError::VersionConflict(id));
        }

        // Mutate a copy; a rejected transition leaves the record untouched.
        let mut next = stored.clone();
        mutate(&mut next)?;
        next.version = stored.version + 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn atomic_pair(
        &self,
        first: PairSide,
        second: PairSide,
    ) -> Result<(Account, Account), LedgerError> {
        if first.id == second.id {
            return Err(LedgerError::SelfTransfer);
        }
        let slot_first = self.slot(first.id)?;
        let slot_second = self.slot(second.id)?;

        // Lock in id order, independent of argument order.
        let (mut guard_first, mut guard_second) = if first.id < second.id {
            let first_guard = slot_first.lock().map_err(poisoned)?;
            let second_guard = slot_second.lock().map_err(poisoned)?;
            (first_guard, second_guard)
        } else {
            let second_guard = slot_second.lock().map_err(poisoned)?;
            let first_guard = slot_first.lock().map_err(poisoned)?;
            (first_guard, second_guard)
        };

        if guard_first.version != first.expected_version {
            return Err(LedgerError::VersionConflict(first.id));
        }
        if guard_second.version != second.expected_version {
            return Err(LedgerError::VersionConflict(second.id));
        }

        let mut next_first = guard_first.clone();
        let mut next_second = guard_second.clone();
        (first.mutate)(&mut next_first)?;
        (second.mutate)(&mut next_second)?;

        next_first.version += 1;
        next_second.version += 1;
        *guard_first = next_first.clone();
        *guard_second = next_second.clone();
        Ok((next_first, next_second))
    }
}
