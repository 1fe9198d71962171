//! Account number allocation
//!
//! Draws random candidates from the 10-digit space and probes the store
//! for collisions. The probe is only a fast path: the store's unique
//! constraint at insert time remains the final authority, so two
//! registrations racing for the same number cannot both win.

use minibank_core::{AccountNumber, LedgerError};
use minibank_store::AccountStore;
use rand::Rng;

/// Bounded-retry allocator for 10-digit account numbers.
#[derive(Debug, Clone, Copy)]
pub struct AccountNumberAllocator {
    max_attempts: u32,
}

impl AccountNumberAllocator {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Draw a candidate number not currently present in the store.
    ///
    /// Exhausting the attempt budget means the number space is running
    /// full - a capacity problem, not a user mistake.
    pub async fn allocate<S>(&self, store: &S) -> Result<AccountNumber, LedgerError>
    where
        S: AccountStore + ?Sized,
    {
        for _ in 0..self.max_attempts {
            let candidate = Self::draw();
            if !store.number_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(LedgerError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }

    fn draw() -> AccountNumber {
        let n = rand::thread_rng().gen_range(1_000_000_000u64..=9_999_999_999);
        AccountNumber::from_u64(n)
    }
}

impl Default for AccountNumberAllocator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_core::Account;
    use minibank_store::MemoryStore;

    #[tokio::test]
    async fn test_allocate_returns_ten_digits() {
        let store = MemoryStore::new();
        let allocator = AccountNumberAllocator::default();

        let number = allocator.allocate(&store).await.unwrap();
        assert_eq!(number.as_str().len(), 10);
        assert!(!number.as_str().starts_with('0'));
    }

    #[tokio::test]
    async fn test_allocate_avoids_existing_numbers() {
        let store = MemoryStore::new();
        let allocator = AccountNumberAllocator::default();

        let taken = allocator.allocate(&store).await.unwrap();
        store
            .insert(Account::new(
                taken.clone(),
                "Taken",
                "taken@example.com",
                "cred",
            ))
            .await
            .unwrap();

        for _ in 0..50 {
            let fresh = allocator.allocate(&store).await.unwrap();
            assert_ne!(fresh, taken);
        }
    }
}
