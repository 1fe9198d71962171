//! The ledger service
//!
//! Validation happens before any atomic region and fails with zero side
//! effects. Sufficiency checks happen inside the store mutator, in the
//! same compare-and-swap cycle as the debit itself, so a balance observed
//! before the commit can never be trusted past it.

use std::sync::Arc;

use minibank_core::{Account, AccountId, AccountNumber, Amount, LedgerEntry, LedgerError};
use minibank_store::{AccountStore, Mutator, PairSide};
use tracing::{debug, warn};

use crate::allocator::AccountNumberAllocator;

/// Retry budget for optimistic commits. Conflicts are rare and cheap to
/// retry immediately, so a small bound keeps worst-case latency fixed.
pub const DEFAULT_RETRY_LIMIT: u32 = 5;

/// Every new account opens with this balance, journaled as its first entry.
pub const OPENING_BALANCE: Amount = Amount::new_unchecked(1_000_00);

/// Request to open a new account.
#[derive(Debug, Clone)]
pub struct OpenAccount {
    pub full_name: String,
    pub email: String,
    pub credential_ref: String,
}

/// Invariant-preserving operations over account state.
///
/// The ledger owns retry policy; the store owns atomicity. Nothing outside
/// the mutators built here ever changes a balance.
pub struct Ledger {
    store: Arc<dyn AccountStore>,
    allocator: AccountNumberAllocator,
    retry_limit: u32,
}

impl Ledger {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self {
            store,
            allocator: AccountNumberAllocator::default(),
            retry_limit: DEFAULT_RETRY_LIMIT,
        }
    }

    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// Open a new account with a freshly allocated number and the opening
    /// balance journaled as its first entry.
    pub async fn open_account(&self, request: OpenAccount) -> Result<Account, LedgerError> {
        for _ in 0..self.allocator.max_attempts() {
            let number = self.allocator.allocate(self.store.as_ref()).await?;
            let mut account = Account::new(
                number,
                &request.full_name,
                &request.email,
                &request.credential_ref,
            );
            if !OPENING_BALANCE.is_zero() {
                account.balance = OPENING_BALANCE;
                account.record(LedgerEntry::deposit(
                    account.id,
                    OPENING_BALANCE,
                    "Opening balance",
                ));
            }

            match self.store.insert(account).await {
                // Lost the race for this number; draw again.
                Err(LedgerError::DuplicateAccountNumber(taken)) => {
                    debug!(number = %taken, "account number taken at insert, reallocating");
                    continue;
                }
                other => return other,
            }
        }
        Err(LedgerError::AllocationExhausted {
            attempts: self.allocator.max_attempts(),
        })
    }

    /// Current state of an account.
    pub async fn account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.store.get(account_id).await
    }

    /// Resolve an account by its public number.
    pub async fn account_by_number(&self, number: &AccountNumber) -> Result<Account, LedgerError> {
        self.store.get_by_number(number).await
    }

    /// Journal entries for an account, most recent first.
    ///
    /// A derived view: recomputed from a full read on every call.
    pub async fn history(&self, account_id: AccountId) -> Result<Vec<LedgerEntry>, LedgerError> {
        let account = self.store.get(account_id).await?;
        let mut entries = account.entries;
        entries.reverse();
        Ok(entries)
    }

    /// Credit `amount` to the account, appending a deposit entry in the
    /// same commit. Returns the post-transition account.
    pub async fn deposit(
        &self,
        account_id: AccountId,
        amount: Amount,
        description: impl Into<String>,
    ) -> Result<Account, LedgerError> {
        require_positive(amount)?;
        let description = description.into();

        for attempt in 1..=self.retry_limit {
            let current = self.store.get(account_id).await?;
            let entry = LedgerEntry::deposit(account_id, amount, description.clone());

            let result = self
                .store
                .compare_and_swap(account_id, current.version, credit_mutator(amount, entry))
                .await;

            match result {
                Err(LedgerError::VersionConflict(_)) => {
                    debug!(%account_id, attempt, "deposit hit a version conflict, retrying");
                    continue;
                }
                other => return other,
            }
        }

        warn!(%account_id, retries = self.retry_limit, "deposit exhausted its retry budget");
        Err(LedgerError::OperationFailed {
            attempts: self.retry_limit,
        })
    }

    /// Debit `amount` from the account, appending a withdrawal entry in
    /// the same commit. The sufficiency check runs inside the mutator and
    /// fails with `InsufficientFunds` at commit time, however the balance
    /// looked when the caller last read it.
    pub async fn withdraw(
        &self,
        account_id: AccountId,
        amount: Amount,
        description: impl Into<String>,
    ) -> Result<Account, LedgerError> {
        require_positive(amount)?;
        let description = description.into();

        for attempt in 1..=self.retry_limit {
            let current = self.store.get(account_id).await?;
            let entry = LedgerEntry::withdrawal(account_id, amount, description.clone());

            let result = self
                .store
                .compare_and_swap(account_id, current.version, debit_mutator(amount, entry))
                .await;

            match result {
                Err(LedgerError::VersionConflict(_)) => {
                    debug!(%account_id, attempt, "withdrawal hit a version conflict, retrying");
                    continue;
                }
                other => return other,
            }
        }

        warn!(%account_id, retries = self.retry_limit, "withdrawal exhausted its retry budget");
        Err(LedgerError::OperationFailed {
            attempts: self.retry_limit,
        })
    }

    /// Move `amount` from the sender to the account with the given number.
    ///
    /// The recipient is resolved read-only before the atomic region. Each
    /// attempt re-reads both accounts, builds the cross-linked entry pair,
    /// and commits debit + credit + both entries through one `atomic_pair`
    /// call. A conflict on either side restarts the whole attempt on fresh
    /// state; exhausting the budget surfaces `TransferFailed`, after which
    /// resubmitting is safe - no attempt ever commits partially.
    ///
    /// Returns the sender's post-transition account.
    pub async fn transfer(
        &self,
        sender_id: AccountId,
        recipient_number: &AccountNumber,
        amount: Amount,
        description: Option<String>,
    ) -> Result<Account, LedgerError> {
        require_positive(amount)?;

        let recipient_id = {
            let recipient = self.store.get_by_number(recipient_number).await?;
            if recipient.id == sender_id {
                return Err(LedgerError::SelfTransfer);
            }
            recipient.id
        };

        for attempt in 1..=self.retry_limit {
            let sender = self.store.get(sender_id).await?;
            let recipient = self.store.get(recipient_id).await?;

            let outgoing = description
                .clone()
                .unwrap_or_else(|| format!("Transfer to {}", recipient.full_name));
            let incoming = description
                .clone()
                .unwrap_or_else(|| format!("Transfer from {}", sender.full_name));
            let (out_entry, in_entry) =
                LedgerEntry::transfer_pair(sender_id, recipient_id, amount, outgoing, incoming);

            let result = self
                .store
                .atomic_pair(
                    PairSide::new(sender_id, sender.version, debit_mutator(amount, out_entry)),
                    PairSide::new(
                        recipient_id,
                        recipient.version,
                        credit_mutator(amount, in_entry),
                    ),
                )
                .await;

            match result {
                Ok((sender, _recipient)) => return Ok(sender),
                Err(LedgerError::VersionConflict(conflicted)) => {
                    debug!(%sender_id, %conflicted, attempt, "transfer hit a version conflict, retrying");
                    continue;
                }
                Err(err) => return Err(err),
            }
        }

        warn!(%sender_id, retries = self.retry_limit, "transfer exhausted its retry budget");
        Err(LedgerError::TransferFailed {
            attempts: self.retry_limit,
        })
    }
}

fn require_positive(amount: Amount) -> Result<(), LedgerError> {
    if amount.is_zero() {
        Err(LedgerError::InvalidAmount)
    } else {
        Ok(())
    }
}

fn credit_mutator(amount: Amount, entry: LedgerEntry) -> Mutator {
    Box::new(move |account: &mut Account| {
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(account.id))?;
        account.record(entry);
        Ok(())
    })
}

fn debit_mutator(amount: Amount, entry: LedgerEntry) -> Mutator {
    Box::new(move |account: &mut Account| {
        let balance = account.balance;
        account.balance = balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                balance,
                requested: amount,
            })?;
        account.record(entry);
        Ok(())
    })
}
