//! Integration tests for the SQLite-backed account store.
//!
//! The same contract the in-memory store honors: version-guarded single
//! commits, all-or-nothing pair commits, uniqueness enforced at insert.

use minibank_core::{Account, AccountId, Amount, LedgerEntry, LedgerError};
use minibank_store::{AccountStore, Mutator, PairSide, SqliteStore};
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> SqliteStore {
    let db_path = dir.path().join("accounts.db");
    let url = format!("sqlite://{}", db_path.display());
    SqliteStore::open(&url).await.unwrap()
}

fn account(number: &str, email: &str) -> Account {
    let mut account = Account::new(number.parse().unwrap(), "Test User", email, "cred");
    account.balance = Amount::new(100_000).unwrap();
    account.record(LedgerEntry::deposit(
        account.id,
        Amount::new(100_000).unwrap(),
        "Opening balance",
    ));
    account
}

fn credit(amount: i64) -> Mutator {
    Box::new(move |account: &mut Account| {
        let amount = Amount::new(amount).unwrap();
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(account.id))?;
        account.record(LedgerEntry::deposit(account.id, amount, "credit"));
        Ok(())
    })
}

fn debit(amount: i64) -> Mutator {
    Box::new(move |account: &mut Account| {
        let amount = Amount::new(amount).unwrap();
        let balance = account.balance;
        account.balance = balance.checked_sub(amount).ok_or(
            LedgerError::InsufficientFunds {
                balance,
                requested: amount,
            },
        )?;
        account.record(LedgerEntry::withdrawal(account.id, amount, "debit"));
        Ok(())
    })
}

#[tokio::test]
async fn test_insert_and_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let inserted = store
        .insert(account("1234567890", "alice@example.com"))
        .await
        .unwrap();

    let by_id = store.get(inserted.id).await.unwrap();
    assert_eq!(by_id, inserted);

    let by_number = store
        .get_by_number(&"1234567890".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(by_number, inserted);

    assert!(store
        .number_exists(&"1234567890".parse().unwrap())
        .await
        .unwrap());
    assert!(!store
        .number_exists(&"9876543210".parse().unwrap())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_missing_account() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let result = store.get(AccountId::new()).await;
    assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));

    let result = store.get_by_number(&"1234567890".parse().unwrap()).await;
    assert!(matches!(result, Err(LedgerError::UnknownAccountNumber(_))));
}

#[tokio::test]
async fn test_unique_constraints_are_final_authority() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store
        .insert(account("1234567890", "alice@example.com"))
        .await
        .unwrap();

    let result = store.insert(account("1234567890", "bob@example.com")).await;
    assert!(matches!(
        result,
        Err(LedgerError::DuplicateAccountNumber(_))
    ));

    let result = store
        .insert(account("9876543210", "alice@example.com"))
        .await;
    assert!(matches!(result, Err(LedgerError::DuplicateEmail(_))));
}

#[tokio::test]
async fn test_cas_commits_and_detects_conflicts() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let inserted = store
        .insert(account("1234567890", "alice@example.com"))
        .await
        .unwrap();

    let updated = store
        .compare_and_swap(inserted.id, 0, credit(500))
        .await
        .unwrap();
    assert_eq!(updated.version, 1);
    assert_eq!(updated.balance.minor_units(), 100_500);
    assert_eq!(updated.entries.len(), 2);

    // Stale writer is rejected without touching the row.
    let result = store.compare_and_swap(inserted.id, 0, credit(500)).await;
    assert!(matches!(result, Err(LedgerError::VersionConflict(_))));

    let current = store.get(inserted.id).await.unwrap();
    assert_eq!(current.balance.minor_units(), 100_500);
    assert_eq!(current.version, 1);
}

#[tokio::test]
async fn test_cas_rejected_mutation_rolls_back() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let inserted = store
        .insert(account("1234567890", "alice@example.com"))
        .await
        .unwrap();

    // Overdraft refused inside the mutator; nothing is written.
    let result = store
        .compare_and_swap(inserted.id, 0, debit(200_000))
        .await;
    assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));

    let current = store.get(inserted.id).await.unwrap();
    assert_eq!(current.balance.minor_units(), 100_000);
    assert_eq!(current.version, 0);
}

#[tokio::test]
async fn test_atomic_pair_commits_both_sides() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let a = store
        .insert(account("1234567890", "alice@example.com"))
        .await
        .unwrap();
    let b = store
        .insert(account("9876543210", "bob@example.com"))
        .await
        .unwrap();

    let (new_a, new_b) = store
        .atomic_pair(
            PairSide::new(a.id, 0, debit(30_000)),
            PairSide::new(b.id, 0, credit(30_000)),
        )
        .await
        .unwrap();

    assert_eq!(new_a.balance.minor_units(), 70_000);
    assert_eq!(new_b.balance.minor_units(), 130_000);
    assert_eq!(new_a.version, 1);
    assert_eq!(new_b.version, 1);

    // Survives a reload.
    let a = store.get(a.id).await.unwrap();
    let b = store.get(b.id).await.unwrap();
    assert_eq!(a.balance.minor_units(), 70_000);
    assert_eq!(b.balance.minor_units(), 130_000);
}

#[tokio::test]
async fn test_atomic_pair_is_all_or_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let a = store
        .insert(account("1234567890", "alice@example.com"))
        .await
        .unwrap();
    let b = store
        .insert(account("9876543210", "bob@example.com"))
        .await
        .unwrap();

    // Debit exceeds the balance; the credit side must not survive.
    let result = store
        .atomic_pair(
            PairSide::new(a.id, 0, debit(200_000)),
            PairSide::new(b.id, 0, credit(200_000)),
        )
        .await;
    assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));

    let a = store.get(a.id).await.unwrap();
    let b = store.get(b.id).await.unwrap();
    assert_eq!(a.balance.minor_units(), 100_000);
    assert_eq!(b.balance.minor_units(), 100_000);
    assert_eq!(a.version, 0);
    assert_eq!(b.version, 0);
}

#[tokio::test]
async fn test_atomic_pair_stale_version_conflicts() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let a = store
        .insert(account("1234567890", "alice@example.com"))
        .await
        .unwrap();
    let b = store
        .insert(account("9876543210", "bob@example.com"))
        .await
        .unwrap();

    store.compare_and_swap(a.id, 0, credit(1)).await.unwrap();

    let result = store
        .atomic_pair(
            PairSide::new(a.id, 0, debit(100)),
            PairSide::new(b.id, 0, credit(100)),
        )
        .await;
    assert!(matches!(result, Err(LedgerError::VersionConflict(_))));

    let b = store.get(b.id).await.unwrap();
    assert_eq!(b.balance.minor_units(), 100_000);
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let id;
    {
        let store = open_store(&dir).await;
        let inserted = store
            .insert(account("1234567890", "alice@example.com"))
            .await
            .unwrap();
        id = inserted.id;
        store.compare_and_swap(id, 0, credit(500)).await.unwrap();
    }

    let store = open_store(&dir).await;
    let account = store.get(id).await.unwrap();
    assert_eq!(account.balance.minor_units(), 100_500);
    assert_eq!(account.version, 1);
    assert_eq!(account.entries.len(), 2);
}
