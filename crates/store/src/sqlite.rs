//! SQLite-backed account store
//!
//! Accounts live in a single table with the journal serialized alongside,
//! so one row update carries both the balance change and its entries.
//! `UPDATE ... WHERE id = ? AND version = ?` gives the same conflict
//! semantics as the in-memory store; the two-record commit runs inside one
//! transaction, making it all-or-nothing.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use minibank_core::{Account, AccountId, AccountNumber, Amount, LedgerError};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::{AccountStore, Mutator, PairSide};

/// [`AccountStore`] backed by a SQLite database.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) a database at `database_url` and
    /// initialize the schema.
    pub async fn open(database_url: &str) -> Result<Self, LedgerError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(storage)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(storage)?;

        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Create the accounts table.
    pub async fn init(&self) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                number TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                credential_ref TEXT NOT NULL,
                balance INTEGER NOT NULL,
                version INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                entries TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        id: AccountId,
    ) -> Result<Account, LedgerError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut **tx)
            .await
            .map_err(storage)?;

        match row {
            Some(row) => row_to_account(&row),
            None => Err(LedgerError::AccountNotFound(id)),
        }
    }

    /// Version-guarded write of a mutated account inside a transaction.
    async fn write_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        account: &Account,
        expected_version: u64,
    ) -> Result<(), LedgerError> {
        let entries = serde_json::to_string(&account.entries)
            .map_err(|e| LedgerError::StorageUnavailable(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE accounts SET balance = ?, entries = ?, version = version + 1
             WHERE id = ? AND version = ?",
        )
        .bind(account.balance.minor_units())
        .bind(entries)
        .bind(account.id.to_string())
        .bind(expected_version as i64)
        .execute(&mut **tx)
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::VersionConflict(account.id));
        }
        Ok(())
    }
}

fn storage(err: sqlx::Error) -> LedgerError {
    LedgerError::StorageUnavailable(err.to_string())
}

fn corrupt(what: &str, detail: impl std::fmt::Display) -> LedgerError {
    LedgerError::StorageUnavailable(format!("corrupt {what} in accounts table: {detail}"))
}

fn row_to_account(row: &SqliteRow) -> Result<Account, LedgerError> {
    let id: String = row.get("id");
    let id: AccountId = id.parse().map_err(|e| corrupt("account id", e))?;

    let number: String = row.get("number");
    let number: AccountNumber = number.parse().map_err(|e| corrupt("account number", e))?;

    let balance = Amount::new(row.get::<i64, _>("balance")).map_err(|e| corrupt("balance", e))?;

    let entries: String = row.get("entries");
    let entries = serde_json::from_str(&entries).map_err(|e| corrupt("journal", e))?;

    Ok(Account {
        id,
        number,
        full_name: row.get("full_name"),
        email: row.get("email"),
        credential_ref: row.get("credential_ref"),
        balance,
        version: row.get::<i64, _>("version") as u64,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        entries,
    })
}

#[async_trait]
impl AccountStore for SqliteStore {
    async fn get(&self, id: AccountId) -> Result<Account, LedgerError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        match row {
            Some(row) => row_to_account(&row),
            None => Err(LedgerError::AccountNotFound(id)),
        }
    }

    async fn get_by_number(&self, number: &AccountNumber) -> Result<Account, LedgerError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE number = ?")
            .bind(number.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        match row {
            Some(row) => row_to_account(&row),
            None => Err(LedgerError::UnknownAccountNumber(number.clone())),
        }
    }

    async fn number_exists(&self, number: &AccountNumber) -> Result<bool, LedgerError> {
        let row = sqlx::query("SELECT 1 FROM accounts WHERE number = ?")
            .bind(number.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        Ok(row.is_some())
    }

    async fn insert(&self, account: Account) -> Result<Account, LedgerError> {
        let entries = serde_json::to_string(&account.entries)
            .map_err(|e| LedgerError::StorageUnavailable(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO accounts
                 (id, number, full_name, email, credential_ref, balance, version, created_at, entries)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(account.id.to_string())
        .bind(account.number.as_str().to_string())
        .bind(account.full_name.clone())
        .bind(account.email.clone())
        .bind(account.credential_ref.clone())
        .bind(account.balance.minor_units())
        .bind(account.version as i64)
        .bind(account.created_at)
        .bind(entries)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(account),
            // The UNIQUE constraints are the final authority on number and
            // email collisions, whatever the allocator pre-checked.
            Err(sqlx::Error::Database(db)) if db.message().contains("accounts.number") => {
                Err(LedgerError::DuplicateAccountNumber(account.number.clone()))
            }
            Err(sqlx::Error::Database(db)) if db.message().contains("accounts.email") => {
                Err(LedgerError::DuplicateEmail(account.email.clone()))
            }
            Err(err) => Err(storage(err)),
        }
    }

    async fn compare_and_swap(
        &self,
        id: AccountId,
        expected_version: u64,
        mutate: Mutator,
    ) -> Result<Account, LedgerError> {
        let mut account = self.get(id).await?;
        if account.version != expected_version {
            return Err(LedgerError::VersionConflict(id));
        }
        mutate(&mut account)?;

        let mut tx = self.pool.begin().await.map_err(storage)?;
        Self::write_in_tx(&mut tx, &account, expected_version).await?;
        tx.commit().await.map_err(storage)?;

        account.version += 1;
        Ok(account)
    }

    async fn atomic_pair(
        &self,
        first: PairSide,
        second: PairSide,
    ) -> Result<(Account, Account), LedgerError> {
        if first.id == second.id {
            return Err(LedgerError::SelfTransfer);
        }

        // Dropping the transaction on any early return rolls everything back.
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let mut account_first = Self::fetch_in_tx(&mut tx, first.id).await?;
        let mut account_second = Self::fetch_in_tx(&mut tx, second.id).await?;

        if account_first.version != first.expected_version {
            return Err(LedgerError::VersionConflict(first.id));
        }
        if account_second.version != second.expected_version {
            return Err(LedgerError::VersionConflict(second.id));
        }

        (first.mutate)(&mut account_first)?;
        (second.mutate)(&mut account_second)?;

        Self::write_in_tx(&mut tx, &account_first, first.expected_version).await?;
        Self::write_in_tx(&mut tx, &account_second, second.expected_version).await?;
        tx.commit().await.map_err(storage)?;

        account_first.version += 1;
        account_second.version += 1;
        Ok((account_first, account_second))
    }
}
