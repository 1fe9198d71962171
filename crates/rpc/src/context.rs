//! Application context - wires the store, ledger, and credentials together

use std::sync::Arc;

use minibank_core::{Account, LedgerError};
use minibank_credentials::MockCredentialStore;
use minibank_ledger::{Ledger, OpenAccount};
use minibank_store::{AccountStore, MemoryStore, SqliteStore};

/// Everything a command needs to run.
pub struct AppContext {
    pub ledger: Ledger,
    pub credentials: Arc<MockCredentialStore>,
}

impl AppContext {
    /// Ephemeral context; state lives for the process lifetime only.
    pub fn in_memory() -> Self {
        let store: Arc<dyn AccountStore> = Arc::new(MemoryStore::new());
        Self {
            ledger: Ledger::new(store),
            credentials: Arc::new(MockCredentialStore::new()),
        }
    }

    /// SQLite-backed context at the given database URL.
    ///
    /// Account state is durable; the demo credential store is not, so
    /// `login` only sees registrations made in the same process run.
    pub async fn open(database_url: &str) -> Result<Self, LedgerError> {
        let store: Arc<dyn AccountStore> = Arc::new(SqliteStore::open(database_url).await?);
        Ok(Self {
            ledger: Ledger::new(store),
            credentials: Arc::new(MockCredentialStore::new()),
        })
    }

    /// Open an account and register its credentials.
    ///
    /// The demo credential store keys records by email, so the account's
    /// credential reference is its lowercase email.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, LedgerError> {
        let account = self
            .ledger
            .open_account(OpenAccount {
                full_name: full_name.to_string(),
                email: email.to_string(),
                credential_ref: email.to_lowercase(),
            })
            .await?;
        self.credentials.register(&account.email, password, account.id);
        Ok(account)
    }
}
