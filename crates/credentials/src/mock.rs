//! Mock credential store for tests and the demo CLI
//!
//! Keeps plaintext pairs in memory, keyed by lowercase email. Good enough
//! to drive the login flow end to end; nothing here is meant to survive a
//! process restart.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use minibank_core::AccountId;

use crate::{AuthError, CredentialStore};

struct Record {
    password: String,
    account_id: AccountId,
}

/// In-memory [`CredentialStore`].
#[derive(Default)]
pub struct MockCredentialStore {
    records: RwLock<HashMap<String, Record>>,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register credentials for an account. Records are keyed by lowercase
    /// email; registering the same email again replaces the record.
    pub fn register(&self, email: &str, password: &str, account_id: AccountId) {
        let mut records = self.records.write().unwrap();
        records.insert(
            email.to_lowercase(),
            Record {
                password: password.to_string(),
                account_id,
            },
        );
    }

    /// Number of registered credential records
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn verify(&self, email: &str, password: &str) -> Result<AccountId, AuthError> {
        let records = self.records.read().unwrap();
        let record = records
            .get(&email.to_lowercase())
            .ok_or(AuthError::InvalidCredentials)?;
        if record.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(record.account_id)
    }
}
