//! Credential verification capability
//!
//! Password storage, hashing, and token issuance live outside the ledger
//! core; the core only consumes this trait. [`MockCredentialStore`] backs
//! tests and the demo CLI; a production implementation would delegate to a
//! real identity service.

mod mock;

pub use mock::MockCredentialStore;

use async_trait::async_trait;
use minibank_core::AccountId;
use thiserror::Error;

/// Errors from credential verification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Deliberately covers both unknown email and wrong password, so the
    /// caller cannot probe which emails are registered.
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Maps a verified email/password pair to the owning account.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn verify(&self, email: &str, password: &str) -> Result<AccountId, AuthError>;
}
