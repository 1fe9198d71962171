//! Ledger error taxonomy
//!
//! Every externally visible failure carries a stable kind so callers can
//! tell user-correctable conditions from transient ones and from system
//! faults.

use crate::account::{AccountId, AccountNumber};
use crate::amount::Amount;
use thiserror::Error;

/// Errors that can occur in ledger and store operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Amount, requested: Amount },

    #[error("cannot transfer to your own account")]
    SelfTransfer,

    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error("no account with number {0}")]
    UnknownAccountNumber(AccountNumber),

    #[error("account number {0} is already taken")]
    DuplicateAccountNumber(AccountNumber),

    #[error("email {0} is already registered")]
    DuplicateEmail(String),

    #[error("balance overflow on account {0}")]
    BalanceOverflow(AccountId),

    #[error("account {0} was modified concurrently")]
    VersionConflict(AccountId),

    #[error("operation did not commit after {attempts} attempts; safe to resubmit")]
    OperationFailed { attempts: u32 },

    #[error("transfer did not commit after {attempts} attempts; safe to resubmit")]
    TransferFailed { attempts: u32 },

    #[error("could not allocate a free account number after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl LedgerError {
    /// User-correctable conditions, surfaced verbatim to the caller.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount
                | LedgerError::InsufficientFunds { .. }
                | LedgerError::SelfTransfer
                | LedgerError::AccountNotFound(_)
                | LedgerError::UnknownAccountNumber(_)
                | LedgerError::DuplicateEmail(_)
        )
    }

    /// Transient conditions where resubmitting the same request is safe.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::VersionConflict(_)
                | LedgerError::OperationFailed { .. }
                | LedgerError::TransferFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(LedgerError::InvalidAmount.is_user_error());
        assert!(LedgerError::SelfTransfer.is_user_error());
        assert!(!LedgerError::InvalidAmount.is_transient());

        let conflict = LedgerError::VersionConflict(AccountId::new());
        assert!(conflict.is_transient());
        assert!(!conflict.is_user_error());

        let fatal = LedgerError::StorageUnavailable("down".into());
        assert!(!fatal.is_user_error());
        assert!(!fatal.is_transient());
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = LedgerError::InsufficientFunds {
            balance: Amount::new(1000).unwrap(),
            requested: Amount::new(1500).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: balance 10.00, requested 15.00"
        );
    }
}
