//! Wire-facing request and response shapes
//!
//! Mirrors what the HTTP layer serves: camelCase fields, a
//! `{ success, message?, account? }` envelope, and amounts rendered as
//! major-unit decimal strings.

use chrono::{DateTime, Utc};
use minibank_core::{Account, Amount, AmountError, EntryKind, LedgerEntry, LedgerError};
use serde::{Deserialize, Serialize};

/// Account as shown to the owner. Never exposes the credential reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub account_number: String,
    pub balance: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            account_number: account.number.to_string(),
            balance: account.balance.to_string(),
        }
    }
}

/// One journal entry as shown in the history listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub id: String,
    pub kind: EntryKind,
    pub amount: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_entry_id: Option<String>,
}

impl From<&LedgerEntry> for EntryView {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            kind: entry.kind,
            amount: entry.amount.to_string(),
            description: entry.description.clone(),
            timestamp: entry.timestamp,
            related_entry_id: entry.related_entry_id.map(|id| id.to_string()),
        }
    }
}

/// The response envelope the HTTP layer wraps every operation in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountView>,
}

impl ApiResponse {
    pub fn ok(account: &Account) -> Self {
        Self {
            success: true,
            message: None,
            account: Some(AccountView::from(account)),
        }
    }

    pub fn error(err: &LedgerError) -> Self {
        Self {
            success: false,
            message: Some(err.to_string()),
            account: None,
        }
    }
}

/// Transfer request body: `{ recipientAccountNumber, amount, description? }`
/// with the amount as a JSON number of major units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub recipient_account_number: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TransferRequest {
    /// Convert the JSON number into minor units, rejecting negatives and
    /// anything finer than cents.
    pub fn amount(&self) -> Result<Amount, AmountError> {
        let decimal = rust_decimal::Decimal::try_from(self.amount)
            .map_err(|_| AmountError::Unparseable(self.amount.to_string()))?;
        decimal.to_string().parse()
    }
}
