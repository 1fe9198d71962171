//! CLI commands

use minibank_core::{Account, AccountNumber, Amount, LedgerError};
use minibank_credentials::CredentialStore;

use crate::api::{ApiResponse, EntryView};
use crate::context::AppContext;

/// Print the outcome of a mutating operation.
///
/// User-correctable and transient failures become a `success: false`
/// envelope (or a ❌ line); system faults propagate.
fn emit(
    json: bool,
    result: Result<Account, LedgerError>,
    on_success: impl FnOnce(&Account),
) -> Result<(), anyhow::Error> {
    match result {
        Ok(account) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&ApiResponse::ok(&account))?);
            } else {
                on_success(&account);
            }
            Ok(())
        }
        Err(err) if err.is_user_error() || err.is_transient() => {
            if json {
                println!("{}", serde_json::to_string_pretty(&ApiResponse::error(&err))?);
            } else {
                println!("❌ {err}");
            }
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Open a new account and register its credentials
pub async fn register(
    ctx: &AppContext,
    full_name: &str,
    email: &str,
    password: &str,
    json: bool,
) -> Result<(), anyhow::Error> {
    let result = ctx.register(full_name, email, password).await;
    emit(json, result, |account| {
        println!("✅ Account opened for {}", account.full_name);
        println!("   Account number: {}", account.number);
        println!("   Opening balance: {}", account.balance);
    })
}

/// Verify credentials and show the owning account
pub async fn login(
    ctx: &AppContext,
    email: &str,
    password: &str,
    json: bool,
) -> Result<(), anyhow::Error> {
    match ctx.credentials.verify(email, password).await {
        Ok(account_id) => {
            let result = ctx.ledger.account(account_id).await;
            emit(json, result, |account| {
                println!("✅ Welcome back, {}", account.full_name);
                println!("   Account number: {}", account.number);
                println!("   Balance: {}", account.balance);
            })
        }
        Err(err) => {
            if json {
                let envelope = ApiResponse {
                    success: false,
                    message: Some(err.to_string()),
                    account: None,
                };
                println!("{}", serde_json::to_string_pretty(&envelope)?);
            } else {
                println!("❌ {err}");
            }
            Ok(())
        }
    }
}

/// Deposit funds into an account
pub async fn deposit(
    ctx: &AppContext,
    number: &str,
    amount: &str,
    description: Option<String>,
    json: bool,
) -> Result<(), anyhow::Error> {
    let number: AccountNumber = number.parse()?;
    let amount: Amount = amount.parse()?;

    let account = match ctx.ledger.account_by_number(&number).await {
        Ok(account) => account,
        Err(err) => return emit(json, Err(err), |_| {}),
    };
    let result = ctx
        .ledger
        .deposit(
            account.id,
            amount,
            description.unwrap_or_else(|| "Deposit".to_string()),
        )
        .await;

    emit(json, result, |account| {
        println!("✅ Deposited {} to {}", amount, account.number);
        println!("   New balance: {}", account.balance);
    })
}

/// Withdraw funds from an account
pub async fn withdraw(
    ctx: &AppContext,
    number: &str,
    amount: &str,
    description: Option<String>,
    json: bool,
) -> Result<(), anyhow::Error> {
    let number: AccountNumber = number.parse()?;
    let amount: Amount = amount.parse()?;

    let account = match ctx.ledger.account_by_number(&number).await {
        Ok(account) => account,
        Err(err) => return emit(json, Err(err), |_| {}),
    };
    let result = ctx
        .ledger
        .withdraw(
            account.id,
            amount,
            description.unwrap_or_else(|| "Withdrawal".to_string()),
        )
        .await;

    emit(json, result, |account| {
        println!("✅ Withdrew {} from {}", amount, account.number);
        println!("   New balance: {}", account.balance);
    })
}

/// Transfer funds between two accounts
pub async fn transfer(
    ctx: &AppContext,
    from: &str,
    to: &str,
    amount: &str,
    description: Option<String>,
    json: bool,
) -> Result<(), anyhow::Error> {
    let from: AccountNumber = from.parse()?;
    let to: AccountNumber = to.parse()?;
    let amount: Amount = amount.parse()?;

    let sender = match ctx.ledger.account_by_number(&from).await {
        Ok(account) => account,
        Err(err) => return emit(json, Err(err), |_| {}),
    };
    let result = ctx.ledger.transfer(sender.id, &to, amount, description).await;

    emit(json, result, |account| {
        println!("✅ Transferred {} from {} to {}", amount, from, to);
        println!("   Sender balance: {}", account.balance);
    })
}

/// Show the current balance of an account
pub async fn balance(ctx: &AppContext, number: &str, json: bool) -> Result<(), anyhow::Error> {
    let number: AccountNumber = number.parse()?;
    let result = ctx.ledger.account_by_number(&number).await;

    emit(json, result, |account| {
        println!("Balance for {}: {}", account.number, account.balance);
    })
}

/// List an account's journal, most recent first
pub async fn history(ctx: &AppContext, number: &str, json: bool) -> Result<(), anyhow::Error> {
    let number: AccountNumber = number.parse()?;
    let account = match ctx.ledger.account_by_number(&number).await {
        Ok(account) => account,
        Err(err) => return emit(json, Err(err), |_| {}),
    };
    let entries = ctx.ledger.history(account.id).await?;

    if json {
        let views: Vec<EntryView> = entries.iter().map(EntryView::from).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No entries for {}", account.number);
        return Ok(());
    }

    println!("History for {} ({} entries):", account.number, entries.len());
    println!("{:-<78}", "");
    println!(
        "{:>12} | {:>10} | {:<28} | {}",
        "Kind", "Amount", "Description", "Date"
    );
    println!("{:-<78}", "");
    for entry in &entries {
        println!(
            "{:>12} | {:>10} | {:<28} | {}",
            entry.kind.to_string(),
            entry.amount.to_string(),
            entry.description,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        );
    }

    Ok(())
}
