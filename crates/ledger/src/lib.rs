//! MiniBank ledger - the invariant-preserving operation layer
//!
//! All balance changes in the system go through this crate. Every
//! operation bundles its balance mutation and journal entry into a single
//! store commit; there is no path that writes one without the other.
//!
//! # Key Types
//! - [`Ledger`]: deposit, withdraw, transfer, history, open_account
//! - [`AccountNumberAllocator`]: collision-free 10-digit account numbers

mod allocator;
mod ops;

pub use allocator::AccountNumberAllocator;
pub use ops::{Ledger, OpenAccount, DEFAULT_RETRY_LIMIT, OPENING_BALANCE};
