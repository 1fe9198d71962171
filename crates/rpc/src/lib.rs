//! MiniBank RPC - the upward-facing surface
//!
//! Wires the store, ledger, and credential capability together and exposes
//! the JSON view shapes served by the HTTP layer plus the CLI commands of
//! the `minibank` binary.

pub mod api;
pub mod commands;
mod context;

pub use context::AppContext;
