//! Application layer containing the ledger engine.
//!
//! `LedgerEngine` is the entry point for payment requests. It owns boxed
//! storage ports and serializes work per account through the account store's
//! locks.

pub mod engine;
pub mod statistics;
