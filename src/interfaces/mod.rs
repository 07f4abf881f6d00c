//! Adapters between the ledger engine and the outside world: CSV requests in,
//! JSON responses and a CSV ledger export out.

pub mod csv;
pub mod json;
