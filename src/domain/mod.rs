//! Domain types of the wallet: accounts, prepaid cards, payment requests and
//! transaction records, plus the storage ports the ledger engine talks to.

pub mod account;
pub mod card;
pub mod ports;
pub mod request;
pub mod transaction;
