#![allow(dead_code)]

use paypoint::application::engine::LedgerEngine;
use paypoint::config::{AccountSeed, InventoryConfig};
use paypoint::infrastructure::inventory::InventoryStore;
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

pub const HEADER: &str = "kind, account, amount, provider, phone, customer, \
                          meter_number, account_number, student_name, school";

pub async fn engine(config: &InventoryConfig) -> LedgerEngine {
    let inventory = InventoryStore::default();
    inventory
        .initialize(config)
        .await
        .expect("Failed to initialize inventory");
    LedgerEngine::with_inventory(inventory)
}

pub async fn engine_with_balance(balance: Decimal) -> LedgerEngine {
    engine(&InventoryConfig::default().with_seed_balance(balance)).await
}

pub fn seed(id: &str, balance: Decimal) -> AccountSeed {
    AccountSeed {
        id: id.to_string(),
        name: format!("User {id}"),
        contact: String::new(),
        balance,
        admin: false,
    }
}

/// Writes a request CSV with the standard header followed by `rows`.
pub fn requests_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}
