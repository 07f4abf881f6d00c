use crate::domain::account::{Account, AccountId, Balance};
use crate::domain::card::Network;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::iter;
use std::path::Path;

/// An account created when the inventory store is initialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contact: String,
    pub balance: Decimal,
    #[serde(default)]
    pub admin: bool,
}

impl AccountSeed {
    pub fn to_account(&self) -> Account {
        Account::new(AccountId::new(&self.id), &self.name, &self.contact)
            .with_balance(Balance::new(self.balance))
            .with_admin(self.admin)
    }
}

/// Face values stocked for one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Denominations {
    pub network: Network,
    pub face_values: Vec<u32>,
}

/// Everything `InventoryStore::initialize` needs.
///
/// Every field has a default, so a JSON config file only has to name the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub seed_account: AccountSeed,
    pub accounts: Vec<AccountSeed>,
    pub denominations: Vec<Denominations>,
    pub cards_per_denomination: u32,
    pub max_code_attempts: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        let operator_values = vec![100, 200, 500, 1000];
        Self {
            seed_account: AccountSeed {
                id: "admin".to_string(),
                name: "Ahmed Mohammed".to_string(),
                contact: "admin@paypoint.local".to_string(),
                balance: dec!(50000),
                admin: true,
            },
            accounts: Vec::new(),
            denominations: vec![
                Denominations {
                    network: Network::OperatorA,
                    face_values: operator_values.clone(),
                },
                Denominations {
                    network: Network::OperatorB,
                    face_values: operator_values.clone(),
                },
                Denominations {
                    network: Network::OperatorC,
                    face_values: operator_values,
                },
                Denominations {
                    network: Network::Wifi,
                    face_values: vec![200, 500, 1000],
                },
            ],
            cards_per_denomination: 10,
            max_code_attempts: 8,
        }
    }
}

impl InventoryConfig {
    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_seed_balance(mut self, balance: Decimal) -> Self {
        self.seed_account.balance = balance;
        self
    }

    pub fn with_account(mut self, seed: AccountSeed) -> Self {
        self.accounts.push(seed);
        self
    }

    /// Rejects configs that would start the store in a broken state.
    ///
    /// Opening balances must not be negative, account ids must be non-empty
    /// and unique across the seed and extra accounts, and minting needs at
    /// least one attempt.
    pub fn validate(&self) -> Result<()> {
        if self.max_code_attempts == 0 {
            return Err(LedgerError::InvalidConfig(
                "max_code_attempts must be at least 1".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        for seed in iter::once(&self.seed_account).chain(&self.accounts) {
            if seed.id.is_empty() {
                return Err(LedgerError::MissingField("id"));
            }
            if seed.balance < Decimal::ZERO {
                return Err(LedgerError::InvalidAmount(format!(
                    "opening balance of {} is negative: {}",
                    seed.id, seed.balance
                )));
            }
            if !ids.insert(seed.id.as_str()) {
                return Err(LedgerError::DuplicateAccount(seed.id.clone()));
            }
        }
        Ok(())
    }

    /// Total number of cards generated at initialization.
    pub fn catalog_size(&self) -> usize {
        let values: usize = self.denominations.iter().map(|d| d.face_values.len()).sum();
        values * self.cards_per_denomination as usize
    }
}
