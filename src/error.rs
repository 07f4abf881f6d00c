use crate::domain::card::{CardStatus, Network};
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Could not generate a unique {what} after {attempts} attempts")]
    CardGenerationCollision { what: &'static str, attempts: u32 },
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Card {serial} cannot move from {from} to {to}")]
    InvalidCardTransition {
        serial: String,
        from: CardStatus,
        to: CardStatus,
    },
    #[error("{0} cards cannot be sold as a network recharge")]
    UnsupportedProvider(Network),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Inventory store is already initialized")]
    AlreadyInitialized,
    #[error("Duplicate account id: {0}")]
    DuplicateAccount(String),
    #[error("Invalid inventory config: {0}")]
    InvalidConfig(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] serde_json::Error),
}

impl LedgerError {
    /// Stable name used in error response payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::AccountNotFound(_) => "AccountNotFound",
            LedgerError::InsufficientFunds { .. } => "InsufficientFunds",
            LedgerError::InvalidAmount(_) => "InvalidAmount",
            LedgerError::CardGenerationCollision { .. } => "CardGenerationCollision",
            LedgerError::CardNotFound(_) => "CardNotFound",
            LedgerError::InvalidCardTransition { .. } => "InvalidCardTransition",
            LedgerError::UnsupportedProvider(_) => "UnsupportedProvider",
            LedgerError::MissingField(_) => "MissingField",
            LedgerError::AlreadyInitialized => "AlreadyInitialized",
            LedgerError::DuplicateAccount(_) => "DuplicateAccount",
            LedgerError::InvalidConfig(_) => "InvalidConfig",
            LedgerError::CsvError(_) => "CsvError",
            LedgerError::IoError(_) => "IoError",
            LedgerError::ConfigError(_) => "ConfigError",
        }
    }
}
