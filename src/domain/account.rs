use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::SubAssign;

/// Opaque account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a monetary value held by an account.
///
/// This is a wrapper around `rust_decimal::Decimal` so that balances never go
/// through floating point arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(pub Decimal);

/// Represents a strictly positive monetary amount for transactions.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(format!(
                "amount must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// A wallet account.
///
/// The balance is only ever changed through [`Account::debit`], which the
/// ledger engine calls while holding the account's lock.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub contact: String,
    pub balance: Balance,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(id: AccountId, name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            contact: contact.into(),
            balance: Balance::ZERO,
            admin: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_balance(mut self, balance: Balance) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    /// Fails with `InsufficientFunds` if `amount` exceeds the balance.
    pub fn ensure_funds(&self, amount: Amount) -> Result<(), LedgerError> {
        if self.balance >= Balance::from(amount) {
            Ok(())
        } else {
            Err(LedgerError::InsufficientFunds {
                requested: amount.value(),
                available: self.balance.value(),
            })
        }
    }

    /// Withdraws funds from the balance if sufficient
    pub fn debit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.ensure_funds(amount)?;
        self.balance -= Balance::from(amount);
        Ok(())
    }
}
