use super::account::{Account, AccountId};
use super::card::{Card, CardStatus, Network};
use super::transaction::{Transaction, TransactionDraft};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::ops::RangeInclusive;
use tokio::sync::OwnedMutexGuard;

/// Exclusive access to one account. Dropping the guard releases the account.
pub type AccountGuard = OwnedMutexGuard<Account>;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Locks the account for a check-then-debit sequence.
    async fn lock(&self, id: &AccountId) -> Result<Option<AccountGuard>>;
    async fn get(&self, id: &AccountId) -> Result<Option<Account>>;
    async fn count(&self) -> Result<usize>;
}

#[async_trait]
pub trait CardCatalog: Send + Sync {
    /// Reserves an available card of the given network and face value,
    /// minting a new one when the catalog has none left.
    async fn reserve(&self, network: Network, face_value: u32) -> Result<Card>;
    async fn redeem(&self, serial: &str) -> Result<Card>;
    /// Picks a card like `reserve` and redeems it in the same catalog write.
    async fn take(&self, network: Network, face_value: u32) -> Result<Card>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Card>>;
    async fn count_by_status(&self, status: CardStatus) -> Result<usize>;
    async fn all_cards(&self) -> Result<Vec<Card>>;
}

#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Assigns the next sequence number and puts the record at the front.
    async fn append(&self, draft: TransactionDraft) -> Result<Transaction>;
    /// Most recent first.
    async fn recent(&self, limit: usize) -> Result<Vec<Transaction>>;
    async fn all_transactions(&self) -> Result<Vec<Transaction>>;
    async fn count(&self) -> Result<usize>;
    async fn total_amount(&self) -> Result<Decimal>;
}

/// Source of pseudo-random numbers for card codes and serials.
pub trait CodeSource: Send + Sync {
    fn next_in(&self, range: RangeInclusive<u64>) -> u64;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type CardCatalogBox = Box<dyn CardCatalog>;
pub type TransactionLogBox = Box<dyn TransactionLog>;
pub type CodeSourceBox = Box<dyn CodeSource>;
