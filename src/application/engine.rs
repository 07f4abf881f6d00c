use super::statistics::Statistics;
use crate::domain::account::{Account, AccountId, Amount, Balance};
use crate::domain::card::{Card, CardStatus};
use crate::domain::ports::{AccountStoreBox, CardCatalogBox, TransactionLogBox};
use crate::domain::request::PaymentRequest;
use crate::domain::transaction::{Transaction, TransactionDraft, TransactionKind};
use crate::error::{LedgerError, Result};
use crate::infrastructure::in_memory::InMemoryTransactionLog;
use crate::infrastructure::inventory::InventoryStore;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use tracing::{info, warn};

/// The sole authority for debiting accounts and appending to the transaction log.
///
/// Every submission runs its balance check, detail enrichment, debit and log
/// append while holding the target account's lock. Submissions for the same
/// account are therefore serialized; submissions for different accounts run in
/// parallel.
pub struct LedgerEngine {
    accounts: AccountStoreBox,
    cards: CardCatalogBox,
    log: TransactionLogBox,
}

impl LedgerEngine {
    /// Creates a new `LedgerEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `accounts` - The account registry.
    /// * `cards` - The prepaid card catalog recharges draw from.
    /// * `log` - The append-only transaction log.
    pub fn new(accounts: AccountStoreBox, cards: CardCatalogBox, log: TransactionLogBox) -> Self {
        Self {
            accounts,
            cards,
            log,
        }
    }

    /// Wires an engine to an already initialized inventory and a fresh in-memory log.
    pub fn with_inventory(inventory: InventoryStore) -> Self {
        Self::new(
            Box::new(inventory.clone()),
            Box::new(inventory),
            Box::new(InMemoryTransactionLog::new()),
        )
    }

    /// Validates and applies one payment request.
    ///
    /// Fails with `AccountNotFound`, `InvalidAmount`, `UnsupportedProvider`,
    /// `InsufficientFunds` or `CardGenerationCollision`. A failed submission changes nothing and is
    /// not recorded in the log.
    pub async fn submit(&self, request: PaymentRequest) -> Result<Transaction> {
        let account = request.account.clone();
        let kind = request.kind();
        let amount = request.amount;

        match self.apply(request).await {
            Ok(tx) => {
                info!(
                    id = %tx.id,
                    account = %tx.account,
                    %kind,
                    amount = %tx.amount,
                    "Transaction completed"
                );
                Ok(tx)
            }
            Err(e) => {
                warn!(%account, %kind, %amount, error = %e, "Submission rejected");
                Err(e)
            }
        }
    }

    async fn apply(&self, request: PaymentRequest) -> Result<Transaction> {
        let PaymentRequest {
            account: account_id,
            amount,
            payload,
        } = request;
        let kind = payload.kind();

        let mut account = self
            .accounts
            .lock(&account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;

        let amount = Amount::new(amount)?;
        let network = payload.network()?;
        account.ensure_funds(amount)?;

        let created_at = Utc::now();
        let mut details = payload.details();

        let card = match network {
            Some(network) => Some(self.cards.take(network, face_value(amount)?).await?),
            None => None,
        };
        if let Some(card) = &card {
            details.insert("cardCode".to_string(), card.code.clone());
            if kind == TransactionKind::WifiRecharge {
                details.insert("serial".to_string(), card.serial.clone());
            }
        }
        if let Some((field, prefix)) = receipt_field(kind) {
            details.insert(
                field.to_string(),
                format!("{prefix}{}", created_at.timestamp_millis()),
            );
        }

        account.debit(amount)?;

        self.log
            .append(TransactionDraft {
                account: account_id,
                kind,
                amount,
                details,
                created_at,
            })
            .await
    }

    pub async fn account(&self, id: &AccountId) -> Result<Account> {
        self.accounts
            .get(id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))
    }

    pub async fn balance(&self, id: &AccountId) -> Result<Balance> {
        Ok(self.account(id).await?.balance)
    }

    /// The whole log, most recent first.
    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        self.log.all_transactions().await
    }

    /// The log entries of one account, most recent first.
    pub async fn transactions_for(&self, id: &AccountId) -> Result<Vec<Transaction>> {
        let mut transactions = self.log.all_transactions().await?;
        transactions.retain(|tx| &tx.account == id);
        Ok(transactions)
    }

    pub async fn find_card(&self, code: &str) -> Result<Option<Card>> {
        self.cards.find_by_code(code).await
    }

    pub async fn statistics(&self, recent: usize) -> Result<Statistics> {
        Ok(Statistics {
            total_accounts: self.accounts.count().await?,
            total_transactions: self.log.count().await?,
            total_amount: self.log.total_amount().await?,
            available_cards: self.cards.count_by_status(CardStatus::Available).await?,
            recent_transactions: self.log.recent(recent).await?,
        })
    }
}

/// Recharge amounts name a card face value, so they must be whole numbers.
fn face_value(amount: Amount) -> Result<u32> {
    let value = amount.value();
    value
        .fract()
        .is_zero()
        .then(|| value.to_u32())
        .flatten()
        .ok_or_else(|| {
            LedgerError::InvalidAmount(format!(
                "recharge amount must be a whole card value, got {value}"
            ))
        })
}

/// Detail field and prefix of the receipt number minted for bill payments.
fn receipt_field(kind: TransactionKind) -> Option<(&'static str, &'static str)> {
    match kind {
        TransactionKind::ElectricityPayment => Some(("billNumber", "ELC")),
        TransactionKind::WaterPayment => Some(("billNumber", "WTR")),
        TransactionKind::SchoolPayment => Some(("receiptNumber", "SCH")),
        TransactionKind::NetworkRecharge | TransactionKind::WifiRecharge => None,
    }
}
