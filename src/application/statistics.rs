use crate::domain::transaction::Transaction;
use rust_decimal::Decimal;
use serde::Serialize;

/// Snapshot returned by the statistics query.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_accounts: usize,
    pub total_transactions: usize,
    pub total_amount: Decimal,
    pub available_cards: usize,
    /// Most recent first.
    pub recent_transactions: Vec<Transaction>,
}
