use crate::domain::ports::TransactionLog;
use crate::domain::transaction::{Transaction, TransactionDraft, TransactionId};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct LogState {
    entries: VecDeque<Transaction>,
    last_id: u64,
}

/// A thread-safe, append-only in-memory transaction log.
///
/// Sequence numbers are assigned under the same write lock that inserts the
/// record, so the front of the log always holds the highest id.
#[derive(Default, Clone)]
pub struct InMemoryTransactionLog {
    state: Arc<RwLock<LogState>>,
}

impl InMemoryTransactionLog {
    /// Creates a new, empty in-memory transaction log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionLog for InMemoryTransactionLog {
    async fn append(&self, draft: TransactionDraft) -> Result<Transaction> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let tx = draft.complete(TransactionId(state.last_id));
        state.entries.push_front(tx.clone());
        Ok(tx)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Transaction>> {
        let state = self.state.read().await;
        Ok(state.entries.iter().take(limit).cloned().collect())
    }

    async fn all_transactions(&self) -> Result<Vec<Transaction>> {
        let state = self.state.read().await;
        Ok(state.entries.iter().cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.entries.len())
    }

    async fn total_amount(&self) -> Result<Decimal> {
        let state = self.state.read().await;
        Ok(state.entries.iter().map(|tx| tx.amount.value()).sum())
    }
}
