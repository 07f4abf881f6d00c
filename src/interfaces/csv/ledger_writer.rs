use crate::domain::transaction::Transaction;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct LedgerRow<'a> {
    id: u64,
    account: &'a str,
    kind: String,
    amount: String,
    status: String,
    details: String,
    created_at: String,
}

impl<'a> From<&'a Transaction> for LedgerRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        let details = tx
            .details
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(";");
        Self {
            id: tx.id.0,
            account: tx.account.as_str(),
            kind: tx.kind.to_string(),
            amount: tx.amount.to_string(),
            status: tx.status.to_string(),
            details,
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// Exports the transaction log as CSV, one row per transaction.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_transactions<'a>(
        &mut self,
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> Result<()> {
        for tx in transactions {
            self.writer.serialize(LedgerRow::from(tx))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
