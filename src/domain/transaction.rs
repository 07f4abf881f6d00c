use super::account::{AccountId, Amount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind-specific key/value payload attached to a transaction.
pub type Details = BTreeMap<String, String>;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    NetworkRecharge,
    WifiRecharge,
    ElectricityPayment,
    WaterPayment,
    SchoolPayment,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionKind::NetworkRecharge => "network-recharge",
            TransactionKind::WifiRecharge => "wifi-recharge",
            TransactionKind::ElectricityPayment => "electricity-payment",
            TransactionKind::WaterPayment => "water-payment",
            TransactionKind::SchoolPayment => "school-payment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Completed,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Completed => f.write_str("completed"),
            TransactionStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Sequence number assigned by the transaction log. Starts at 1.
#[derive(
    Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy,
)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A fully enriched transaction waiting for its sequence number.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionDraft {
    pub account: AccountId,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub details: Details,
    pub created_at: DateTime<Utc>,
}

impl TransactionDraft {
    pub fn complete(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            account: self.account,
            kind: self.kind,
            amount: self.amount,
            status: TransactionStatus::Completed,
            details: self.details,
            created_at: self.created_at,
        }
    }
}

/// Immutable record of one completed balance-affecting operation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub account: AccountId,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub status: TransactionStatus,
    pub details: Details,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_draft_completes_with_status() {
        let mut details = Details::new();
        details.insert("billNumber".to_string(), "WTR1700000000000".to_string());
        let draft = TransactionDraft {
            account: "admin".into(),
            kind: TransactionKind::WaterPayment,
            amount: Amount::new(dec!(150)).unwrap(),
            details,
            created_at: Utc::now(),
        };

        let tx = draft.clone().complete(TransactionId(7));
        assert_eq!(tx.id, TransactionId(7));
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.amount, draft.amount);
        assert_eq!(tx.details["billNumber"], "WTR1700000000000");
    }

    #[test]
    fn test_transaction_serialization() {
        let tx = TransactionDraft {
            account: "admin".into(),
            kind: TransactionKind::NetworkRecharge,
            amount: Amount::new(dec!(2000)).unwrap(),
            details: Details::new(),
            created_at: Utc::now(),
        }
        .complete(TransactionId(1));

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["kind"], "network-recharge");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["amount"], "2000");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_kind_display_matches_serde() {
        for kind in [
            TransactionKind::NetworkRecharge,
            TransactionKind::WifiRecharge,
            TransactionKind::ElectricityPayment,
            TransactionKind::WaterPayment,
            TransactionKind::SchoolPayment,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
