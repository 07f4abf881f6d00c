use crate::domain::card::Network;
use crate::domain::request::{Payload, PaymentRequest};
use crate::domain::transaction::TransactionKind;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::str::FromStr;

/// One CSV row. Only the columns the row's `kind` needs have to be filled in.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RequestRecord {
    pub kind: TransactionKind,
    pub account: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub provider: Option<Network>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub meter_number: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T> {
    value.ok_or(LedgerError::MissingField(field))
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String> {
    required(value.filter(|v| !v.is_empty()), field)
}

impl TryFrom<RequestRecord> for PaymentRequest {
    type Error = LedgerError;

    fn try_from(record: RequestRecord) -> Result<Self> {
        if record.account.is_empty() {
            return Err(LedgerError::MissingField("account"));
        }

        let raw_amount = required_text(record.amount, "amount")?;
        let amount = Decimal::from_str(&raw_amount)
            .map_err(|_| LedgerError::InvalidAmount(format!("not a number: {raw_amount}")))?;

        let payload = match record.kind {
            TransactionKind::NetworkRecharge => Payload::NetworkRecharge {
                provider: required(record.provider, "provider")?,
                phone: required_text(record.phone, "phone")?,
            },
            TransactionKind::WifiRecharge => Payload::WifiRecharge {
                customer: required_text(record.customer, "customer")?,
            },
            TransactionKind::ElectricityPayment => Payload::ElectricityPayment {
                meter_number: required_text(record.meter_number, "meter_number")?,
            },
            TransactionKind::WaterPayment => Payload::WaterPayment {
                account_number: required_text(record.account_number, "account_number")?,
            },
            TransactionKind::SchoolPayment => Payload::SchoolPayment {
                student_name: required_text(record.student_name, "student_name")?,
                school: required_text(record.school, "school")?,
            },
        };

        Ok(PaymentRequest::new(record.account, amount, payload))
    }
}

/// Reads payment requests from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<PaymentRequest>`.
/// It handles whitespace trimming and rows that leave out trailing columns.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads, deserializes and validates requests.
    pub fn requests(self) -> impl Iterator<Item = Result<PaymentRequest>> {
        self.reader.into_deserialize().map(|result| {
            let record: RequestRecord = result.map_err(LedgerError::from)?;
            PaymentRequest::try_from(record)
        })
    }
}
