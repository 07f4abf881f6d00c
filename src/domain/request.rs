use super::account::AccountId;
use super::card::Network;
use super::transaction::{Details, TransactionKind};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;

/// Kind-specific input of a payment request.
#[derive(Debug, PartialEq, Clone)]
pub enum Payload {
    NetworkRecharge { provider: Network, phone: String },
    WifiRecharge { customer: String },
    ElectricityPayment { meter_number: String },
    WaterPayment { account_number: String },
    SchoolPayment { student_name: String, school: String },
}

impl Payload {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Payload::NetworkRecharge { .. } => TransactionKind::NetworkRecharge,
            Payload::WifiRecharge { .. } => TransactionKind::WifiRecharge,
            Payload::ElectricityPayment { .. } => TransactionKind::ElectricityPayment,
            Payload::WaterPayment { .. } => TransactionKind::WaterPayment,
            Payload::SchoolPayment { .. } => TransactionKind::SchoolPayment,
        }
    }

    /// Network whose card a recharge consumes.
    ///
    /// Wifi cards are only sold through wifi recharges, which also hand out
    /// the card serial.
    pub fn network(&self) -> Result<Option<Network>> {
        match self {
            Payload::NetworkRecharge {
                provider: Network::Wifi,
                ..
            } => Err(LedgerError::UnsupportedProvider(Network::Wifi)),
            Payload::NetworkRecharge { provider, .. } => Ok(Some(*provider)),
            Payload::WifiRecharge { .. } => Ok(Some(Network::Wifi)),
            _ => Ok(None),
        }
    }

    /// Input fields carried over into the transaction details.
    pub fn details(&self) -> Details {
        let mut details = Details::new();
        match self {
            Payload::NetworkRecharge { provider, phone } => {
                details.insert("provider".to_string(), provider.to_string());
                details.insert("phone".to_string(), phone.clone());
            }
            Payload::WifiRecharge { customer } => {
                details.insert("customer".to_string(), customer.clone());
            }
            Payload::ElectricityPayment { meter_number } => {
                details.insert("meterNumber".to_string(), meter_number.clone());
            }
            Payload::WaterPayment { account_number } => {
                details.insert("accountNumber".to_string(), account_number.clone());
            }
            Payload::SchoolPayment {
                student_name,
                school,
            } => {
                details.insert("studentName".to_string(), student_name.clone());
                details.insert("school".to_string(), school.clone());
            }
        }
        details
    }
}

/// A request to debit `amount` from `account` for one of the payment kinds.
///
/// The amount is kept unvalidated here; the ledger engine rejects
/// non-positive values with `InvalidAmount`.
#[derive(Debug, PartialEq, Clone)]
pub struct PaymentRequest {
    pub account: AccountId,
    pub amount: Decimal,
    pub payload: Payload,
}

impl PaymentRequest {
    pub fn new(account: impl Into<AccountId>, amount: Decimal, payload: Payload) -> Self {
        Self {
            account: account.into(),
            amount,
            payload,
        }
    }

    pub fn network_recharge(
        account: impl Into<AccountId>,
        provider: Network,
        phone: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self::new(
            account,
            amount,
            Payload::NetworkRecharge {
                provider,
                phone: phone.into(),
            },
        )
    }

    pub fn wifi_recharge(
        account: impl Into<AccountId>,
        customer: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self::new(
            account,
            amount,
            Payload::WifiRecharge {
                customer: customer.into(),
            },
        )
    }

    pub fn electricity_payment(
        account: impl Into<AccountId>,
        meter_number: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self::new(
            account,
            amount,
            Payload::ElectricityPayment {
                meter_number: meter_number.into(),
            },
        )
    }

    pub fn water_payment(
        account: impl Into<AccountId>,
        account_number: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self::new(
            account,
            amount,
            Payload::WaterPayment {
                account_number: account_number.into(),
            },
        )
    }

    pub fn school_payment(
        account: impl Into<AccountId>,
        student_name: impl Into<String>,
        school: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self::new(
            account,
            amount,
            Payload::SchoolPayment {
                student_name: student_name.into(),
                school: school.into(),
            },
        )
    }

    pub fn kind(&self) -> TransactionKind {
        self.payload.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payload_details_use_wire_names() {
        let request =
            PaymentRequest::school_payment("admin", "Sara Ali", "Al-Noor School", dec!(300));
        assert_eq!(request.kind(), TransactionKind::SchoolPayment);

        let details = request.payload.details();
        assert_eq!(details["studentName"], "Sara Ali");
        assert_eq!(details["school"], "Al-Noor School");
        assert_eq!(details.len(), 2);
    }

    #[test]
    fn test_recharge_networks() {
        let network =
            PaymentRequest::network_recharge("admin", Network::OperatorC, "777000111", dec!(500));
        assert_eq!(network.payload.network().unwrap(), Some(Network::OperatorC));
        assert_eq!(network.payload.details()["provider"], "operator-c");

        let wifi = PaymentRequest::wifi_recharge("admin", "Home", dec!(200));
        assert_eq!(wifi.payload.network().unwrap(), Some(Network::Wifi));

        let water = PaymentRequest::water_payment("admin", "W-1001", dec!(200));
        assert_eq!(water.payload.network().unwrap(), None);
    }

    #[test]
    fn test_wifi_is_not_a_network_provider() {
        let request = PaymentRequest::network_recharge("admin", Network::Wifi, "777", dec!(500));
        assert!(matches!(
            request.payload.network(),
            Err(LedgerError::UnsupportedProvider(Network::Wifi))
        ));
    }
}
