use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prepaid card networks.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    OperatorA,
    OperatorB,
    OperatorC,
    Wifi,
}

impl Network {
    /// Prefix of every redemption code minted for this network.
    pub fn code_prefix(&self) -> &'static str {
        match self {
            Network::OperatorA => "OPA",
            Network::OperatorB => "OPB",
            Network::OperatorC => "OPC",
            Network::Wifi => "WIFI",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::OperatorA => "operator-a",
            Network::OperatorB => "operator-b",
            Network::OperatorC => "operator-c",
            Network::Wifi => "wifi",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Available,
    Reserved,
    Redeemed,
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardStatus::Available => "available",
            CardStatus::Reserved => "reserved",
            CardStatus::Redeemed => "redeemed",
        };
        f.write_str(name)
    }
}

/// Identity of a card inside the catalog.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub struct CardKey {
    pub network: Network,
    pub face_value: u32,
    pub index: u32,
}

/// A prepaid redemption unit.
///
/// Status only ever moves forward: `available -> reserved -> redeemed`, or
/// straight from `available` to `redeemed`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Card {
    pub key: CardKey,
    pub code: String,
    pub serial: String,
    pub status: CardStatus,
}

impl Card {
    pub fn new(key: CardKey, code: String, serial: String) -> Self {
        Self {
            key,
            code,
            serial,
            status: CardStatus::Available,
        }
    }

    pub fn network(&self) -> Network {
        self.key.network
    }

    pub fn face_value(&self) -> u32 {
        self.key.face_value
    }

    pub fn is_available(&self) -> bool {
        self.status == CardStatus::Available
    }

    /// Holds an available card for a pending recharge.
    pub fn reserve(&mut self) -> Result<(), LedgerError> {
        match self.status {
            CardStatus::Available => {
                self.status = CardStatus::Reserved;
                Ok(())
            }
            from => Err(self.transition_error(from, CardStatus::Reserved)),
        }
    }

    /// Marks the card as consumed.
    pub fn redeem(&mut self) -> Result<(), LedgerError> {
        match self.status {
            CardStatus::Available | CardStatus::Reserved => {
                self.status = CardStatus::Redeemed;
                Ok(())
            }
            from => Err(self.transition_error(from, CardStatus::Redeemed)),
        }
    }

    fn transition_error(&self, from: CardStatus, to: CardStatus) -> LedgerError {
        LedgerError::InvalidCardTransition {
            serial: self.serial.clone(),
            from,
            to,
        }
    }
}
