use crate::error::AmountError;

use super::address::Address;

/// Base units per display unit (wei per ether).
pub const BASE_UNITS_PER_DISPLAY_UNIT: f64 = 1e18;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Amount {
    /// Integer amount in the smallest unit.
    BaseUnits(u128),
    /// Amount already expressed in the display unit.
    Decimal(f64),
}

impl Amount {
    pub fn to_display(self) -> Result<f64, AmountError> {
        let value = match self {
            Self::BaseUnits(units) => units as f64 / BASE_UNITS_PER_DISPLAY_UNIT,
            Self::Decimal(value) => value,
        };

        if !value.is_finite() {
            Err(AmountError::NonFinite(value))
        } else if value < 0.0 {
            Err(AmountError::Negative(value))
        } else {
            Ok(value)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub sender: Address,
    pub recipient: Option<Address>,
    pub amount: Amount,
    pub hash: Option<String>,
    pub block: Option<u64>,
    /// Unix seconds.
    pub timestamp: Option<u64>,
}

impl Transaction {
    pub fn new(sender: &str, recipient: Option<&str>, amount: Amount) -> Self {
        Self {
            sender: Address::new(sender),
            recipient: recipient.map(Address::new).filter(|address| !address.is_empty()),
            amount,
            hash: None,
            block: None,
            timestamp: None,
        }
    }

    /// Attaches the explorer's bookkeeping fields, shown in the transaction list.
    pub fn with_receipt(
        mut self,
        hash: Option<String>,
        block: Option<u64>,
        timestamp: Option<u64>,
    ) -> Self {
        self.hash = hash.filter(|hash| !hash.is_empty());
        self.block = block;
        self.timestamp = timestamp;
        self
    }
}
