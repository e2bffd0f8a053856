use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("Transaction source failed: {0}")]
    Source(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum AmountError {
    #[error("negative amount {0}")]
    Negative(f64),

    #[error("non-finite amount {0}")]
    NonFinite(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectedTransaction {
    #[error("transaction #{index} rejected: {source}")]
    Amount {
        index: usize,
        #[source]
        source: AmountError,
    },

    #[error("transaction #{index} rejected: empty sender")]
    EmptySender { index: usize },
}

impl RejectedTransaction {
    /// Position of the record in the input list.
    pub fn index(&self) -> usize {
        match self {
            Self::Amount { index, .. } | Self::EmptySender { index } => *index,
        }
    }
}
