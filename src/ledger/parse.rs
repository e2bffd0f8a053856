use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::LedgerError;

use super::address::Address;
use super::transaction::{Amount, Transaction};

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawTransaction {
    #[serde(default)]
    pub(super) hash: Option<String>,
    #[serde(default, rename = "blockNumber")]
    pub(super) block_number: Option<Value>,
    #[serde(default, rename = "timeStamp", alias = "timestamp")]
    pub(super) time_stamp: Option<Value>,
    pub(super) from: String,
    #[serde(default)]
    pub(super) to: Option<String>,
    #[serde(default)]
    pub(super) value: Value,
}

/// Well-formed entries plus the number of entries that could not be read.
#[derive(Debug, Default)]
pub(super) struct ParsedHistory {
    pub(super) entries: Vec<RawTransaction>,
    pub(super) skipped: usize,
}

/// Decimal or `0x` hex, given as a JSON number or a string.
fn integer_field(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => {
            let text = text.trim();
            match hex_digits(text) {
                Some(digits) => u64::from_str_radix(digits, 16).ok(),
                None => text.parse().ok(),
            }
        }
        _ => None,
    }
}

fn hex_digits(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

impl RawTransaction {
    pub(super) fn block(&self) -> Option<u64> {
        self.block_number.as_ref().and_then(integer_field)
    }

    pub(super) fn timestamp(&self) -> Option<u64> {
        self.time_stamp.as_ref().and_then(integer_field)
    }

    /// Compares endpoints only, so records that fail conversion can be
    /// filtered out before they are looked at.
    pub(super) fn involves(&self, address: &Address) -> bool {
        Address::new(&self.from) == *address
            || self
                .to
                .as_deref()
                .is_some_and(|to| Address::new(to) == *address)
    }

    /// Strings always count base units (wei), so fractional strings are
    /// rejected. JSON numbers are display units.
    pub(super) fn amount(&self) -> Result<Amount> {
        match &self.value {
            Value::Null => Ok(Amount::BaseUnits(0)),
            Value::String(text) => {
                let text = text.trim();
                match hex_digits(text) {
                    Some(digits) => u128::from_str_radix(digits, 16)
                        .map(Amount::BaseUnits)
                        .with_context(|| format!("invalid hex amount {text:?}")),
                    None => text
                        .parse::<u128>()
                        .map(Amount::BaseUnits)
                        .with_context(|| {
                            format!("amount {text:?} is not a whole number of base units")
                        }),
                }
            }
            Value::Number(number) => number
                .as_f64()
                .map(Amount::Decimal)
                .ok_or_else(|| anyhow!("amount {number} is not representable")),
            other => Err(anyhow!("unexpected amount type: {other}")),
        }
    }

    pub(super) fn into_transaction(self) -> Result<Transaction> {
        let amount = self.amount()?;
        let block = self.block();
        let timestamp = self.timestamp();
        Ok(
            Transaction::new(&self.from, self.to.as_deref(), amount)
                .with_receipt(self.hash, block, timestamp),
        )
    }
}

/// Accepts the explorer envelope (`{"status": .., "result": [..]}`) or a bare
/// array of transactions. Entries that do not deserialize are skipped.
pub(super) fn parse_history_output(raw: &str) -> Result<ParsedHistory> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in history export")?;

    let entries = match parsed {
        Value::Array(entries) => entries,
        Value::Object(mut object) => {
            if let Some(status) = object.get("status").and_then(Value::as_str)
                && status != "1"
            {
                let message = object
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                // The explorer reports an empty history as a failed status.
                if message.eq_ignore_ascii_case("No transactions found") {
                    return Ok(ParsedHistory::default());
                }
                return Err(LedgerError::Source(message.to_owned()).into());
            }

            match object.remove("result") {
                Some(Value::Array(entries)) => entries,
                Some(_) => return Err(anyhow!("history export `result` is not an array")),
                None => return Err(anyhow!("history export has no `result` field")),
            }
        }
        _ => return Err(anyhow!("unexpected JSON type in history export")),
    };

    let mut history = ParsedHistory::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match RawTransaction::deserialize(entry) {
            Ok(entry) => history.entries.push(entry),
            Err(error) => {
                warn!(index, "skipping malformed history entry: {error}");
                history.skipped += 1;
            }
        }
    }
    Ok(history)
}
