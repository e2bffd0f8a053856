use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

const ADDRESS_HEX_LEN: usize = 40;

/// Lower-cased account identifier used as the node identity key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_lowercase())
    }

    /// Validates before normalizing. Use this for user input; transaction
    /// endpoints go through [`Address::new`].
    pub fn parse(input: &str) -> Result<Self, LedgerError> {
        if is_valid(input) {
            Ok(Self::new(input))
        } else {
            Err(LedgerError::InvalidAddress(input.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_valid(input: &str) -> bool {
    let input = input.trim();
    let Some(body) = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    else {
        return false;
    };

    body.len() == ADDRESS_HEX_LEN && hex::decode(body).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(Address::new("  0xAbC "), Address::new("0xabc"));
        assert_eq!(Address::new("0xABC").as_str(), "0xabc");
    }

    #[test]
    fn validates_hex_body() {
        assert!(is_valid("0x52908400098527886E0F7030069857D2E4169EE7"));
        assert!(is_valid("0xde709f2102306220921060314715629080e2fb77"));
        assert!(!is_valid("52908400098527886E0F7030069857D2E4169EE7"));
        assert!(!is_valid("0x52908400098527886E0F7030069857D2E4169EE"));
        assert!(!is_valid("0xZZ908400098527886E0F7030069857D2E4169EE7"));
        assert!(!is_valid(""));
    }

    #[test]
    fn parse_rejects_invalid_input() {
        let error = Address::parse("0xnope").unwrap_err();
        assert!(matches!(error, LedgerError::InvalidAddress(ref raw) if raw == "0xnope"));
        assert!(Address::parse("0xDE709F2102306220921060314715629080E2FB77").is_ok());
    }
}
