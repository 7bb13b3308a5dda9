use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identity of an account holder as supplied by the execution host.
///
/// The ledger treats addresses as opaque strings: it never derives,
/// verifies, or normalizes them. [`Address::new`] accepts any string
/// (including the empty one, which the ledger uses as the "no owner"
/// sentinel). User-facing input should go through [`Address::parse`],
/// which rejects empty and whitespace-bearing values.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap a raw host-supplied identity without validation.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The empty address, stored as the owner before initialization.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Parse a user-supplied address.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TypeError::InvalidAddress("address is empty".into()));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidAddress(format!(
                "address contains whitespace: {trimmed:?}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let addr = Address::parse("  AdNe6c3ce54e  ").unwrap();
        assert_eq!(addr.as_str(), "AdNe6c3ce54e");
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(matches!(
            Address::parse("   "),
            Err(TypeError::InvalidAddress(_))
        ));
    }

    #[test]
    fn parse_rejects_inner_whitespace() {
        assert!(Address::parse("alice bob").is_err());
    }

    #[test]
    fn new_accepts_anything() {
        assert!(Address::new("").is_empty());
        assert_eq!(Address::new("a b").as_str(), "a b");
    }

    #[test]
    fn from_str_matches_parse() {
        let addr: Address = "carol".parse().unwrap();
        assert_eq!(addr, Address::new("carol"));
    }

    #[test]
    fn serde_is_a_plain_string() {
        let addr = Address::new("dave");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"dave\"");
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn display_is_raw_value() {
        assert_eq!(Address::new("erin").to_string(), "erin");
        assert_eq!(format!("{:?}", Address::new("erin")), "Address(erin)");
    }
}
