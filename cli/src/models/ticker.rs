use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized ticker symbol (trimmed, upper-cased, never empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Normalize raw user input; returns `None` when nothing is left after trimming
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uppercases_and_trims() {
        assert_eq!(Ticker::parse("  aapl ").unwrap().as_str(), "AAPL");
        assert_eq!(Ticker::parse("brk-b").unwrap().to_string(), "BRK-B");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert!(Ticker::parse("").is_none());
        assert!(Ticker::parse("   ").is_none());
    }
}
