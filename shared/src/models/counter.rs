//! Counter Model
//!
//! 摊位有两个独立的服务线 (柜台)，每个柜台是一对收银 + 厨房终端。
//! 柜台在 JSON 中以整数 `1` / `2` 表示。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Service counter (billing + kitchen pair)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Counter {
    /// Counter 1, tokens prefixed with `B`
    One = 1,
    /// Counter 2, tokens prefixed with `G`
    Two = 2,
}

impl Counter {
    pub const ALL: [Counter; 2] = [Counter::One, Counter::Two];

    /// Numeric id used on the wire and in room names
    #[inline]
    pub const fn number(&self) -> u8 {
        *self as u8
    }

    /// Prefix of the sequential tokens handed out on this counter
    pub const fn token_prefix(&self) -> char {
        match self {
            Counter::One => 'B',
            Counter::Two => 'G',
        }
    }

    /// Resolve the counter owning a prefixed token (`B12` → One)
    pub fn from_token(token: &str) -> Option<Counter> {
        match token.chars().next()? {
            'B' => Some(Counter::One),
            'G' => Some(Counter::Two),
            _ => None,
        }
    }

    /// Key used by the availability document (`"1"` / `"2"`)
    pub fn key(&self) -> String {
        self.number().to_string()
    }
}

impl From<Counter> for u8 {
    fn from(counter: Counter) -> Self {
        counter.number()
    }
}

/// Error when converting from a number that is not a counter id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCounter(pub u8);

impl fmt::Display for InvalidCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid counter: {} (expected 1 or 2)", self.0)
    }
}

impl std::error::Error for InvalidCounter {}

impl TryFrom<u8> for Counter {
    type Error = InvalidCounter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Counter::One),
            2 => Ok(Counter::Two),
            other => Err(InvalidCounter(other)),
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_serde() {
        assert_eq!(serde_json::to_string(&Counter::Two).unwrap(), "2");
        let c: Counter = serde_json::from_str("1").unwrap();
        assert_eq!(c, Counter::One);
        assert!(serde_json::from_str::<Counter>("3").is_err());
    }

    #[test]
    fn test_counter_from_token() {
        assert_eq!(Counter::from_token("B17"), Some(Counter::One));
        assert_eq!(Counter::from_token("G2"), Some(Counter::Two));
        assert_eq!(Counter::from_token("123456"), None);
        assert_eq!(Counter::from_token(""), None);
    }
}
