use std::fmt;
use std::str::FromStr;

use crate::error::{BuildstampError, Result};

/// Monotonic build counter stored in `.build_num`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct BuildNumber(pub u64);

impl BuildNumber {
    pub fn new(value: u64) -> Self {
        BuildNumber(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Parse build number file content; surrounding whitespace is ignored
    pub fn parse(text: &str) -> Result<Self> {
        text.parse().map_err(BuildstampError::version)
    }

    /// Next build number, or `None` on overflow
    pub fn increment(&self) -> Option<Self> {
        self.0.checked_add(1).map(BuildNumber)
    }
}

impl FromStr for BuildNumber {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("expected a non-negative integer, got '{}'", trimmed));
        }
        trimmed
            .parse::<u64>()
            .map(BuildNumber)
            .map_err(|e| format!("invalid build number '{}': {}", trimmed, e))
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
