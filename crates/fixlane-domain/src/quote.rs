//! Quote domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;

/// Status of a provider's quote. Exactly one quote per request may end up
/// `accepted`; its siblings are `rejected` in the same unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    Accepted,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownVariant::new("quote status", other)),
        }
    }
}

/// Condition of a part listed on a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartCondition {
    Oem,
    Aftermarket,
    Used,
}

impl PartCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Oem => "OEM",
            Self::Aftermarket => "AFTERMARKET",
            Self::Used => "USED",
        }
    }
}

impl FromStr for PartCondition {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OEM" => Ok(Self::Oem),
            "AFTERMARKET" => Ok(Self::Aftermarket),
            "USED" => Ok(Self::Used),
            other => Err(UnknownVariant::new("part condition", other)),
        }
    }
}
