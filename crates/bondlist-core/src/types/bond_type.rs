//! Bond market segment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BondError;

/// Market segment of a bond; each segment is published as its own market table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BondType {
    /// Federal loan bonds.
    #[serde(rename = "gov")]
    Government,
    /// Regional and municipal bonds.
    #[serde(rename = "mun")]
    Municipal,
    /// Corporate bonds.
    #[serde(rename = "corp")]
    Corporate,
    /// Foreign-currency sovereign and corporate bonds.
    #[serde(rename = "euro")]
    Eurobond,
}

impl BondType {
    /// Every segment, in report order.
    pub const ALL: [BondType; 4] = [
        BondType::Government,
        BondType::Municipal,
        BondType::Corporate,
        BondType::Eurobond,
    ];

    /// Short code used in configuration and on the command line.
    pub fn code(self) -> &'static str {
        match self {
            BondType::Government => "gov",
            BondType::Municipal => "mun",
            BondType::Corporate => "corp",
            BondType::Eurobond => "euro",
        }
    }

    /// Human-readable segment name.
    pub fn name(self) -> &'static str {
        match self {
            BondType::Government => "Government",
            BondType::Municipal => "Municipal",
            BondType::Corporate => "Corporate",
            BondType::Eurobond => "Eurobond",
        }
    }
}

impl fmt::Display for BondType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BondType {
    type Err = BondError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gov" | "government" => Ok(BondType::Government),
            "mun" | "municipal" => Ok(BondType::Municipal),
            "corp" | "corporate" => Ok(BondType::Corporate),
            "euro" | "eurobond" => Ok(BondType::Eurobond),
            _ => Err(BondError::UnknownBondType {
                name: s.to_string(),
            }),
        }
    }
}
