//! Industry classification of a prospect

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RoiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Banking,
    Insurance,
    AssetManagement,
    Payments,
    Healthcare,
    Manufacturing,
    Retail,
    Technology,
    #[default]
    General,
}

impl Industry {
    pub const ALL: [Industry; 9] = [
        Industry::Banking,
        Industry::Insurance,
        Industry::AssetManagement,
        Industry::Payments,
        Industry::Healthcare,
        Industry::Manufacturing,
        Industry::Retail,
        Industry::Technology,
        Industry::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Banking => "banking",
            Industry::Insurance => "insurance",
            Industry::AssetManagement => "asset_management",
            Industry::Payments => "payments",
            Industry::Healthcare => "healthcare",
            Industry::Manufacturing => "manufacturing",
            Industry::Retail => "retail",
            Industry::Technology => "technology",
            Industry::General => "general",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Industry {
    type Err = RoiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Industry::ALL
            .iter()
            .copied()
            .find(|industry| industry.as_str() == normalized)
            .ok_or_else(|| {
                RoiError::invalid(
                    "industry",
                    format!(
                        "unknown industry '{s}' (valid: {})",
                        Industry::ALL.map(|i| i.as_str()).join(", ")
                    ),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_industry() {
        assert_eq!("Banking".parse::<Industry>().unwrap(), Industry::Banking);
        assert_eq!("asset-management".parse::<Industry>().unwrap(), Industry::AssetManagement);
        assert!("mining".parse::<Industry>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for industry in Industry::ALL {
            assert_eq!(industry.to_string().parse::<Industry>().unwrap(), industry);
        }
    }
}
