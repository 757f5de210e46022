//! Scalar outcomes that sensitivity and simulation runs track

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RoiResult;
use crate::error::RoiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMetric {
    /// ROI% in the final analysis year
    #[default]
    Roi,
    Npv,
    NetAnnualBenefit,
}

impl TargetMetric {
    pub const ALL: [TargetMetric; 3] = [TargetMetric::Roi, TargetMetric::Npv, TargetMetric::NetAnnualBenefit];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMetric::Roi => "roi",
            TargetMetric::Npv => "npv",
            TargetMetric::NetAnnualBenefit => "net_annual_benefit",
        }
    }

    pub fn extract(&self, result: &RoiResult) -> f64 {
        match self {
            TargetMetric::Roi => result.final_roi_percent(),
            TargetMetric::Npv => result.npv,
            TargetMetric::NetAnnualBenefit => result.net_annual_benefit,
        }
    }
}

impl fmt::Display for TargetMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetMetric {
    type Err = RoiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "roi" | "roi_percent" => Ok(TargetMetric::Roi),
            "npv" => Ok(TargetMetric::Npv),
            "net_annual_benefit" | "net_benefit" => Ok(TargetMetric::NetAnnualBenefit),
            _ => {
                let valid: Vec<&str> = TargetMetric::ALL.iter().map(|m| m.as_str()).collect();
                Err(RoiError::invalid(
                    "metric",
                    format!("unknown metric '{s}' (valid: {})", valid.join(", ")),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("ROI".parse::<TargetMetric>().unwrap(), TargetMetric::Roi);
        assert_eq!("net-annual-benefit".parse::<TargetMetric>().unwrap(), TargetMetric::NetAnnualBenefit);
        assert!(matches!("irr".parse::<TargetMetric>(), Err(RoiError::InvalidInput { .. })));
    }
}
