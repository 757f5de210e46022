//! Industry benchmark multipliers on efficiency gain

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoiError};
use crate::inputs::Industry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryMultipliers {
    multipliers: HashMap<Industry, f64>,
}

impl IndustryMultipliers {
    /// Create from loaded CSV data; industries not listed use 1.0
    pub fn from_loaded(multipliers: &HashMap<Industry, f64>) -> Self {
        Self {
            multipliers: multipliers.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (industry, &multiplier) in &self.multipliers {
            if !multiplier.is_finite() || multiplier <= 0.0 {
                return Err(RoiError::invalid(
                    format!("industry_multipliers.{industry}"),
                    format!("must be positive, got {multiplier}"),
                ));
            }
        }
        Ok(())
    }

    /// Efficiency multiplier for an industry (1.0 if not benchmarked)
    pub fn multiplier(&self, industry: Industry) -> f64 {
        self.multipliers.get(&industry).copied().unwrap_or(1.0)
    }
}

impl Default for IndustryMultipliers {
    fn default() -> Self {
        let mut multipliers = HashMap::new();
        multipliers.insert(Industry::Banking, 1.15);
        multipliers.insert(Industry::Insurance, 1.10);
        multipliers.insert(Industry::AssetManagement, 1.20);
        multipliers.insert(Industry::Payments, 1.05);
        Self { multipliers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_multipliers() {
        let benchmarks = IndustryMultipliers::default();
        assert_eq!(benchmarks.multiplier(Industry::Insurance), 1.10);
        assert_eq!(benchmarks.multiplier(Industry::Retail), 1.0);
        assert_eq!(benchmarks.multiplier(Industry::General), 1.0);
    }

    #[test]
    fn test_non_positive_multiplier_rejected() {
        assert!(IndustryMultipliers::default().validate().is_ok());
        let loaded = HashMap::from([(Industry::Banking, 0.0)]);
        assert!(IndustryMultipliers::from_loaded(&loaded).validate().is_err());
    }
}
