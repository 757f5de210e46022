//! Hidden-cost and escalation assumptions for TCO projections

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoiError};

/// Hidden costs as fractions of the ongoing (license/support) cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HiddenCostFactors {
    /// Temporary productivity dip while users adapt
    pub productivity_loss: f64,
    /// Configuration and integration work beyond the license
    pub customization: f64,
    /// Re-training after staff turnover
    pub turnover: f64,
}

impl HiddenCostFactors {
    pub fn total(&self) -> f64 {
        self.productivity_loss + self.customization + self.turnover
    }

    pub fn validate(&self) -> Result<()> {
        for (category, fraction) in [
            ("productivity_loss", self.productivity_loss),
            ("customization", self.customization),
            ("turnover", self.turnover),
        ] {
            if !fraction.is_finite() || fraction < 0.0 {
                return Err(RoiError::invalid(
                    format!("hidden_costs.{category}"),
                    format!("must be a non-negative fraction, got {fraction}"),
                ));
            }
        }
        Ok(())
    }

    /// Create from loaded `(category, fraction)` rows; unknown categories are ignored
    pub fn from_loaded(rows: &[(String, f64)]) -> Self {
        let mut factors = Self::default();
        for (category, fraction) in rows {
            match category.as_str() {
                "productivity_loss" => factors.productivity_loss = *fraction,
                "customization" => factors.customization = *fraction,
                "turnover" => factors.turnover = *fraction,
                other => log::warn!("Ignoring unknown hidden cost category '{other}'"),
            }
        }
        factors
    }
}

impl Default for HiddenCostFactors {
    fn default() -> Self {
        Self {
            productivity_loss: 0.05,
            customization: 0.08,
            turnover: 0.03,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TcoAssumptions {
    pub hidden_costs: HiddenCostFactors,
    /// Annual growth of ongoing costs (0.03 = 3% per year)
    pub annual_escalation: f64,
}

impl TcoAssumptions {
    pub fn validate(&self) -> Result<()> {
        self.hidden_costs.validate()?;
        if !self.annual_escalation.is_finite() || self.annual_escalation <= -1.0 {
            return Err(RoiError::invalid(
                "annual_escalation",
                format!("must be above -1, got {}", self.annual_escalation),
            ));
        }
        Ok(())
    }
}

impl Default for TcoAssumptions {
    fn default() -> Self {
        Self {
            hidden_costs: HiddenCostFactors::default(),
            annual_escalation: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_total_fraction() {
        assert_relative_eq!(HiddenCostFactors::default().total(), 0.16, epsilon = 1e-12);
    }

    #[test]
    fn test_from_loaded() {
        let factors = HiddenCostFactors::from_loaded(&[
            ("customization".to_string(), 0.12),
            ("office_plants".to_string(), 1.0),
        ]);
        assert_eq!(factors.customization, 0.12);
        assert_eq!(factors.turnover, 0.03);
    }

    #[test]
    fn test_validate() {
        assert!(TcoAssumptions::default().validate().is_ok());

        let negative_fraction = TcoAssumptions {
            hidden_costs: HiddenCostFactors { turnover: -0.01, ..Default::default() },
            ..Default::default()
        };
        assert!(matches!(
            negative_fraction.validate(),
            Err(RoiError::InvalidInput { field, .. }) if field == "hidden_costs.turnover"
        ));

        let collapsing = TcoAssumptions { annual_escalation: -1.0, ..Default::default() };
        assert!(matches!(
            collapsing.validate(),
            Err(RoiError::InvalidInput { field, .. }) if field == "annual_escalation"
        ));
    }
}
