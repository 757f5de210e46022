//! Scenario adjustment magnitudes

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoiError};
use crate::scenario::Scenario;

/// Deltas one scenario applies on top of the client inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAdjustment {
    /// Multiplier on implementation and license costs
    pub cost_multiplier: f64,
    /// Multiplier on the expected efficiency gain
    pub efficiency_multiplier: f64,
    /// Months added to (or removed from) the benefit realization timeline
    pub timeline_shift_months: i32,
    /// Added to the client discount rate
    pub discount_rate_delta: f64,
}

impl ScenarioAdjustment {
    /// Multipliers must be positive and the rate delta finite
    pub fn validate(&self, scenario: Scenario) -> Result<()> {
        let field = |name: &str| format!("scenarios.{scenario}.{name}");
        if !self.cost_multiplier.is_finite() || self.cost_multiplier <= 0.0 {
            return Err(RoiError::invalid(
                field("cost_multiplier"),
                format!("must be positive, got {}", self.cost_multiplier),
            ));
        }
        if !self.efficiency_multiplier.is_finite() || self.efficiency_multiplier <= 0.0 {
            return Err(RoiError::invalid(
                field("efficiency_multiplier"),
                format!("must be positive, got {}", self.efficiency_multiplier),
            ));
        }
        if !self.discount_rate_delta.is_finite() {
            return Err(RoiError::invalid(field("discount_rate_delta"), "must be finite"));
        }
        Ok(())
    }

    pub const IDENTITY: ScenarioAdjustment = ScenarioAdjustment {
        cost_multiplier: 1.0,
        efficiency_multiplier: 1.0,
        timeline_shift_months: 0,
        discount_rate_delta: 0.0,
    };
}

/// One adjustment per scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable {
    pub conservative: ScenarioAdjustment,
    pub moderate: ScenarioAdjustment,
    pub aggressive: ScenarioAdjustment,
}

impl ScenarioTable {
    pub fn get(&self, scenario: Scenario) -> &ScenarioAdjustment {
        match scenario {
            Scenario::Conservative => &self.conservative,
            Scenario::Moderate => &self.moderate,
            Scenario::Aggressive => &self.aggressive,
        }
    }

    pub fn validate(&self) -> Result<()> {
        Scenario::ALL
            .iter()
            .try_for_each(|&scenario| self.get(scenario).validate(scenario))
    }

    /// Create from loaded CSV rows, falling back to the defaults for missing scenarios
    pub fn from_loaded(rows: &[(Scenario, ScenarioAdjustment)]) -> Self {
        let mut table = Self::default();
        for (scenario, adjustment) in rows {
            match scenario {
                Scenario::Conservative => table.conservative = *adjustment,
                Scenario::Moderate => table.moderate = *adjustment,
                Scenario::Aggressive => table.aggressive = *adjustment,
            }
        }
        table
    }
}

impl Default for ScenarioTable {
    fn default() -> Self {
        Self {
            // Costs +25%, efficiency -20%, six months later, +2 points on the rate
            conservative: ScenarioAdjustment {
                cost_multiplier: 1.25,
                efficiency_multiplier: 0.80,
                timeline_shift_months: 6,
                discount_rate_delta: 0.02,
            },
            moderate: ScenarioAdjustment::IDENTITY,
            aggressive: ScenarioAdjustment {
                cost_multiplier: 0.90,
                efficiency_multiplier: 1.15,
                timeline_shift_months: -3,
                discount_rate_delta: -0.02,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookup() {
        let table = ScenarioTable::default();
        assert_eq!(*table.get(Scenario::Moderate), ScenarioAdjustment::IDENTITY);
        assert_eq!(table.get(Scenario::Conservative).timeline_shift_months, 6);
        assert!(table.get(Scenario::Aggressive).cost_multiplier < 1.0);
    }

    #[test]
    fn test_from_loaded_partial() {
        let custom = ScenarioAdjustment {
            cost_multiplier: 1.5,
            ..ScenarioAdjustment::IDENTITY
        };
        let table = ScenarioTable::from_loaded(&[(Scenario::Conservative, custom)]);
        assert_eq!(table.conservative, custom);
        assert_eq!(table.aggressive, ScenarioTable::default().aggressive);
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        assert!(ScenarioTable::default().validate().is_ok());

        let mut table = ScenarioTable::default();
        table.moderate.efficiency_multiplier = -1.0;
        match table.validate() {
            Err(RoiError::InvalidInput { field, .. }) => {
                assert_eq!(field, "scenarios.moderate.efficiency_multiplier")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        let mut table = ScenarioTable::default();
        table.aggressive.cost_multiplier = 0.0;
        assert!(table.validate().is_err());
    }
}
