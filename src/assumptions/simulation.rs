//! Monte Carlo defaults

use serde::{Deserialize, Serialize};

use crate::analysis::Variable;
use crate::error::{Result, RoiError};

pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Retained samples are bounded by this iteration cap
pub const MAX_ITERATIONS: usize = 100_000;

pub const DEFAULT_HURDLE_ROI: f64 = 100.0;

/// Triangular spread around a base value, as multipliers of that value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableSpread {
    pub variable: Variable,
    pub low_multiplier: f64,
    pub mode_multiplier: f64,
    pub high_multiplier: f64,
}

impl VariableSpread {
    pub const fn new(variable: Variable, low_multiplier: f64, high_multiplier: f64) -> Self {
        Self {
            variable,
            low_multiplier,
            mode_multiplier: 1.0,
            high_multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloDefaults {
    pub default_iterations: usize,
    pub max_iterations: usize,
    /// Metric value a simulated outcome must exceed to count as clearing the hurdle
    pub hurdle: f64,
    pub spreads: Vec<VariableSpread>,
}

impl MonteCarloDefaults {
    /// Iteration bounds must nest inside the sample cap; spreads must be ordered and non-negative
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 || self.max_iterations > MAX_ITERATIONS {
            return Err(RoiError::invalid(
                "mc_max_iterations",
                format!("must be between 1 and {MAX_ITERATIONS}, got {}", self.max_iterations),
            ));
        }
        if self.default_iterations == 0 || self.default_iterations > self.max_iterations {
            return Err(RoiError::invalid(
                "mc_default_iterations",
                format!("must be between 1 and {}, got {}", self.max_iterations, self.default_iterations),
            ));
        }
        if !self.hurdle.is_finite() {
            return Err(RoiError::invalid("mc_hurdle", "must be finite"));
        }

        let mut seen = Vec::with_capacity(self.spreads.len());
        for spread in &self.spreads {
            let field = format!("monte_carlo_spreads.{}", spread.variable);
            if seen.contains(&spread.variable) {
                return Err(RoiError::invalid(field, "listed more than once"));
            }
            seen.push(spread.variable);

            let (low, mode, high) = (spread.low_multiplier, spread.mode_multiplier, spread.high_multiplier);
            let ordered = low.is_finite() && high.is_finite() && 0.0 <= low && low <= mode && mode <= high;
            if !ordered {
                return Err(RoiError::invalid(
                    field,
                    format!("multipliers must satisfy 0 <= low <= mode <= high, got {low}/{mode}/{high}"),
                ));
            }
        }
        Ok(())
    }
}

impl Default for MonteCarloDefaults {
    fn default() -> Self {
        Self {
            default_iterations: DEFAULT_ITERATIONS,
            max_iterations: MAX_ITERATIONS,
            hurdle: DEFAULT_HURDLE_ROI,
            spreads: vec![
                VariableSpread::new(Variable::EfficiencyGain, 0.7, 1.3),
                VariableSpread::new(Variable::ImplementationCost, 0.8, 1.4),
                VariableSpread::new(Variable::AnnualLicenseCost, 0.9, 1.1),
                VariableSpread::new(Variable::CurrentAnnualCost, 0.9, 1.1),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(MonteCarloDefaults::default().validate().is_ok());
    }

    #[test]
    fn test_iteration_bounds() {
        let above_cap = MonteCarloDefaults { max_iterations: MAX_ITERATIONS + 1, ..Default::default() };
        assert!(matches!(
            above_cap.validate(),
            Err(RoiError::InvalidInput { field, .. }) if field == "mc_max_iterations"
        ));

        let default_above_max = MonteCarloDefaults {
            default_iterations: 5_000,
            max_iterations: 1_000,
            ..Default::default()
        };
        assert!(matches!(
            default_above_max.validate(),
            Err(RoiError::InvalidInput { field, .. }) if field == "mc_default_iterations"
        ));
    }

    #[test]
    fn test_spread_ordering() {
        let mut defaults = MonteCarloDefaults::default();
        defaults.spreads[0].mode_multiplier = 2.0;
        assert!(defaults.validate().is_err());

        let mut defaults = MonteCarloDefaults::default();
        defaults.spreads.push(VariableSpread::new(Variable::EfficiencyGain, 0.5, 1.5));
        assert!(defaults.validate().is_err());
    }
}
