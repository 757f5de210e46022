//! Input variables that sensitivity and simulation runs can vary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoiError};
use crate::inputs::ClientInputs;
use crate::time_value::{DEFAULT_IRR_LOWER, DEFAULT_IRR_UPPER};

/// Fraction of the base value used as the lower search bound where zero is not allowed
const NEAR_ZERO_FRACTION: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    CurrentAnnualCost,
    EfficiencyGain,
    AnnualLicenseCost,
    ImplementationCost,
    DiscountRate,
}

impl Variable {
    pub const ALL: [Variable; 5] = [
        Variable::EfficiencyGain,
        Variable::AnnualLicenseCost,
        Variable::ImplementationCost,
        Variable::CurrentAnnualCost,
        Variable::DiscountRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::CurrentAnnualCost => "current_annual_cost",
            Variable::EfficiencyGain => "efficiency_gain",
            Variable::AnnualLicenseCost => "annual_license_cost",
            Variable::ImplementationCost => "implementation_cost",
            Variable::DiscountRate => "discount_rate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Variable::CurrentAnnualCost => "Current Annual Cost",
            Variable::EfficiencyGain => "Efficiency Gain",
            Variable::AnnualLicenseCost => "Annual License Cost",
            Variable::ImplementationCost => "Implementation Cost",
            Variable::DiscountRate => "Discount Rate",
        }
    }

    /// Current value of this variable in `inputs`
    pub fn value(&self, inputs: &ClientInputs) -> f64 {
        match self {
            Variable::CurrentAnnualCost => inputs.current_annual_cost(),
            Variable::EfficiencyGain => inputs.efficiency_gain(),
            Variable::AnnualLicenseCost => inputs.annual_license_cost(),
            Variable::ImplementationCost => inputs.implementation_cost(),
            Variable::DiscountRate => inputs.discount_rate(),
        }
    }

    /// Copy of `inputs` with this variable replaced, re-validated
    pub fn with_value(&self, inputs: &ClientInputs, value: f64) -> Result<ClientInputs> {
        let mut raw = inputs.to_raw();
        match self {
            Variable::CurrentAnnualCost => raw.current_annual_cost = value,
            Variable::EfficiencyGain => raw.efficiency_gain = value,
            Variable::AnnualLicenseCost => raw.annual_license_cost = value,
            Variable::ImplementationCost => raw.implementation_cost = value,
            Variable::DiscountRate => raw.discount_rate = value,
        }
        ClientInputs::try_from(raw)
    }

    /// Largest value the variable may take, if bounded
    pub fn upper_limit(&self) -> Option<f64> {
        match self {
            Variable::EfficiencyGain => Some(1.0),
            _ => None,
        }
    }

    /// Bounded interval for break-even searches: from the bottom of the
    /// variable's domain up to twice its base value
    pub fn search_bounds(&self, inputs: &ClientInputs) -> (f64, f64) {
        let base = self.value(inputs);
        match self {
            Variable::CurrentAnnualCost => (base * NEAR_ZERO_FRACTION, base * 2.0),
            Variable::EfficiencyGain => (0.0, (base * 2.0).min(1.0)),
            // Implementation and license cannot both be zero
            Variable::AnnualLicenseCost => {
                let low = if inputs.implementation_cost() > 0.0 { 0.0 } else { base * NEAR_ZERO_FRACTION };
                (low, base * 2.0)
            }
            Variable::ImplementationCost => {
                let low = if inputs.annual_license_cost() > 0.0 { 0.0 } else { base * NEAR_ZERO_FRACTION };
                (low, base * 2.0)
            }
            Variable::DiscountRate => (DEFAULT_IRR_LOWER, DEFAULT_IRR_UPPER),
        }
    }

    fn valid_names() -> Vec<String> {
        Variable::ALL.iter().map(|v| v.as_str().to_string()).collect()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variable {
    type Err = RoiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "current_annual_cost" | "current_cost" => Ok(Variable::CurrentAnnualCost),
            "efficiency_gain" | "efficiency" => Ok(Variable::EfficiencyGain),
            "annual_license_cost" | "annual_license" | "license" => Ok(Variable::AnnualLicenseCost),
            "implementation_cost" | "implementation" => Ok(Variable::ImplementationCost),
            "discount_rate" => Ok(Variable::DiscountRate),
            _ => Err(RoiError::UnknownVariable {
                name: s.to_string(),
                valid: Variable::valid_names(),
            }),
        }
    }
}
