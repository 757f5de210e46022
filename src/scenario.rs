//! Named scenarios and their resolved parameter sets
//!
//! A scenario applies the adjustment deltas from the [`ScenarioTable`] to a
//! prospect's [`ClientInputs`]. Resolution is pure so that sensitivity sweeps
//! and Monte Carlo runs can call it once per sample.
//!
//! [`ScenarioTable`]: crate::assumptions::ScenarioTable

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::assumptions::Assumptions;
use crate::error::RoiError;
use crate::inputs::ClientInputs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Conservative,
    Moderate,
    Aggressive,
}

impl Scenario {
    /// Conservative to aggressive
    pub const ALL: [Scenario; 3] = [Scenario::Conservative, Scenario::Moderate, Scenario::Aggressive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Conservative => "conservative",
            Scenario::Moderate => "moderate",
            Scenario::Aggressive => "aggressive",
        }
    }

    fn valid_names() -> Vec<String> {
        Scenario::ALL.iter().map(|s| s.as_str().to_string()).collect()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = RoiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Scenario::Conservative),
            "moderate" => Ok(Scenario::Moderate),
            "aggressive" => Ok(Scenario::Aggressive),
            _ => Err(RoiError::UnknownScenario {
                name: s.to_string(),
                valid: Scenario::valid_names(),
            }),
        }
    }
}

/// Scenario selection for a calculation: one named scenario or all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioSelector {
    Single(Scenario),
    All,
}

impl FromStr for ScenarioSelector {
    type Err = RoiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(ScenarioSelector::All);
        }
        s.parse::<Scenario>()
            .map(ScenarioSelector::Single)
            .map_err(|_| RoiError::UnknownScenario {
                name: s.to_string(),
                valid: Scenario::valid_names()
                    .into_iter()
                    .chain(std::iter::once("all".to_string()))
                    .collect(),
            })
    }
}

/// Client inputs after a scenario adjustment has been applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    pub scenario: Scenario,
    pub current_annual_cost: f64,
    /// Efficiency after scenario and industry multipliers, at most 1.0
    pub efficiency_gain: f64,
    pub annual_license_cost: f64,
    pub implementation_cost: f64,
    pub analysis_years: u32,
    pub discount_rate: f64,
    /// Delay (positive) or acceleration (negative) of benefit realization
    pub timeline_shift_months: i32,
}

/// Resolve the parameter set for `scenario`
pub fn apply(scenario: Scenario, inputs: &ClientInputs, assumptions: &Assumptions) -> ScenarioParameters {
    let adjustment = assumptions.scenarios.get(scenario);
    let industry_multiplier = assumptions.industries.multiplier(inputs.industry());

    let efficiency_gain = (inputs.efficiency_gain()
        * adjustment.efficiency_multiplier
        * industry_multiplier)
        .min(1.0);

    let params = ScenarioParameters {
        scenario,
        current_annual_cost: inputs.current_annual_cost(),
        efficiency_gain,
        annual_license_cost: inputs.annual_license_cost() * adjustment.cost_multiplier,
        implementation_cost: inputs.implementation_cost() * adjustment.cost_multiplier,
        analysis_years: inputs.analysis_years(),
        discount_rate: inputs.discount_rate() + adjustment.discount_rate_delta,
        timeline_shift_months: adjustment.timeline_shift_months,
    };

    debug!(
        "{} scenario: efficiency {:.4}, license {:.2}, implementation {:.2}, rate {:.4}",
        scenario, params.efficiency_gain, params.annual_license_cost, params.implementation_cost, params.discount_rate
    );

    params
}

/// Resolve a scenario by name
pub fn apply_named(name: &str, inputs: &ClientInputs, assumptions: &Assumptions) -> Result<ScenarioParameters, RoiError> {
    let scenario: Scenario = name.parse()?;
    Ok(apply(scenario, inputs, assumptions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::Industry;
    use approx::assert_relative_eq;

    fn inputs() -> ClientInputs {
        ClientInputs::new(1_000_000.0, 0.30, 200_000.0, 150_000.0, 3, 0.10).unwrap()
    }

    #[test]
    fn test_moderate_is_identity() {
        let params = apply(Scenario::Moderate, &inputs(), &Assumptions::default());
        assert_eq!(params.efficiency_gain, 0.30);
        assert_eq!(params.annual_license_cost, 200_000.0);
        assert_eq!(params.implementation_cost, 150_000.0);
        assert_eq!(params.discount_rate, 0.10);
        assert_eq!(params.timeline_shift_months, 0);
    }

    #[test]
    fn test_conservative_adjustments() {
        let params = apply(Scenario::Conservative, &inputs(), &Assumptions::default());
        assert_relative_eq!(params.efficiency_gain, 0.24, epsilon = 1e-12);
        assert_relative_eq!(params.annual_license_cost, 250_000.0, epsilon = 1e-6);
        assert_relative_eq!(params.implementation_cost, 187_500.0, epsilon = 1e-6);
        assert_relative_eq!(params.discount_rate, 0.12, epsilon = 1e-12);
        assert_eq!(params.timeline_shift_months, 6);
    }

    #[test]
    fn test_efficiency_capped_at_one() {
        let high = ClientInputs::new(1_000_000.0, 0.95, 200_000.0, 150_000.0, 3, 0.10)
            .unwrap()
            .with_industry(Industry::AssetManagement);
        let params = apply(Scenario::Aggressive, &high, &Assumptions::default());
        assert_eq!(params.efficiency_gain, 1.0);
    }

    #[test]
    fn test_industry_multiplier() {
        let banking = inputs().with_industry(Industry::Banking);
        let params = apply(Scenario::Moderate, &banking, &Assumptions::default());
        assert_relative_eq!(params.efficiency_gain, 0.345, epsilon = 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let a = apply(Scenario::Aggressive, &inputs(), &Assumptions::default());
        let b = apply(Scenario::Aggressive, &inputs(), &Assumptions::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_scenario() {
        let err = apply_named("optimistic", &inputs(), &Assumptions::default()).unwrap_err();
        match err {
            RoiError::UnknownScenario { name, valid } => {
                assert_eq!(name, "optimistic");
                assert_eq!(valid, vec!["conservative", "moderate", "aggressive"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!("all".parse::<ScenarioSelector>().unwrap(), ScenarioSelector::All);
        assert_eq!(
            "Aggressive".parse::<ScenarioSelector>().unwrap(),
            ScenarioSelector::Single(Scenario::Aggressive)
        );
        assert!("best".parse::<ScenarioSelector>().is_err());
    }
}
