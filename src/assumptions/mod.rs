//! Modeling assumptions: scenario magnitudes, hidden costs, industry benchmarks,
//! solver settings and Monte Carlo defaults

mod adjustments;
mod benchmarks;
mod simulation;
mod tco;
pub mod loader;

pub use adjustments::{ScenarioAdjustment, ScenarioTable};
pub use benchmarks::IndustryMultipliers;
pub use loader::LoadedAssumptions;
pub use simulation::{MonteCarloDefaults, VariableSpread, DEFAULT_HURDLE_ROI, DEFAULT_ITERATIONS, MAX_ITERATIONS};
pub use tco::{HiddenCostFactors, TcoAssumptions};

use std::path::Path;

use crate::error::{Result, RoiError};
use crate::time_value::IrrSolver;

/// Container for all model assumptions
#[derive(Debug, Clone, Default)]
pub struct Assumptions {
    pub scenarios: ScenarioTable,
    pub tco: TcoAssumptions,
    pub industries: IndustryMultipliers,
    pub solver: IrrSolver,
    pub monte_carlo: MonteCarloDefaults,
}

impl Assumptions {
    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> std::result::Result<Self, Box<dyn std::error::Error>> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let loaded = LoadedAssumptions::load_from(path)?;
        let assumptions = Self::from_loaded(&loaded)?;
        log::info!("Loaded assumptions from {}", path.display());
        Ok(assumptions)
    }

    /// Build from loaded tables; anything the files omit keeps its default
    ///
    /// Every value, loaded or defaulted, is checked. Nothing is clamped or
    /// truncated: an out-of-range parameter fails with `InvalidInput`.
    pub fn from_loaded(loaded: &LoadedAssumptions) -> Result<Self> {
        let defaults = Self::default();

        let solver = IrrSolver {
            lower: loaded.parameter("irr_lower").unwrap_or(defaults.solver.lower),
            upper: loaded.parameter("irr_upper").unwrap_or(defaults.solver.upper),
            max_iterations: match loaded.parameter("irr_max_iterations") {
                Some(v) => {
                    let count = whole_number("irr_max_iterations", v)?;
                    u32::try_from(count)
                        .map_err(|_| RoiError::invalid("irr_max_iterations", format!("{v} is too large")))?
                }
                None => defaults.solver.max_iterations,
            },
            tolerance: loaded.parameter("irr_tolerance").unwrap_or(defaults.solver.tolerance),
        };

        let mut monte_carlo = defaults.monte_carlo;
        if let Some(v) = loaded.parameter("mc_default_iterations") {
            monte_carlo.default_iterations = iteration_count("mc_default_iterations", v)?;
        }
        if let Some(v) = loaded.parameter("mc_max_iterations") {
            monte_carlo.max_iterations = iteration_count("mc_max_iterations", v)?;
        }
        if let Some(v) = loaded.parameter("mc_hurdle") {
            monte_carlo.hurdle = v;
        }
        if !loaded.monte_carlo_spreads.is_empty() {
            monte_carlo.spreads = loaded.monte_carlo_spreads.clone();
        }

        let assumptions = Self {
            scenarios: ScenarioTable::from_loaded(&loaded.scenarios),
            tco: TcoAssumptions {
                hidden_costs: HiddenCostFactors::from_loaded(&loaded.hidden_costs),
                annual_escalation: loaded
                    .parameter("annual_escalation")
                    .unwrap_or(defaults.tco.annual_escalation),
            },
            industries: IndustryMultipliers::from_loaded(&loaded.industry_multipliers),
            solver,
            monte_carlo,
        };
        assumptions.validate()?;
        Ok(assumptions)
    }

    pub fn validate(&self) -> Result<()> {
        self.scenarios.validate()?;
        self.tco.validate()?;
        self.industries.validate()?;
        self.solver.validate()?;
        self.monte_carlo.validate()
    }
}

/// Parameters are read as f64; counts must be exact non-negative integers
fn whole_number(name: &str, value: f64) -> Result<u64> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= u64::MAX as f64 {
        return Err(RoiError::invalid(name, format!("must be a whole number >= 0, got {value}")));
    }
    Ok(value as u64)
}

fn iteration_count(name: &str, value: f64) -> Result<usize> {
    let count = whole_number(name, value)?;
    usize::try_from(count).map_err(|_| RoiError::invalid(name, format!("{value} is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn test_csv_matches_defaults() {
        let from_csv = Assumptions::from_csv().expect("assumption files should load");
        let defaults = Assumptions::default();

        assert_eq!(from_csv.scenarios, defaults.scenarios);
        assert_eq!(from_csv.tco, defaults.tco);
        assert_eq!(from_csv.industries, defaults.industries);
        assert_eq!(from_csv.solver.max_iterations, defaults.solver.max_iterations);
        assert_eq!(from_csv.monte_carlo, defaults.monte_carlo);
    }

    #[test]
    fn test_partial_tables_keep_defaults() {
        let loaded = LoadedAssumptions {
            scenarios: vec![(Scenario::Aggressive, ScenarioAdjustment::IDENTITY)],
            hidden_costs: Vec::new(),
            industry_multipliers: Default::default(),
            monte_carlo_spreads: Vec::new(),
            financial_parameters: [("mc_hurdle".to_string(), 50.0)].into_iter().collect(),
        };
        let assumptions = Assumptions::from_loaded(&loaded).unwrap();

        assert_eq!(assumptions.scenarios.aggressive, ScenarioAdjustment::IDENTITY);
        assert_eq!(assumptions.scenarios.conservative.timeline_shift_months, 6);
        assert_eq!(assumptions.monte_carlo.hurdle, 50.0);
        assert_eq!(assumptions.monte_carlo.spreads.len(), 4);
        assert_eq!(assumptions.solver.upper, 10.0);
    }

    fn with_parameters(parameters: &[(&str, f64)]) -> LoadedAssumptions {
        LoadedAssumptions {
            scenarios: Vec::new(),
            hidden_costs: Vec::new(),
            industry_multipliers: Default::default(),
            monte_carlo_spreads: Vec::new(),
            financial_parameters: parameters.iter().map(|&(name, v)| (name.to_string(), v)).collect(),
        }
    }

    fn rejected_field(loaded: &LoadedAssumptions) -> String {
        match Assumptions::from_loaded(loaded) {
            Err(RoiError::InvalidInput { field, .. }) => field,
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_counts_must_be_whole_numbers() {
        assert_eq!(rejected_field(&with_parameters(&[("mc_max_iterations", -5.0)])), "mc_max_iterations");
        assert_eq!(rejected_field(&with_parameters(&[("irr_max_iterations", f64::NAN)])), "irr_max_iterations");
        assert_eq!(rejected_field(&with_parameters(&[("irr_max_iterations", 1000.7)])), "irr_max_iterations");
        assert_eq!(
            rejected_field(&with_parameters(&[("mc_default_iterations", 0.0)])),
            "mc_default_iterations"
        );

        let exact = Assumptions::from_loaded(&with_parameters(&[("irr_max_iterations", 250.0)])).unwrap();
        assert_eq!(exact.solver.max_iterations, 250);
    }

    #[test]
    fn test_solver_interval_checked() {
        assert_eq!(rejected_field(&with_parameters(&[("irr_lower", -1.0)])), "irr_lower");
        assert_eq!(
            rejected_field(&with_parameters(&[("irr_lower", 0.5), ("irr_upper", 0.2)])),
            "irr_upper"
        );
        assert_eq!(rejected_field(&with_parameters(&[("irr_tolerance", 0.0)])), "irr_tolerance");
    }

    #[test]
    fn test_table_values_checked() {
        let mut loaded = with_parameters(&[]);
        loaded.scenarios = vec![(
            Scenario::Moderate,
            ScenarioAdjustment {
                efficiency_multiplier: -1.0,
                ..ScenarioAdjustment::IDENTITY
            },
        )];
        assert_eq!(rejected_field(&loaded), "scenarios.moderate.efficiency_multiplier");

        let mut loaded = with_parameters(&[]);
        loaded.hidden_costs = vec![("customization".to_string(), -0.1)];
        assert_eq!(rejected_field(&loaded), "hidden_costs.customization");

        assert_eq!(rejected_field(&with_parameters(&[("annual_escalation", -1.5)])), "annual_escalation");
    }
}
