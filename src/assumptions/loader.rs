//! CSV-based assumption loader
//!
//! Loads scenario magnitudes and benchmark defaults from CSV files in
//! data/assumptions/. Only the command-line front end calls this; the engine
//! receives the resulting [`Assumptions`](super::Assumptions) by value.

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::path::Path;

use crate::analysis::Variable;
use crate::inputs::Industry;
use crate::scenario::Scenario;

use super::adjustments::ScenarioAdjustment;
use super::simulation::VariableSpread;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// Trimmed column `index` of a record; short rows are an error, not a panic
fn column<'r>(record: &'r csv::StringRecord, index: usize, name: &str) -> Result<&'r str, Box<dyn Error>> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| format!("missing column {index} ({name})").into())
}

/// Load scenario adjustments from CSV
/// Columns: scenario, cost_multiplier, efficiency_multiplier, timeline_shift_months, discount_rate_delta
pub fn load_scenarios(path: &Path) -> Result<Vec<(Scenario, ScenarioAdjustment)>, Box<dyn Error>> {
    let file = File::open(path.join("scenarios.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let scenario: Scenario = column(&record, 0, "scenario")?.parse()?;
        let adjustment = ScenarioAdjustment {
            cost_multiplier: column(&record, 1, "cost_multiplier")?.parse()?,
            efficiency_multiplier: column(&record, 2, "efficiency_multiplier")?.parse()?,
            timeline_shift_months: column(&record, 3, "timeline_shift_months")?.parse()?,
            discount_rate_delta: column(&record, 4, "discount_rate_delta")?.parse()?,
        };
        rows.push((scenario, adjustment));
    }

    Ok(rows)
}

/// Load hidden cost factors from CSV
/// Returns Vec<(category, fraction_of_ongoing_cost)>
pub fn load_hidden_costs(path: &Path) -> Result<Vec<(String, f64)>, Box<dyn Error>> {
    let file = File::open(path.join("hidden_costs.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let category = column(&record, 0, "category")?.to_string();
        let fraction: f64 = column(&record, 1, "fraction")?.parse()?;
        rows.push((category, fraction));
    }

    Ok(rows)
}

/// Load industry efficiency multipliers from CSV
pub fn load_industry_multipliers(path: &Path) -> Result<HashMap<Industry, f64>, Box<dyn Error>> {
    let file = File::open(path.join("industry_multipliers.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut multipliers = HashMap::new();

    for result in reader.records() {
        let record = result?;
        let industry: Industry = column(&record, 0, "industry")?.parse()?;
        let multiplier: f64 = column(&record, 1, "multiplier")?.parse()?;
        multipliers.insert(industry, multiplier);
    }

    Ok(multipliers)
}

/// Load Monte Carlo triangular spreads from CSV
/// Columns: variable, low_multiplier, mode_multiplier, high_multiplier
pub fn load_monte_carlo_spreads(path: &Path) -> Result<Vec<VariableSpread>, Box<dyn Error>> {
    let file = File::open(path.join("monte_carlo_spreads.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut spreads = Vec::new();

    for result in reader.records() {
        let record = result?;
        let variable: Variable = column(&record, 0, "variable")?.parse()?;
        spreads.push(VariableSpread {
            variable,
            low_multiplier: column(&record, 1, "low_multiplier")?.parse()?,
            mode_multiplier: column(&record, 2, "mode_multiplier")?.parse()?,
            high_multiplier: column(&record, 3, "high_multiplier")?.parse()?,
        });
    }

    Ok(spreads)
}

/// Load scalar financial parameters from CSV
/// Returns HashMap<parameter_name, value>
pub fn load_financial_parameters(path: &Path) -> Result<HashMap<String, f64>, Box<dyn Error>> {
    let file = File::open(path.join("financial_parameters.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut parameters = HashMap::new();

    for result in reader.records() {
        let record = result?;
        let name = column(&record, 0, "name")?.to_string();
        let value: f64 = column(&record, 1, "value")?.parse()?;
        parameters.insert(name, value);
    }

    Ok(parameters)
}

/// All assumption tables as read from disk
pub struct LoadedAssumptions {
    pub scenarios: Vec<(Scenario, ScenarioAdjustment)>,
    pub hidden_costs: Vec<(String, f64)>,
    pub industry_multipliers: HashMap<Industry, f64>,
    pub monte_carlo_spreads: Vec<VariableSpread>,
    pub financial_parameters: HashMap<String, f64>,
}

impl LoadedAssumptions {
    /// Load all assumptions from the default path
    pub fn load_default() -> Result<Self, Box<dyn Error>> {
        Self::load_from(Path::new(DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load all assumptions from a specific path
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            scenarios: load_scenarios(path)?,
            hidden_costs: load_hidden_costs(path)?,
            industry_multipliers: load_industry_multipliers(path)?,
            monte_carlo_spreads: load_monte_carlo_spreads(path)?,
            financial_parameters: load_financial_parameters(path)?,
        })
    }

    /// Named scalar parameter, if present
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.financial_parameters.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_assumptions() {
        let result = LoadedAssumptions::load_default();
        assert!(result.is_ok(), "Failed to load assumptions: {:?}", result.err());

        let assumptions = result.unwrap();

        // All three scenarios present
        assert_eq!(assumptions.scenarios.len(), 3);
        assert!(assumptions
            .scenarios
            .iter()
            .any(|(s, a)| *s == Scenario::Conservative && a.timeline_shift_months == 6));

        assert_eq!(assumptions.hidden_costs.len(), 3);
        assert_eq!(assumptions.industry_multipliers.get(&Industry::Banking), Some(&1.15));
        assert_eq!(assumptions.monte_carlo_spreads.len(), 4);
        assert_eq!(assumptions.parameter("irr_max_iterations"), Some(1000.0));
    }

    #[test]
    fn test_short_row_is_an_error() {
        let dir = std::env::temp_dir().join(format!("roi_toolkit_short_row_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("hidden_costs.csv"), "category\ncustomization\n").unwrap();

        let result = load_hidden_costs(&dir);
        std::fs::remove_dir_all(&dir).unwrap();

        let message = result.unwrap_err().to_string();
        assert!(message.contains("fraction"), "unexpected error: {message}");
    }

    #[test]
    fn test_missing_directory() {
        assert!(LoadedAssumptions::load_from(Path::new("does/not/exist")).is_err());
    }
}
