//! ROI model: savings, net benefit, yearly ROI%, payback, NPV and IRR for a
//! scenario-adjusted business case

use log::{debug, warn};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::assumptions::Assumptions;
use crate::error::{Result, RoiError};
use crate::inputs::ClientInputs;
use crate::scenario::{self, Scenario, ScenarioParameters, ScenarioSelector};
use crate::time_value::{discounted_payback, npv, payback_months};

/// Metrics bundle for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub scenario: Scenario,
    pub annual_savings: f64,
    pub net_annual_benefit: f64,
    /// Implementation plus license over the horizon
    pub total_investment: f64,
    /// Net benefit over the horizon, after implementation
    pub net_benefit_total: f64,
    /// ROI% for years 1..=analysis_years
    pub roi_percent_by_year: Vec<f64>,
    /// None when the investment is never recovered
    pub payback_months: Option<f64>,
    pub discounted_payback_years: Option<u32>,
    pub npv: f64,
    /// None when the cash flows have no root inside the search interval
    pub irr: Option<f64>,
    /// Year 0 outlay followed by yearly net benefit
    pub cash_flows: Vec<f64>,
    pub parameters: ScenarioParameters,
}

impl RoiResult {
    /// ROI% at the end of the analysis horizon
    pub fn final_roi_percent(&self) -> f64 {
        self.roi_percent_by_year.last().copied().unwrap_or(0.0)
    }
}

/// Results for several scenarios in the order they were requested
///
/// Serializes as a map keyed by scenario name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScenarioResults {
    results: Vec<RoiResult>,
}

impl ScenarioResults {
    pub fn get(&self, scenario: Scenario) -> Option<&RoiResult> {
        self.results.iter().find(|r| r.scenario == scenario)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoiResult> {
        self.results.iter()
    }

    pub fn scenarios(&self) -> Vec<Scenario> {
        self.results.iter().map(|r| r.scenario).collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl Serialize for ScenarioResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for result in &self.results {
            map.serialize_entry(result.scenario.as_str(), result)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a ScenarioResults {
    type Item = &'a RoiResult;
    type IntoIter = std::slice::Iter<'a, RoiResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Output of [`RoiModel::calculate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RoiOutcome {
    Single(RoiResult),
    All(ScenarioResults),
}

/// ROI engine bound to one set of assumptions
#[derive(Debug, Clone)]
pub struct RoiModel {
    assumptions: Assumptions,
}

impl RoiModel {
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    /// Like [`RoiModel::new`], rejecting assumptions that fail validation
    pub fn try_new(assumptions: Assumptions) -> Result<Self> {
        assumptions.validate()?;
        Ok(Self { assumptions })
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Compute the metrics bundle for one scenario
    pub fn compute(&self, inputs: &ClientInputs, scenario: Scenario) -> Result<RoiResult> {
        // An unusable solver would make every IRR look absent
        self.assumptions.solver.validate()?;
        let params = scenario::apply(scenario, inputs, &self.assumptions);

        let annual_savings = params.current_annual_cost * params.efficiency_gain;
        let net_annual_benefit = annual_savings - params.annual_license_cost;
        let years = params.analysis_years;
        let implementation = params.implementation_cost;

        let mut cash_flows = Vec::with_capacity(years as usize + 1);
        cash_flows.push(-implementation);
        cash_flows.extend(std::iter::repeat(net_annual_benefit).take(years as usize));

        let roi_percent_by_year = (1..=years)
            .map(|y| {
                let y = y as f64;
                let invested = implementation + params.annual_license_cost * y;
                if invested <= 0.0 {
                    return Err(RoiError::Domain(format!(
                        "ROI undefined for zero investment in {scenario} scenario"
                    )));
                }
                Ok((net_annual_benefit * y - implementation) / invested * 100.0)
            })
            .collect::<Result<Vec<f64>>>()?;

        let payback = payback_with_shift(&params, net_annual_benefit)?;
        let npv = npv(&cash_flows, params.discount_rate)?;
        let discounted_payback_years = discounted_payback(&cash_flows, params.discount_rate)?;

        let irr = self.assumptions.solver.solve(&cash_flows);
        if irr.is_none() {
            debug!("{scenario} scenario: no IRR inside the search interval");
        }

        let result = RoiResult {
            scenario,
            annual_savings,
            net_annual_benefit,
            total_investment: implementation + params.annual_license_cost * years as f64,
            net_benefit_total: net_annual_benefit * years as f64 - implementation,
            roi_percent_by_year,
            payback_months: payback,
            discounted_payback_years,
            npv,
            irr,
            cash_flows,
            parameters: params,
        };

        debug!(
            "{} scenario: savings {:.2}, net benefit {:.2}, final ROI {:.2}%, NPV {:.2}",
            scenario,
            result.annual_savings,
            result.net_annual_benefit,
            result.final_roi_percent(),
            result.npv
        );

        Ok(result)
    }

    /// Compute one result per requested scenario, keeping the caller's order
    ///
    /// Repeated scenarios are computed once.
    pub fn compute_all(&self, inputs: &ClientInputs, scenarios: &[Scenario]) -> Result<ScenarioResults> {
        let mut results: Vec<RoiResult> = Vec::with_capacity(scenarios.len());
        for &scenario in scenarios {
            if results.iter().any(|r| r.scenario == scenario) {
                continue;
            }
            results.push(self.compute(inputs, scenario)?);
        }
        Ok(ScenarioResults { results })
    }

    /// Calculation entry point: one named scenario, or all of them
    pub fn calculate(&self, inputs: &ClientInputs, selector: ScenarioSelector) -> Result<RoiOutcome> {
        match selector {
            ScenarioSelector::Single(scenario) => self.compute(inputs, scenario).map(RoiOutcome::Single),
            ScenarioSelector::All => self.compute_all(inputs, &Scenario::ALL).map(RoiOutcome::All),
        }
    }

    /// Compute by scenario name
    pub fn compute_named(&self, inputs: &ClientInputs, name: &str) -> Result<RoiResult> {
        self.compute(inputs, name.parse()?)
    }
}

/// Simple payback on the implementation cost, shifted by the scenario timeline
fn payback_with_shift(params: &ScenarioParameters, net_annual_benefit: f64) -> Result<Option<f64>> {
    if params.implementation_cost == 0.0 {
        return Ok(Some(0.0));
    }

    match payback_months(params.implementation_cost, net_annual_benefit / 12.0) {
        Ok(months) => Ok(Some((months + params.timeline_shift_months as f64).max(0.0))),
        Err(RoiError::Domain(reason)) => {
            warn!("{} scenario: no payback ({reason})", params.scenario);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::{npv as npv_at, DEFAULT_TOLERANCE};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn model() -> RoiModel {
        RoiModel::new(Assumptions::default())
    }

    fn inputs() -> ClientInputs {
        ClientInputs::new(1_000_000.0, 0.30, 200_000.0, 150_000.0, 3, 0.10).unwrap()
    }

    #[test]
    fn test_unusable_solver_is_an_error_not_a_missing_irr() {
        let mut assumptions = Assumptions::default();
        assumptions.solver.lower = -1.0;

        assert!(matches!(
            RoiModel::try_new(assumptions.clone()),
            Err(RoiError::InvalidInput { ref field, .. }) if field == "irr_lower"
        ));
        assert!(matches!(
            RoiModel::new(assumptions).compute(&inputs(), Scenario::Moderate),
            Err(RoiError::InvalidInput { ref field, .. }) if field == "irr_lower"
        ));
        assert!(RoiModel::try_new(Assumptions::default()).is_ok());
    }

    #[test]
    fn test_moderate_business_case() {
        let result = model().compute(&inputs(), Scenario::Moderate).unwrap();

        assert_relative_eq!(result.annual_savings, 300_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.net_annual_benefit, 100_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.total_investment, 750_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.net_benefit_total, 150_000.0, epsilon = 1e-6);

        assert_eq!(result.roi_percent_by_year.len(), 3);
        assert_relative_eq!(result.roi_percent_by_year[0], -50_000.0 / 350_000.0 * 100.0, epsilon = 1e-9);
        assert_relative_eq!(result.roi_percent_by_year[1], 50_000.0 / 550_000.0 * 100.0, epsilon = 1e-9);
        assert_relative_eq!(result.roi_percent_by_year[2], 20.0, epsilon = 1e-9);

        assert_relative_eq!(result.payback_months.unwrap(), 18.0, epsilon = 1e-9);
        assert_eq!(result.discounted_payback_years, Some(2));
        assert_relative_eq!(result.npv, 98_685.199_098, epsilon = 1e-3);
        assert_eq!(result.cash_flows, vec![-150_000.0, 100_000.0, 100_000.0, 100_000.0]);

        let irr = result.irr.unwrap();
        assert!(npv_at(&result.cash_flows, irr).unwrap().abs() < DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_zero_efficiency_is_degenerate_not_error() {
        let flat = ClientInputs::new(1_000_000.0, 0.0, 200_000.0, 150_000.0, 3, 0.10).unwrap();
        let result = model().compute(&flat, Scenario::Moderate).unwrap();

        assert_eq!(result.annual_savings, 0.0);
        assert!(result.roi_percent_by_year.iter().all(|&roi| roi < 0.0));
        assert_eq!(result.payback_months, None);
        assert_eq!(result.discounted_payback_years, None);
        assert_eq!(result.irr, None);
    }

    #[test]
    fn test_zero_implementation_pays_back_immediately() {
        let no_impl = ClientInputs::new(1_000_000.0, 0.30, 200_000.0, 0.0, 3, 0.10).unwrap();
        let result = model().compute(&no_impl, Scenario::Conservative).unwrap();

        assert_eq!(result.payback_months, Some(0.0));
        assert_eq!(result.discounted_payback_years, Some(0));
    }

    #[test]
    fn test_timeline_shift_applied_to_payback() {
        let results = model().compute_all(&inputs(), &Scenario::ALL).unwrap();
        let conservative = results.get(Scenario::Conservative).unwrap();

        // 187,500 / ((240,000 - 250,000) / 12) never pays back
        assert_eq!(conservative.payback_months, None);

        let aggressive = results.get(Scenario::Aggressive).unwrap();
        let expected = 135_000.0 / ((345_000.0 - 180_000.0) / 12.0) - 3.0;
        assert_relative_eq!(aggressive.payback_months.unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_compute_all_keeps_caller_order() {
        let order = [Scenario::Aggressive, Scenario::Conservative, Scenario::Aggressive];
        let results = model().compute_all(&inputs(), &order).unwrap();
        assert_eq!(results.scenarios(), vec![Scenario::Aggressive, Scenario::Conservative]);
    }

    #[test]
    fn test_calculate_all_serializes_as_ordered_map() {
        let outcome = model().calculate(&inputs(), ScenarioSelector::All).unwrap();
        let json = serde_json::to_string(&outcome).unwrap();

        let conservative = json.find("\"conservative\"").unwrap();
        let moderate = json.find("\"moderate\":").unwrap();
        let aggressive = json.find("\"aggressive\":").unwrap();
        assert!(conservative < moderate && moderate < aggressive);
    }

    #[test]
    fn test_compute_named_unknown() {
        assert!(matches!(
            model().compute_named(&inputs(), "optimistic"),
            Err(RoiError::UnknownScenario { .. })
        ));
    }

    #[test]
    fn test_scenario_ordering_example() {
        let results = model().compute_all(&inputs(), &Scenario::ALL).unwrap();
        let roi = |s| results.get(s).unwrap().final_roi_percent();
        assert!(roi(Scenario::Conservative) <= roi(Scenario::Moderate));
        assert!(roi(Scenario::Moderate) <= roi(Scenario::Aggressive));
    }

    fn arb_inputs() -> impl Strategy<Value = ClientInputs> {
        (
            1_000.0..5_000_000.0f64,
            0.0..=1.0f64,
            0.0..1_000_000.0f64,
            1.0..1_000_000.0f64,
            1u32..=10,
            0.0..0.3f64,
        )
            .prop_map(|(current, eff, license, implementation, years, rate)| {
                ClientInputs::new(current, eff, license, implementation, years, rate).unwrap()
            })
    }

    proptest! {
        #[test]
        fn prop_roi_non_decreasing_with_positive_benefit(inputs in arb_inputs()) {
            let result = model().compute(&inputs, Scenario::Moderate).unwrap();
            if result.net_annual_benefit > 0.0 {
                for pair in result.roi_percent_by_year.windows(2) {
                    prop_assert!(pair[1] >= pair[0] - 1e-9);
                }
            }
        }

        #[test]
        fn prop_roi_stays_negative_with_negative_benefit(inputs in arb_inputs()) {
            let result = model().compute(&inputs, Scenario::Moderate).unwrap();
            if result.net_annual_benefit < 0.0 {
                prop_assert!(result.roi_percent_by_year.iter().all(|&roi| roi < 0.0));
                prop_assert!(result.payback_months.is_none());
            }
        }

        #[test]
        fn prop_conservative_never_beats_aggressive(inputs in arb_inputs()) {
            let results = model().compute_all(&inputs, &Scenario::ALL).unwrap();
            let roi = |s| results.get(s).unwrap().final_roi_percent();
            prop_assert!(roi(Scenario::Conservative) <= roi(Scenario::Moderate) + 1e-9);
            prop_assert!(roi(Scenario::Moderate) <= roi(Scenario::Aggressive) + 1e-9);
        }
    }
}
