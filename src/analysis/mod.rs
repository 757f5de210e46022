//! Sensitivity analysis and Monte Carlo simulation around the ROI model

mod monte_carlo;
mod percentile;
mod sensitivity;
mod variable;

pub use monte_carlo::{ConfidenceInterval, MonteCarloResult, MonteCarloSimulator, TriangularSpec, PARALLEL_CHUNK_SIZE};
pub use percentile::percentile_sorted;
pub use sensitivity::{BreakEvenReport, SensitivityAnalyzer, SensitivityPoint, SensitivityResult, TornadoBar, MAX_SWEEP_STEPS};
pub use variable::Variable;

use serde::Serialize;

use crate::error::Result;
use crate::inputs::ClientInputs;
use crate::model::{RoiModel, TargetMetric};
use crate::scenario::Scenario;

/// Default number of points in a sweep
pub const DEFAULT_SWEEP_STEPS: usize = 5;

/// Parameters of one sensitivity request
#[derive(Debug, Clone)]
pub struct SensitivityRequest {
    pub variable: String,
    pub range_fraction: f64,
    pub steps: usize,
    pub scenario: Scenario,
    pub metric: TargetMetric,
    /// Run a Monte Carlo simulation over the default spreads instead of a sweep
    pub monte_carlo: bool,
    /// Defaults to the configured iteration count
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
}

impl SensitivityRequest {
    pub fn sweep(variable: impl Into<String>, range_fraction: f64) -> Self {
        Self {
            variable: variable.into(),
            range_fraction,
            steps: DEFAULT_SWEEP_STEPS,
            scenario: Scenario::Moderate,
            metric: TargetMetric::Roi,
            monte_carlo: false,
            iterations: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensitivityOutcome {
    Sweep(SensitivityResult),
    MonteCarlo(MonteCarloResult),
}

/// Sensitivity entry point: a one-variable sweep or a Monte Carlo run
///
/// The variable name is validated in both modes.
pub fn run_sensitivity(
    model: &RoiModel,
    inputs: &ClientInputs,
    request: &SensitivityRequest,
) -> Result<SensitivityOutcome> {
    let variable: Variable = request.variable.parse()?;

    if request.monte_carlo {
        let mut simulator = MonteCarloSimulator::new(model)
            .with_scenario(request.scenario)
            .with_metric(request.metric);
        if let Some(seed) = request.seed {
            simulator = simulator.with_seed(seed);
        }
        let iterations = request.iterations.unwrap_or_else(|| simulator.default_iterations());
        let specs = simulator.default_specs(inputs);
        return simulator
            .simulate(inputs, iterations, &specs)
            .map(SensitivityOutcome::MonteCarlo);
    }

    SensitivityAnalyzer::new(model)
        .with_scenario(request.scenario)
        .with_metric(request.metric)
        .sweep(inputs, variable, request.range_fraction, request.steps)
        .map(SensitivityOutcome::Sweep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::Assumptions;
    use crate::error::RoiError;

    fn inputs() -> ClientInputs {
        ClientInputs::new(1_000_000.0, 0.30, 200_000.0, 150_000.0, 3, 0.10).unwrap()
    }

    #[test]
    fn test_sweep_request() {
        let model = RoiModel::new(Assumptions::default());
        let outcome = run_sensitivity(&model, &inputs(), &SensitivityRequest::sweep("efficiency", 0.2)).unwrap();
        match outcome {
            SensitivityOutcome::Sweep(result) => {
                assert_eq!(result.variable, Variable::EfficiencyGain);
                assert_eq!(result.points.len(), DEFAULT_SWEEP_STEPS);
            }
            other => panic!("expected sweep, got {other:?}"),
        }
    }

    #[test]
    fn test_monte_carlo_request() {
        let model = RoiModel::new(Assumptions::default());
        let request = SensitivityRequest {
            monte_carlo: true,
            iterations: Some(500),
            seed: Some(7),
            ..SensitivityRequest::sweep("efficiency_gain", 0.2)
        };
        match run_sensitivity(&model, &inputs(), &request).unwrap() {
            SensitivityOutcome::MonteCarlo(result) => assert_eq!(result.iterations, 500),
            other => panic!("expected Monte Carlo, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_variable_in_either_mode() {
        let model = RoiModel::new(Assumptions::default());
        let mut request = SensitivityRequest::sweep("headcount", 0.2);
        assert!(matches!(
            run_sensitivity(&model, &inputs(), &request),
            Err(RoiError::UnknownVariable { .. })
        ));
        request.monte_carlo = true;
        assert!(matches!(
            run_sensitivity(&model, &inputs(), &request),
            Err(RoiError::UnknownVariable { .. })
        ));
    }
}
