//! One-factor-at-a-time sensitivity: sweeps, break-even search and tornado bars

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::Variable;
use crate::error::{Result, RoiError};
use crate::inputs::ClientInputs;
use crate::model::{RoiModel, TargetMetric};
use crate::scenario::Scenario;
use crate::time_value::DEFAULT_IRR_LOWER;

/// Upper bound on sweep resolution
pub const MAX_SWEEP_STEPS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub input_value: f64,
    pub metric_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub variable: Variable,
    pub metric: TargetMetric,
    pub scenario: Scenario,
    pub base_value: f64,
    pub base_metric: f64,
    /// Ascending by input value
    pub points: Vec<SensitivityPoint>,
    /// Input value where the metric crosses zero inside the swept range
    pub break_even: Option<f64>,
}

/// Break-even value of one variable relative to its base
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenReport {
    pub variable: Variable,
    pub scenario: Scenario,
    pub metric: TargetMetric,
    pub base_value: f64,
    pub break_even: Option<f64>,
    /// break_even / base_value
    pub break_even_multiplier: Option<f64>,
    /// Distance from base to break-even, as a percentage of the base
    pub margin_of_safety_percent: Option<f64>,
}

/// Metric at the low and high end of one variable's range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TornadoBar {
    pub variable: Variable,
    pub base_value: f64,
    pub low_value: f64,
    pub high_value: f64,
    pub base_metric: f64,
    pub low_metric: f64,
    pub high_metric: f64,
    /// |high_metric - low_metric|
    pub impact_range: f64,
}

/// Runs the ROI model as a black box of one input at a time
#[derive(Debug, Clone, Copy)]
pub struct SensitivityAnalyzer<'a> {
    model: &'a RoiModel,
    scenario: Scenario,
    metric: TargetMetric,
}

impl<'a> SensitivityAnalyzer<'a> {
    /// Moderate scenario, final-year ROI%
    pub fn new(model: &'a RoiModel) -> Self {
        Self {
            model,
            scenario: Scenario::Moderate,
            metric: TargetMetric::Roi,
        }
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = scenario;
        self
    }

    pub fn with_metric(mut self, metric: TargetMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Target metric for `inputs` under the configured scenario
    pub fn metric_at(&self, inputs: &ClientInputs) -> Result<f64> {
        let result = self.model.compute(inputs, self.scenario)?;
        Ok(self.metric.extract(&result))
    }

    fn metric_with(&self, inputs: &ClientInputs, variable: Variable, value: f64) -> Result<f64> {
        self.metric_at(&variable.with_value(inputs, value)?)
    }

    /// Evaluate the metric at `steps` evenly spaced values across
    /// `base * (1 ± range_fraction)`
    ///
    /// Values outside the variable's domain fail with `InvalidInput`.
    pub fn sweep(
        &self,
        inputs: &ClientInputs,
        variable: Variable,
        range_fraction: f64,
        steps: usize,
    ) -> Result<SensitivityResult> {
        if !(2..=MAX_SWEEP_STEPS).contains(&steps) {
            return Err(RoiError::invalid(
                "steps",
                format!("must be between 2 and {MAX_SWEEP_STEPS}, got {steps}"),
            ));
        }
        if !range_fraction.is_finite() || range_fraction < 0.0 {
            return Err(RoiError::invalid(
                "range_fraction",
                format!("must be a non-negative number, got {range_fraction}"),
            ));
        }

        let base_value = variable.value(inputs);
        if base_value == 0.0 {
            warn!("{variable} has a zero base value; sweep is flat");
        }

        let a = base_value * (1.0 - range_fraction);
        let b = base_value * (1.0 + range_fraction);
        let (start, end) = (a.min(b), a.max(b));
        let step = (end - start) / (steps - 1) as f64;

        let points = (0..steps)
            .map(|i| {
                let input_value = if i == steps - 1 { end } else { start + step * i as f64 };
                let metric_value = self.metric_with(inputs, variable, input_value)?;
                Ok(SensitivityPoint { input_value, metric_value })
            })
            .collect::<Result<Vec<_>>>()?;

        let base_metric = self.metric_at(inputs)?;
        let break_even = self.break_even_in_points(inputs, variable, &points)?;

        debug!(
            "Sweep of {} over [{:.4}, {:.4}] in {} steps, break-even {:?}",
            variable, start, end, steps, break_even
        );

        Ok(SensitivityResult {
            variable,
            metric: self.metric,
            scenario: self.scenario,
            base_value,
            base_metric,
            points,
            break_even,
        })
    }

    /// Sweep a variable given by name
    pub fn sweep_named(
        &self,
        inputs: &ClientInputs,
        name: &str,
        range_fraction: f64,
        steps: usize,
    ) -> Result<SensitivityResult> {
        self.sweep(inputs, name.parse()?, range_fraction, steps)
    }

    fn break_even_in_points(
        &self,
        inputs: &ClientInputs,
        variable: Variable,
        points: &[SensitivityPoint],
    ) -> Result<Option<f64>> {
        for pair in points.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if lo.metric_value == 0.0 {
                return Ok(Some(lo.input_value));
            }
            if lo.metric_value.signum() != hi.metric_value.signum() {
                return self.bisect(inputs, variable, lo.input_value, hi.input_value, lo.metric_value);
            }
        }
        match points.last() {
            Some(last) if last.metric_value == 0.0 => Ok(Some(last.input_value)),
            _ => Ok(None),
        }
    }

    /// Search range for a break-even value: the bottom of the variable's
    /// domain up to twice its base value
    fn search_bounds(&self, inputs: &ClientInputs, variable: Variable) -> (f64, f64) {
        let (lower, upper) = variable.search_bounds(inputs);
        match variable {
            // Keep the scenario-adjusted rate above -100%
            Variable::DiscountRate => {
                let delta = self.model.assumptions().scenarios.get(self.scenario).discount_rate_delta;
                (lower.max(DEFAULT_IRR_LOWER - delta), upper)
            }
            _ => (lower, upper),
        }
    }

    /// Input value at which the metric crosses zero
    ///
    /// Returns `None` when the metric keeps its sign across the search range.
    pub fn find_break_even(&self, inputs: &ClientInputs, variable: Variable) -> Result<Option<f64>> {
        let (lower, upper) = self.search_bounds(inputs, variable);
        if upper <= lower {
            warn!("{variable}: empty break-even search range [{lower}, {upper}]");
            return Ok(None);
        }

        let f_lower = self.metric_with(inputs, variable, lower)?;
        let f_upper = self.metric_with(inputs, variable, upper)?;

        if f_lower == 0.0 {
            return Ok(Some(lower));
        }
        if f_upper == 0.0 {
            return Ok(Some(upper));
        }
        if f_lower.signum() == f_upper.signum() {
            warn!(
                "{} never reaches break-even on {} over [{}, {}]",
                variable, self.metric, lower, upper
            );
            return Ok(None);
        }

        self.bisect(inputs, variable, lower, upper, f_lower)
    }

    /// Break-even with its multiple of the base value and the margin of safety
    ///
    /// Both relative figures are absent when there is no break-even or the base is zero.
    pub fn break_even_report(&self, inputs: &ClientInputs, variable: Variable) -> Result<BreakEvenReport> {
        let base_value = variable.value(inputs);
        let break_even = self.find_break_even(inputs, variable)?;
        let break_even_multiplier = break_even
            .filter(|_| base_value != 0.0)
            .map(|value| value / base_value);

        Ok(BreakEvenReport {
            variable,
            scenario: self.scenario,
            metric: self.metric,
            base_value,
            break_even,
            break_even_multiplier,
            margin_of_safety_percent: break_even_multiplier.map(|m| (1.0 - m).abs() * 100.0),
        })
    }

    /// Break-even for a variable given by name
    pub fn find_break_even_named(&self, inputs: &ClientInputs, name: &str) -> Result<Option<f64>> {
        self.find_break_even(inputs, name.parse()?)
    }

    /// Bisection on a bracket known to contain a sign change, bounded by the
    /// model's solver settings
    fn bisect(
        &self,
        inputs: &ClientInputs,
        variable: Variable,
        mut low: f64,
        mut high: f64,
        mut f_low: f64,
    ) -> Result<Option<f64>> {
        let solver = self.model.assumptions().solver;

        for iteration in 0..solver.max_iterations {
            let mid = (low + high) / 2.0;
            let f_mid = self.metric_with(inputs, variable, mid)?;

            let collapsed = (high - low) / 2.0 <= f64::EPSILON * mid.abs().max(1.0);
            if f_mid.abs() < solver.tolerance || collapsed {
                debug!("{variable} break-even {mid} after {} iterations", iteration + 1);
                return Ok(Some(mid));
            }

            if f_mid.signum() == f_low.signum() {
                low = mid;
                f_low = f_mid;
            } else {
                high = mid;
            }
        }

        warn!("{variable}: break-even search hit the iteration cap");
        Ok(None)
    }

    /// Low/high evaluation for each variable, largest impact first
    ///
    /// Variables with a zero base value are skipped. The high end is capped at
    /// the variable's upper limit; the bar records the value actually used.
    pub fn tornado(
        &self,
        inputs: &ClientInputs,
        variables: &[Variable],
        range_fraction: f64,
    ) -> Result<Vec<TornadoBar>> {
        if !range_fraction.is_finite() || range_fraction < 0.0 {
            return Err(RoiError::invalid(
                "range_fraction",
                format!("must be a non-negative number, got {range_fraction}"),
            ));
        }

        let base_metric = self.metric_at(inputs)?;
        let mut bars = Vec::with_capacity(variables.len());

        for &variable in variables {
            let base_value = variable.value(inputs);
            if base_value == 0.0 {
                debug!("Tornado: skipping {variable} with zero base value");
                continue;
            }

            let mut low_value = base_value * (1.0 - range_fraction);
            let mut high_value = base_value * (1.0 + range_fraction);
            if let Some(limit) = variable.upper_limit() {
                low_value = low_value.min(limit);
                high_value = high_value.min(limit);
            }

            let low_metric = self.metric_with(inputs, variable, low_value)?;
            let high_metric = self.metric_with(inputs, variable, high_value)?;

            bars.push(TornadoBar {
                variable,
                base_value,
                low_value,
                high_value,
                base_metric,
                low_metric,
                high_metric,
                impact_range: (high_metric - low_metric).abs(),
            });
        }

        bars.sort_by(|a, b| b.impact_range.total_cmp(&a.impact_range));
        Ok(bars)
    }
}
