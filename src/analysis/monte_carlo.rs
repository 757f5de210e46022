//! Monte Carlo simulation over triangular input distributions
//!
//! Each iteration samples every configured variable independently, rebuilds
//! the client inputs and records the target metric. The random source is
//! injected ([`MonteCarloSimulator::simulate_with_rng`]) or seeded, so a fixed
//! seed reproduces the sample sequence exactly.

use std::collections::HashSet;

use log::{debug, info};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::Triangular;

use super::percentile::{fraction_where, mean, percentile_sorted, std_dev};
use super::Variable;
use crate::assumptions::VariableSpread;
use crate::error::{Result, RoiError};
use crate::inputs::ClientInputs;
use crate::model::{RoiModel, TargetMetric};
use crate::scenario::Scenario;

/// Iterations per independently seeded chunk in [`MonteCarloSimulator::simulate_parallel`]
pub const PARALLEL_CHUNK_SIZE: usize = 1_000;

/// Absolute `(min, mode, max)` for one variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangularSpec {
    pub variable: Variable,
    pub min: f64,
    pub mode: f64,
    pub max: f64,
}

impl TriangularSpec {
    pub fn new(variable: Variable, min: f64, mode: f64, max: f64) -> Self {
        Self { variable, min, mode, max }
    }

    /// Spread around the variable's value in `inputs`, capped at its upper limit
    pub fn from_spread(spread: &VariableSpread, inputs: &ClientInputs) -> Self {
        let base = spread.variable.value(inputs);
        let a = base * spread.low_multiplier;
        let b = base * spread.high_multiplier;
        let (mut min, mut max) = (a.min(b), a.max(b));
        let mut mode = (base * spread.mode_multiplier).clamp(min, max);

        if let Some(limit) = spread.variable.upper_limit() {
            min = min.min(limit);
            mode = mode.min(limit);
            max = max.min(limit);
        }

        Self {
            variable: spread.variable,
            min,
            mode,
            max,
        }
    }

    fn validate(&self, inputs: &ClientInputs) -> Result<()> {
        let field = format!("distribution.{}", self.variable);
        if !(self.min.is_finite() && self.mode.is_finite() && self.max.is_finite()) {
            return Err(RoiError::invalid(field, "min, mode and max must be finite"));
        }
        if !(self.min <= self.mode && self.mode <= self.max) {
            return Err(RoiError::invalid(
                field,
                format!("requires min <= mode <= max, got ({}, {}, {})", self.min, self.mode, self.max),
            ));
        }
        // Both ends must be valid values of the variable
        self.variable.with_value(inputs, self.min)?;
        self.variable.with_value(inputs, self.max)?;
        Ok(())
    }
}

enum Sampler {
    Constant(f64),
    Triangular(Triangular),
}

impl Sampler {
    fn from_spec(spec: &TriangularSpec) -> Result<Self> {
        if spec.min == spec.max {
            return Ok(Sampler::Constant(spec.min));
        }
        Triangular::new(spec.min, spec.max, spec.mode)
            .map(Sampler::Triangular)
            .map_err(|e| {
                RoiError::invalid(
                    format!("distribution.{}", spec.variable),
                    format!("invalid triangular parameters: {e}"),
                )
            })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Sampler::Constant(v) => *v,
            Sampler::Triangular(t) => t.sample(rng),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub confidence: f64,
    pub lower: f64,
    pub upper: f64,
    pub median: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub iterations: usize,
    pub scenario: Scenario,
    pub metric: TargetMetric,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub mean: f64,
    pub std_dev: f64,
    /// Share of samples with metric > 0
    pub probability_positive: f64,
    /// Share of samples with metric >= 0
    pub probability_break_even: f64,
    pub hurdle: f64,
    /// Share of samples with metric > hurdle
    pub probability_above_hurdle: f64,
    /// Metric per iteration, in draw order
    pub samples: Vec<f64>,
}

impl MonteCarloResult {
    /// Central interval holding `confidence` (0-1) of the samples
    pub fn confidence_interval(&self, confidence: f64) -> Result<ConfidenceInterval> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(RoiError::invalid(
                "confidence",
                format!("must be strictly between 0 and 1, got {confidence}"),
            ));
        }

        let sorted = sorted(&self.samples);
        let alpha = (1.0 - confidence) / 2.0;

        Ok(ConfidenceInterval {
            confidence,
            lower: percentile_sorted(&sorted, alpha * 100.0),
            upper: percentile_sorted(&sorted, (1.0 - alpha) * 100.0),
            median: self.p50,
            mean: self.mean,
        })
    }
}

fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

pub struct MonteCarloSimulator<'a> {
    model: &'a RoiModel,
    scenario: Scenario,
    metric: TargetMetric,
    hurdle: f64,
    seed: Option<u64>,
}

impl<'a> MonteCarloSimulator<'a> {
    /// Moderate scenario, final-year ROI%, hurdle from the model's assumptions,
    /// unseeded
    pub fn new(model: &'a RoiModel) -> Self {
        Self {
            model,
            scenario: Scenario::Moderate,
            metric: TargetMetric::Roi,
            hurdle: model.assumptions().monte_carlo.hurdle,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = scenario;
        self
    }

    pub fn with_metric(mut self, metric: TargetMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_hurdle(mut self, hurdle: f64) -> Self {
        self.hurdle = hurdle;
        self
    }

    /// Default iteration count from the model's assumptions
    pub fn default_iterations(&self) -> usize {
        self.model.assumptions().monte_carlo.default_iterations
    }

    /// Triangular specs from the configured spreads, skipping variables with
    /// a zero base value
    pub fn default_specs(&self, inputs: &ClientInputs) -> Vec<TriangularSpec> {
        self.model
            .assumptions()
            .monte_carlo
            .spreads
            .iter()
            .filter(|spread| spread.variable.value(inputs) != 0.0)
            .map(|spread| TriangularSpec::from_spread(spread, inputs))
            .collect()
    }

    /// Run with the configured seed, or OS entropy when unseeded
    pub fn simulate(
        &self,
        inputs: &ClientInputs,
        iterations: usize,
        specs: &[TriangularSpec],
    ) -> Result<MonteCarloResult> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.simulate_with_rng(inputs, iterations, specs, &mut rng)
    }

    /// Run drawing every sample from `rng`
    pub fn simulate_with_rng<R: Rng + ?Sized>(
        &self,
        inputs: &ClientInputs,
        iterations: usize,
        specs: &[TriangularSpec],
        rng: &mut R,
    ) -> Result<MonteCarloResult> {
        let samplers = self.prepare(inputs, iterations, specs)?;
        let samples = self.draw(inputs, iterations, &samplers, rng)?;
        Ok(self.summarize(samples))
    }

    /// Run across rayon workers in fixed-size chunks
    ///
    /// Chunk `k` is seeded with `seed + k`, so the output depends only on the
    /// seed and iteration count, not on the number of threads. The sample
    /// sequence differs from [`simulate`](Self::simulate) with the same seed.
    pub fn simulate_parallel(
        &self,
        inputs: &ClientInputs,
        iterations: usize,
        specs: &[TriangularSpec],
    ) -> Result<MonteCarloResult> {
        let samplers = self.prepare(inputs, iterations, specs)?;
        let base_seed = self.seed.unwrap_or_else(rand::random);
        let chunks = iterations.div_ceil(PARALLEL_CHUNK_SIZE);

        let per_chunk: Vec<Vec<f64>> = (0..chunks)
            .into_par_iter()
            .map(|k| {
                let n = PARALLEL_CHUNK_SIZE.min(iterations - k * PARALLEL_CHUNK_SIZE);
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(k as u64));
                self.draw(inputs, n, &samplers, &mut rng)
            })
            .collect::<Result<_>>()?;

        Ok(self.summarize(per_chunk.into_iter().flatten().collect()))
    }

    fn prepare(
        &self,
        inputs: &ClientInputs,
        iterations: usize,
        specs: &[TriangularSpec],
    ) -> Result<Vec<(Variable, Sampler)>> {
        let max_iterations = self.model.assumptions().monte_carlo.max_iterations;
        if iterations == 0 || iterations > max_iterations {
            return Err(RoiError::invalid(
                "iterations",
                format!("must be between 1 and {max_iterations}, got {iterations}"),
            ));
        }

        let mut seen = HashSet::new();
        specs
            .iter()
            .map(|spec| {
                if !seen.insert(spec.variable) {
                    return Err(RoiError::invalid(
                        format!("distribution.{}", spec.variable),
                        "variable configured more than once",
                    ));
                }
                spec.validate(inputs)?;
                Ok((spec.variable, Sampler::from_spec(spec)?))
            })
            .collect()
    }

    fn draw<R: Rng + ?Sized>(
        &self,
        inputs: &ClientInputs,
        iterations: usize,
        samplers: &[(Variable, Sampler)],
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        let mut samples = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            let mut perturbed = inputs.clone();
            for (variable, sampler) in samplers {
                perturbed = variable.with_value(&perturbed, sampler.sample(rng))?;
            }
            let result = self.model.compute(&perturbed, self.scenario)?;
            samples.push(self.metric.extract(&result));
        }
        Ok(samples)
    }

    fn summarize(&self, samples: Vec<f64>) -> MonteCarloResult {
        let sorted = sorted(&samples);
        let mean = mean(&samples);
        let hurdle = self.hurdle;

        let result = MonteCarloResult {
            iterations: samples.len(),
            scenario: self.scenario,
            metric: self.metric,
            p10: percentile_sorted(&sorted, 10.0),
            p50: percentile_sorted(&sorted, 50.0),
            p90: percentile_sorted(&sorted, 90.0),
            mean,
            std_dev: std_dev(&samples, mean),
            probability_positive: fraction_where(&samples, |v| v > 0.0),
            probability_break_even: fraction_where(&samples, |v| v >= 0.0),
            hurdle,
            probability_above_hurdle: fraction_where(&samples, |v| v > hurdle),
            samples,
        };

        debug!("Monte Carlo samples: mean {:.4}, std {:.4}", result.mean, result.std_dev);
        info!(
            "Monte Carlo {} iterations on {}: p10 {:.2}, p50 {:.2}, p90 {:.2}",
            result.iterations, result.metric, result.p10, result.p50, result.p90
        );

        result
    }
}
