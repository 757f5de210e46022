//! ROI Toolkit - Business-case modeling engine
//!
//! This library provides:
//! - Scenario-parameterized ROI and TCO models
//! - Time-value-of-money math (NPV, IRR, simple and discounted payback)
//! - One-factor sensitivity sweeps, break-even search and tornado analysis
//! - Seeded Monte Carlo simulation over triangular input distributions

pub mod error;
pub mod inputs;
pub mod assumptions;
pub mod time_value;
pub mod scenario;
pub mod model;
pub mod analysis;

// Re-export commonly used types
pub use error::{Result, RoiError};
pub use inputs::{ClientInputs, ClientInputsRaw, Industry};
pub use assumptions::Assumptions;
pub use scenario::{Scenario, ScenarioParameters, ScenarioSelector};
pub use model::{RoiModel, RoiOutcome, RoiResult, ScenarioResults, TargetMetric, TcoModel, TcoProjection};
pub use analysis::{MonteCarloResult, MonteCarloSimulator, SensitivityAnalyzer, SensitivityResult, Variable};
