//! ROI and TCO models

mod metric;
mod roi;
mod tco;

pub use metric::TargetMetric;
pub use roi::{RoiModel, RoiOutcome, RoiResult, ScenarioResults};
pub use tco::{HiddenCostBreakdown, TcoComparison, TcoComparisonYear, TcoModel, TcoProjection, TcoYear};
