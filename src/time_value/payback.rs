//! Simple payback period

use crate::error::{Result, RoiError};

/// Months needed for a level monthly net benefit to recover an investment
///
/// A non-positive monthly benefit never recovers the investment and is a
/// `Domain` error rather than an infinite payback.
pub fn payback_months(total_investment: f64, monthly_net_benefit: f64) -> Result<f64> {
    if !total_investment.is_finite() || total_investment < 0.0 {
        return Err(RoiError::invalid(
            "total_investment",
            format!("must be a non-negative amount, got {total_investment}"),
        ));
    }
    if monthly_net_benefit.is_nan() || monthly_net_benefit <= 0.0 {
        return Err(RoiError::Domain(format!(
            "monthly net benefit {monthly_net_benefit} never recovers the investment"
        )));
    }

    Ok(total_investment / monthly_net_benefit)
}
