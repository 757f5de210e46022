//! Internal Rate of Return (IRR) calculation
//!
//! Bisection over a bounded rate interval. Cash-flow shapes without a real
//! root (no sign change across the interval) report `None`.

use log::debug;
use serde::{Deserialize, Serialize};

use super::discount::npv_unchecked;
use crate::error::{Result, RoiError};

/// Default lower bound of the rate search (-99%)
pub const DEFAULT_IRR_LOWER: f64 = -0.99;

/// Default upper bound of the rate search (1000%)
pub const DEFAULT_IRR_UPPER: f64 = 10.0;

pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// Convergence tolerance on the NPV value
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Bounded, tolerance-parameterized bisection solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolver {
    /// Lowest rate considered (must be greater than -1)
    pub lower: f64,
    /// Highest rate considered
    pub upper: f64,
    /// Iteration cap
    pub max_iterations: u32,
    /// Accept a rate once |NPV| falls below this value
    pub tolerance: f64,
}

impl Default for IrrSolver {
    fn default() -> Self {
        Self {
            lower: DEFAULT_IRR_LOWER,
            upper: DEFAULT_IRR_UPPER,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl IrrSolver {
    /// Reject settings under which no cash-flow shape could ever produce a rate
    pub fn validate(&self) -> Result<()> {
        if !self.lower.is_finite() || self.lower <= -1.0 {
            return Err(RoiError::invalid("irr_lower", format!("must be finite and above -1, got {}", self.lower)));
        }
        if !self.upper.is_finite() || self.upper <= self.lower {
            return Err(RoiError::invalid(
                "irr_upper",
                format!("must be finite and above irr_lower ({}), got {}", self.lower, self.upper),
            ));
        }
        if self.max_iterations == 0 {
            return Err(RoiError::invalid("irr_max_iterations", "must be at least 1"));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(RoiError::invalid("irr_tolerance", format!("must be positive, got {}", self.tolerance)));
        }
        Ok(())
    }

    /// Find the rate `r` with `npv(cash_flows, r) = 0`
    ///
    /// # Returns
    /// * `Option<f64>` - Periodic IRR as a decimal (e.g., 0.05 for 5%), or None if no solution found
    pub fn solve(&self, cash_flows: &[f64]) -> Option<f64> {
        if cash_flows.is_empty() || self.lower <= -1.0 || self.lower >= self.upper {
            return None;
        }

        // A root requires at least one inflow and one outflow
        let has_positive = cash_flows.iter().any(|&cf| cf > 0.0);
        let has_negative = cash_flows.iter().any(|&cf| cf < 0.0);
        if !has_positive || !has_negative {
            return None;
        }

        let mut low = self.lower;
        let mut high = self.upper;
        let mut npv_low = npv_unchecked(cash_flows, low);
        let npv_high = npv_unchecked(cash_flows, high);

        if npv_low == 0.0 {
            return Some(low);
        }
        if npv_high == 0.0 {
            return Some(high);
        }
        if npv_low.signum() == npv_high.signum() {
            debug!("IRR: no sign change in [{}, {}]", self.lower, self.upper);
            return None;
        }

        for iteration in 0..self.max_iterations {
            let mid = (low + high) / 2.0;
            let npv_mid = npv_unchecked(cash_flows, mid);

            // Interval collapsed to float resolution: the bracketed root is `mid`
            let collapsed = (high - low) / 2.0 <= f64::EPSILON * mid.abs().max(1.0);
            if npv_mid.abs() < self.tolerance || collapsed {
                debug!("IRR converged to {mid} after {} iterations", iteration + 1);
                return Some(mid);
            }

            if npv_mid.signum() == npv_low.signum() {
                low = mid;
                npv_low = npv_mid;
            } else {
                high = mid;
            }
        }

        debug!("IRR: iteration cap {} reached", self.max_iterations);
        None
    }
}

/// IRR with the default solver settings
pub fn irr(cash_flows: &[f64]) -> Option<f64> {
    IrrSolver::default().solve(cash_flows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::npv;
    use approx::assert_relative_eq;

    #[test]
    fn test_level_flows_root() {
        let flows = [-100_000.0, 30_000.0, 30_000.0, 30_000.0, 30_000.0, 30_000.0];
        let rate = irr(&flows).unwrap();

        assert!(npv(&flows, rate).unwrap().abs() < DEFAULT_TOLERANCE);
        assert!((rate - 0.1524).abs() < 0.001, "Expected ~15.24% IRR, got {}", rate);
    }

    #[test]
    fn test_simple_irr() {
        // Investment of $1000, returns $1100 after one period
        let rate = irr(&[-1000.0, 1100.0]).unwrap();
        assert_relative_eq!(rate, 0.10, epsilon = 1e-8);
    }

    #[test]
    fn test_no_sign_change() {
        assert_eq!(irr(&[100.0, 200.0, 300.0]), None);
        assert_eq!(irr(&[-100.0, -200.0]), None);
        assert_eq!(irr(&[0.0, 0.0, 0.0]), None);
        assert_eq!(irr(&[]), None);
    }

    #[test]
    fn test_root_outside_interval() {
        // Needs a rate above 1000%
        let solver = IrrSolver::default();
        assert_eq!(solver.solve(&[-1.0, 50.0]), None);

        let wide = IrrSolver { upper: 100.0, ..Default::default() };
        let rate = wide.solve(&[-1.0, 50.0]).unwrap();
        assert_relative_eq!(rate, 49.0, epsilon = 1e-3);
    }

    #[test]
    fn test_iteration_cap() {
        let solver = IrrSolver {
            max_iterations: 2,
            tolerance: 1e-12,
            ..Default::default()
        };
        assert_eq!(solver.solve(&[-100_000.0, 30_000.0, 30_000.0, 30_000.0, 30_000.0, 30_000.0]), None);
    }

    #[test]
    fn test_invalid_bounds() {
        let solver = IrrSolver { lower: -1.0, ..Default::default() };
        assert_eq!(solver.solve(&[-1000.0, 1100.0]), None);
        assert!(matches!(
            solver.validate(),
            Err(RoiError::InvalidInput { field, .. }) if field == "irr_lower"
        ));
    }

    #[test]
    fn test_validate_settings() {
        assert!(IrrSolver::default().validate().is_ok());

        let inverted = IrrSolver { lower: 0.5, upper: 0.1, ..Default::default() };
        assert!(matches!(
            inverted.validate(),
            Err(RoiError::InvalidInput { field, .. }) if field == "irr_upper"
        ));

        let no_iterations = IrrSolver { max_iterations: 0, ..Default::default() };
        assert!(matches!(
            no_iterations.validate(),
            Err(RoiError::InvalidInput { field, .. }) if field == "irr_max_iterations"
        ));

        let no_tolerance = IrrSolver { tolerance: 0.0, ..Default::default() };
        assert!(matches!(
            no_tolerance.validate(),
            Err(RoiError::InvalidInput { field, .. }) if field == "irr_tolerance"
        ));
    }
}
