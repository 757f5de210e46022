//! Discounting of cash-flow sequences
//!
//! Period 0 is the initial outlay and is never discounted. Rates are per
//! period (annual for the ROI model).

use crate::error::{Result, RoiError};

fn check_rate(rate: f64) -> Result<()> {
    if rate.is_nan() || rate <= -1.0 {
        return Err(RoiError::Domain(format!(
            "discount rate {rate} must be greater than -100%"
        )));
    }
    Ok(())
}

/// Present value of `amount` received at `period`: `amount / (1 + rate)^period`
pub fn present_value(amount: f64, rate: f64, period: u32) -> Result<f64> {
    check_rate(rate)?;
    Ok(amount / (1.0 + rate).powi(period as i32))
}

/// Net present value of a cash-flow sequence, `cash_flows[t]` at period `t`
pub fn npv(cash_flows: &[f64], rate: f64) -> Result<f64> {
    check_rate(rate)?;
    Ok(npv_unchecked(cash_flows, rate))
}

/// NPV without the rate check, for root-finding inside a known-valid interval
pub(crate) fn npv_unchecked(cash_flows: &[f64], rate: f64) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// First period at which the discounted cumulative cash flow reaches zero
///
/// Returns `None` when the horizon is exhausted before the investment is
/// recovered.
pub fn discounted_payback(cash_flows: &[f64], rate: f64) -> Result<Option<u32>> {
    check_rate(rate)?;

    let mut cumulative = 0.0;
    for (t, &cf) in cash_flows.iter().enumerate() {
        cumulative += cf / (1.0 + rate).powi(t as i32);
        if cumulative >= 0.0 {
            return Ok(Some(t as u32));
        }
    }

    Ok(None)
}
