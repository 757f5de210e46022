//! Total cost of ownership projection
//!
//! Year 0 carries the implementation cost. Years 1..=N carry the ongoing
//! license/support cost, escalated yearly, plus hidden costs as a fraction of
//! the ongoing cost when requested. Cumulative cost satisfies
//! `cumulative[y] = cumulative[y-1] + one_time[y] + ongoing[y] + hidden[y]`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::assumptions::{Assumptions, TcoAssumptions};
use crate::error::{Result, RoiError};
use crate::inputs::{ClientInputs, MAX_ANALYSIS_YEARS};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TcoYear {
    pub year: u32,
    pub one_time_cost: f64,
    pub ongoing_cost: f64,
    pub hidden_cost: f64,
    pub cumulative_cost: f64,
}

impl TcoYear {
    pub fn total(&self) -> f64 {
        self.one_time_cost + self.ongoing_cost + self.hidden_cost
    }
}

/// Hidden cost totals over the horizon, by category
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HiddenCostBreakdown {
    pub productivity_loss: f64,
    pub customization: f64,
    pub turnover: f64,
}

impl HiddenCostBreakdown {
    pub fn total(&self) -> f64 {
        self.productivity_loss + self.customization + self.turnover
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcoProjection {
    pub years: u32,
    pub include_hidden: bool,
    /// Year 0 through `years`
    pub records: Vec<TcoYear>,
    pub hidden_breakdown: HiddenCostBreakdown,
}

impl TcoProjection {
    pub fn total_cost(&self) -> f64 {
        self.records.last().map(|r| r.cumulative_cost).unwrap_or(0.0)
    }
}

/// One year of the status quo against the future state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TcoComparisonYear {
    pub year: u32,
    pub status_quo_cost: f64,
    pub future_cost: f64,
    pub status_quo_cumulative: f64,
    pub future_cumulative: f64,
    pub cumulative_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcoComparison {
    pub years: u32,
    pub include_hidden: bool,
    pub status_quo_total: f64,
    pub future_total: f64,
    pub savings: f64,
    pub savings_percent: f64,
    pub yearly: Vec<TcoComparisonYear>,
    pub projection: TcoProjection,
}

#[derive(Debug, Clone)]
pub struct TcoModel {
    assumptions: TcoAssumptions,
}

impl TcoModel {
    pub fn new(assumptions: &Assumptions) -> Self {
        Self {
            assumptions: assumptions.tco,
        }
    }

    fn escalation(&self, year: u32) -> f64 {
        (1.0 + self.assumptions.annual_escalation).powi(year.saturating_sub(1) as i32)
    }

    /// Project solution costs over `years`
    pub fn project(&self, inputs: &ClientInputs, years: u32, include_hidden: bool) -> Result<TcoProjection> {
        if years == 0 || years > MAX_ANALYSIS_YEARS {
            return Err(RoiError::invalid(
                "years",
                format!("TCO horizon must be between 1 and {MAX_ANALYSIS_YEARS} years, got {years}"),
            ));
        }

        let factors = self.assumptions.hidden_costs;
        let implementation = inputs.implementation_cost();

        let mut records = Vec::with_capacity(years as usize + 1);
        records.push(TcoYear {
            year: 0,
            one_time_cost: implementation,
            ongoing_cost: 0.0,
            hidden_cost: 0.0,
            cumulative_cost: implementation,
        });

        let mut breakdown = HiddenCostBreakdown::default();
        let mut cumulative = implementation;

        for year in 1..=years {
            let ongoing = inputs.annual_license_cost() * self.escalation(year);
            let hidden = if include_hidden {
                breakdown.productivity_loss += ongoing * factors.productivity_loss;
                breakdown.customization += ongoing * factors.customization;
                breakdown.turnover += ongoing * factors.turnover;
                ongoing * factors.total()
            } else {
                0.0
            };

            cumulative += ongoing + hidden;
            records.push(TcoYear {
                year,
                one_time_cost: 0.0,
                ongoing_cost: ongoing,
                hidden_cost: hidden,
                cumulative_cost: cumulative,
            });
        }

        debug!("TCO over {years} years (hidden: {include_hidden}): {cumulative:.2}");

        Ok(TcoProjection {
            years,
            include_hidden,
            records,
            hidden_breakdown: breakdown,
        })
    }

    /// Status quo cost against the future state over `years`
    ///
    /// The future state pays the projected solution costs plus the share of
    /// the current operating cost the solution does not remove.
    pub fn compare(&self, inputs: &ClientInputs, years: u32, include_hidden: bool) -> Result<TcoComparison> {
        let projection = self.project(inputs, years, include_hidden)?;
        let residual = inputs.current_annual_cost() * (1.0 - inputs.efficiency_gain());

        let mut status_quo_cumulative = 0.0;
        let mut future_cumulative = 0.0;
        let yearly: Vec<TcoComparisonYear> = projection
            .records
            .iter()
            .map(|record| {
                let (status_quo_cost, residual_cost) = if record.year == 0 {
                    (0.0, 0.0)
                } else {
                    let factor = self.escalation(record.year);
                    (inputs.current_annual_cost() * factor, residual * factor)
                };
                let future_cost = record.total() + residual_cost;

                status_quo_cumulative += status_quo_cost;
                future_cumulative += future_cost;

                TcoComparisonYear {
                    year: record.year,
                    status_quo_cost,
                    future_cost,
                    status_quo_cumulative,
                    future_cumulative,
                    cumulative_savings: status_quo_cumulative - future_cumulative,
                }
            })
            .collect();

        let savings = status_quo_cumulative - future_cumulative;

        Ok(TcoComparison {
            years,
            include_hidden,
            status_quo_total: status_quo_cumulative,
            future_total: future_cumulative,
            savings,
            savings_percent: savings / status_quo_cumulative * 100.0,
            yearly,
            projection,
        })
    }
}
