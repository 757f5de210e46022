//! Prospect inputs: costs, expected efficiency, horizon, and industry

mod client;
mod industry;

pub use client::{ClientInputs, ClientInputsRaw, DEFAULT_ANALYSIS_YEARS, DEFAULT_DISCOUNT_RATE, MAX_ANALYSIS_YEARS};
pub use industry::Industry;
