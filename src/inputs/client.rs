//! Client inputs for a business case

use serde::{Deserialize, Serialize};

use super::Industry;
use crate::error::{Result, RoiError};

pub const DEFAULT_ANALYSIS_YEARS: u32 = 3;
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.10;

/// Longest horizon accepted for ROI and TCO projections
pub const MAX_ANALYSIS_YEARS: u32 = 100;

/// Validated, immutable cost/benefit inputs for one prospect
///
/// Construct with [`ClientInputs::new`] or by converting a [`ClientInputsRaw`];
/// both paths validate every field and never clamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClientInputsRaw", into = "ClientInputsRaw")]
pub struct ClientInputs {
    current_annual_cost: f64,
    efficiency_gain: f64,
    annual_license_cost: f64,
    implementation_cost: f64,
    analysis_years: u32,
    discount_rate: f64,
    industry: Industry,
}

/// Unvalidated field bag, the wire shape of [`ClientInputs`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInputsRaw {
    pub current_annual_cost: f64,
    pub efficiency_gain: f64,
    pub annual_license_cost: f64,
    #[serde(default)]
    pub implementation_cost: f64,
    #[serde(default = "default_analysis_years")]
    pub analysis_years: u32,
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,
    #[serde(default)]
    pub industry: Industry,
}

fn default_analysis_years() -> u32 {
    DEFAULT_ANALYSIS_YEARS
}

fn default_discount_rate() -> f64 {
    DEFAULT_DISCOUNT_RATE
}

impl ClientInputs {
    pub fn new(
        current_annual_cost: f64,
        efficiency_gain: f64,
        annual_license_cost: f64,
        implementation_cost: f64,
        analysis_years: u32,
        discount_rate: f64,
    ) -> Result<Self> {
        Self::try_from(ClientInputsRaw {
            current_annual_cost,
            efficiency_gain,
            annual_license_cost,
            implementation_cost,
            analysis_years,
            discount_rate,
            industry: Industry::General,
        })
    }

    /// Same inputs, attributed to a different industry
    pub fn with_industry(mut self, industry: Industry) -> Self {
        self.industry = industry;
        self
    }

    /// Copy of the fields for modification and re-validation
    pub fn to_raw(&self) -> ClientInputsRaw {
        ClientInputsRaw {
            current_annual_cost: self.current_annual_cost,
            efficiency_gain: self.efficiency_gain,
            annual_license_cost: self.annual_license_cost,
            implementation_cost: self.implementation_cost,
            analysis_years: self.analysis_years,
            discount_rate: self.discount_rate,
            industry: self.industry,
        }
    }

    pub fn current_annual_cost(&self) -> f64 {
        self.current_annual_cost
    }

    pub fn efficiency_gain(&self) -> f64 {
        self.efficiency_gain
    }

    pub fn annual_license_cost(&self) -> f64 {
        self.annual_license_cost
    }

    pub fn implementation_cost(&self) -> f64 {
        self.implementation_cost
    }

    pub fn analysis_years(&self) -> u32 {
        self.analysis_years
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    pub fn industry(&self) -> Industry {
        self.industry
    }
}

fn finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RoiError::invalid(field, format!("must be a finite number, got {value}")))
    }
}

impl TryFrom<ClientInputsRaw> for ClientInputs {
    type Error = RoiError;

    fn try_from(raw: ClientInputsRaw) -> Result<Self> {
        let current_annual_cost = finite("current_annual_cost", raw.current_annual_cost)?;
        if current_annual_cost <= 0.0 {
            return Err(RoiError::invalid(
                "current_annual_cost",
                format!("must be greater than 0, got {current_annual_cost}"),
            ));
        }

        let efficiency_gain = finite("efficiency_gain", raw.efficiency_gain)?;
        if !(0.0..=1.0).contains(&efficiency_gain) {
            return Err(RoiError::invalid(
                "efficiency_gain",
                format!("must be a fraction between 0 and 1, got {efficiency_gain}"),
            ));
        }

        let annual_license_cost = finite("annual_license_cost", raw.annual_license_cost)?;
        if annual_license_cost < 0.0 {
            return Err(RoiError::invalid(
                "annual_license_cost",
                format!("must not be negative, got {annual_license_cost}"),
            ));
        }

        let implementation_cost = finite("implementation_cost", raw.implementation_cost)?;
        if implementation_cost < 0.0 {
            return Err(RoiError::invalid(
                "implementation_cost",
                format!("must not be negative, got {implementation_cost}"),
            ));
        }

        // ROI is measured against total investment
        if implementation_cost + annual_license_cost <= 0.0 {
            return Err(RoiError::invalid(
                "implementation_cost",
                "implementation and license cost cannot both be zero",
            ));
        }

        if raw.analysis_years < 1 || raw.analysis_years > MAX_ANALYSIS_YEARS {
            return Err(RoiError::invalid(
                "analysis_years",
                format!("must be between 1 and {MAX_ANALYSIS_YEARS}, got {}", raw.analysis_years),
            ));
        }

        let discount_rate = finite("discount_rate", raw.discount_rate)?;
        if discount_rate <= -1.0 {
            return Err(RoiError::invalid(
                "discount_rate",
                format!("must be greater than -100%, got {discount_rate}"),
            ));
        }

        Ok(Self {
            current_annual_cost,
            efficiency_gain,
            annual_license_cost,
            implementation_cost,
            analysis_years: raw.analysis_years,
            discount_rate,
            industry: raw.industry,
        })
    }
}

impl From<ClientInputs> for ClientInputsRaw {
    fn from(inputs: ClientInputs) -> Self {
        inputs.to_raw()
    }
}
