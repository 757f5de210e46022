//! Error taxonomy for the modeling engine
//!
//! "Not found" outcomes (no IRR, no payback, no break-even) are not errors and
//! are reported as `None` by the operations that can produce them.

use thiserror::Error;

/// Errors surfaced by the engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoiError {
    /// Out-of-range or malformed inputs or parameters
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    /// Scenario name lookup failed
    #[error("Unknown scenario '{name}' (valid: {})", .valid.join(", "))]
    UnknownScenario { name: String, valid: Vec<String> },

    /// Sensitivity variable lookup failed
    #[error("Unknown variable '{name}' (valid: {})", .valid.join(", "))]
    UnknownVariable { name: String, valid: Vec<String> },

    /// Mathematically undefined operation
    #[error("Domain error: {0}")]
    Domain(String),
}

impl RoiError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RoiError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RoiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_scenario_lists_options() {
        let err = RoiError::UnknownScenario {
            name: "optimistic".into(),
            valid: vec!["conservative".into(), "moderate".into(), "aggressive".into()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown scenario 'optimistic' (valid: conservative, moderate, aggressive)"
        );
    }

    #[test]
    fn test_invalid_input_message() {
        let err = RoiError::invalid("analysis_years", "must be at least 1");
        assert_eq!(err.to_string(), "Invalid input: analysis_years - must be at least 1");
    }
}
