//! Run-level error type.
//!
//! Component-level problems are logged and surfaced as empty or sentinel
//! values; only the failures that make a whole run meaningless become a
//! [`RescueError`].

use thiserror::Error;

use crate::validation::ValidationError;

/// Failures that abort a rescue planning run.
#[derive(Debug, Error)]
pub enum RescueError {
    /// A grid or population buffer could not be allocated.
    #[error("allocation failed: {0}")]
    Allocation(String),
    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The maze has no path cell on the entrance row.
    #[error("no entrance cell found on the bottom interior row")]
    NoEntrance,
    /// Nothing to plan around.
    #[error("no important points to plan for")]
    NoImportantPoints,
    /// Every station is unreachable within the unit step budget.
    #[error("no station is reachable within the step budget")]
    NoReachableStations,
    /// Planner inputs failed validation.
    #[error("invalid planning input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),
    /// A worker task terminated without delivering its result.
    #[error("worker task failed: {0}")]
    WorkerFailure(String),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            RescueError::InvalidConfig("grid_size must be odd".into()).to_string(),
            "invalid configuration: grid_size must be odd"
        );
        let err = RescueError::InvalidInput(vec![
            ValidationError::new(ValidationErrorKind::NoUnits, "no units"),
            ValidationError::new(ValidationErrorKind::MissingEntrance, "no entrance"),
        ]);
        assert_eq!(err.to_string(), "invalid planning input: no units; no entrance");
    }
}
