//! Input and plan validation for rescue planning.
//!
//! Checks structural integrity before planning and feasibility after it.
//! Detects:
//! - Missing units, entrance or stations
//! - Duplicate location IDs
//! - Important points that reference unplaced or unknown stations
//! - Plans that revisit a station, use an unreachable leg, or exceed the
//!   per-unit step budget
//!
//! All problems are collected rather than stopping at the first one.

use std::collections::HashSet;

use crate::models::{HostageStation, ImportantPoint, PathStore, Plan, ENTRANCE_ID};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Zero units requested.
    NoUnits,
    /// No important point carries the entrance id.
    MissingEntrance,
    /// The important-point list is empty.
    EmptyImportantPoints,
    /// Two important points share the same ID.
    DuplicateId,
    /// Only the entrance is present.
    NoStations,
    /// An important point refers to a station with no registry entry.
    UnknownStation,
    /// An important point refers to a station whose placement failed.
    UnplacedStation,
    /// A plan has a different number of unit paths than units.
    UnitCountMismatch,
    /// A unit path does not begin at the entrance.
    MissingStart,
    /// A station is visited more than once in a plan.
    DuplicateStation,
    /// A plan leg has no precomputed route.
    UnreachableLeg,
    /// A unit's route is longer than the step budget.
    BudgetExceeded,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the inputs of a planning run.
///
/// Checks:
/// 1. At least one unit
/// 2. At least one important point
/// 3. No duplicate location IDs
/// 4. Exactly one point is the entrance
/// 5. At least one station besides the entrance
/// 6. Every station point refers to a placed registry entry
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_planning_input(
    points: &[ImportantPoint],
    stations: &[HostageStation],
    num_units: usize,
) -> ValidationResult {
    let mut errors = Vec::new();

    if num_units == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoUnits,
            "At least one unit is required",
        ));
    }

    if points.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyImportantPoints,
            "No important points given",
        ));
        return Err(errors);
    }

    let mut ids = HashSet::new();
    for p in points {
        if !ids.insert(p.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate location ID: {}", p.id),
            ));
        }
    }

    if !ids.contains(&ENTRANCE_ID) {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingEntrance,
            "No important point is the entrance",
        ));
    }

    if ids.iter().all(|&id| id == ENTRANCE_ID) {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoStations,
            "No stations to visit",
        ));
    }

    for p in points.iter().filter(|p| p.id != ENTRANCE_ID) {
        match p.id.checked_sub(1).and_then(|idx| stations.get(idx)) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStation,
                format!("Location {} has no station record", p.id),
            )),
            Some(s) if !s.is_placed() => errors.push(ValidationError::new(
                ValidationErrorKind::UnplacedStation,
                format!("Location {} refers to an unplaced station", p.id),
            )),
            Some(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a finished plan against the path store and step budget.
///
/// Checks:
/// 1. One path per unit
/// 2. Every path starts at the entrance
/// 3. No station is visited twice across all units
/// 4. Every leg has a route
/// 5. Every unit stays within `unit_step_budget` (inclusive)
pub fn validate_plan(
    plan: &Plan,
    paths: &PathStore,
    num_units: usize,
    unit_step_budget: u32,
) -> ValidationResult {
    let mut errors = Vec::new();

    if plan.len() != num_units {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnitCountMismatch,
            format!("Plan has {} unit paths for {} units", plan.len(), num_units),
        ));
    }

    let mut visited = HashSet::new();
    for (unit, path) in plan.iter().enumerate() {
        if path.first() != Some(&ENTRANCE_ID) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingStart,
                format!("Unit {unit} does not start at the entrance"),
            ));
        }

        for &id in path.iter().skip(1) {
            if !visited.insert(id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateStation,
                    format!("Station {id} is visited more than once"),
                ));
            }
        }

        let mut steps = 0u32;
        let mut reachable = true;
        for leg in path.windows(2) {
            match paths.cost(leg[0], leg[1]) {
                Some(cost) => steps += cost,
                None => {
                    reachable = false;
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnreachableLeg,
                        format!("Unit {unit}: no route from {} to {}", leg[0], leg[1]),
                    ));
                }
            }
        }

        if reachable && steps > unit_step_budget {
            errors.push(ValidationError::new(
                ValidationErrorKind::BudgetExceeded,
                format!("Unit {unit} needs {steps} steps (budget {unit_step_budget})"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
