//! Field-level validation rules for incoming requests.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const MUST_NOT_BE_BLANK: &str = "must not be blank";
pub const MUST_BE_POSITIVE: &str = "must be greater than 0";
pub const MUST_NOT_CONTAIN_NUL: &str = "must not contain NUL characters";

/// A single broken validation rule.
///
/// Ordered by field, then message, so error bodies are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Types that can check their own invariants.
pub trait Validate {
    /// Every rule this value breaks, in any order.
    fn violations(&self) -> Vec<Violation>;

    /// Fails with [`AppError::Validation`] holding the sorted violations.
    fn validate(&self) -> Result<(), AppError> {
        let mut violations = self.violations();
        if violations.is_empty() {
            return Ok(());
        }
        violations.sort();
        Err(AppError::Validation(violations))
    }
}

/// Missing, empty, and whitespace-only values are all blank.
pub fn not_blank(field: &str, value: Option<&str>) -> Option<Violation> {
    match value {
        Some(v) if !v.trim().is_empty() => None,
        _ => Some(Violation::new(field, MUST_NOT_BE_BLANK)),
    }
}

/// PostgreSQL text columns cannot store U+0000.
pub fn no_nul(field: &str, value: Option<&str>) -> Option<Violation> {
    match value {
        Some(v) if v.contains('\0') => Some(Violation::new(field, MUST_NOT_CONTAIN_NUL)),
        _ => None,
    }
}

pub fn positive(field: &str, value: i64) -> Option<Violation> {
    if value > 0 {
        None
    } else {
        Some(Violation::new(field, MUST_BE_POSITIVE))
    }
}
