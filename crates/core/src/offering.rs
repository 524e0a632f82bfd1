//! Course offering form rules and offering-code generation.
//!
//! An offering binds a course to a teacher, a program, and a term. Its
//! short numeric code is generated once at creation and never changes.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest generated offering code (5 digits).
pub const CODE_MIN: u32 = 10_000;

/// Highest generated offering code (5 digits).
pub const CODE_MAX: u32 = 99_999;

/// Uniqueness probes before code generation gives up.
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 50;

/// Longest accepted explicit code, measured after trimming.
pub const MAX_CODE_LEN: usize = 20;

// ---------------------------------------------------------------------------
// Term
// ---------------------------------------------------------------------------

/// A semester within a school year, e.g. `1st` of `2025-2026`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub semester: String,
    pub school_year: String,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.semester, self.school_year)
    }
}

// ---------------------------------------------------------------------------
// Form validation
// ---------------------------------------------------------------------------

/// Offering fields as submitted on create or update.
///
/// `code` is only honoured on create; codes are immutable afterwards.
/// `offering_type` is free text (e.g. `lecture`, `lab`) and may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OfferingForm {
    pub course_id: Option<DbId>,
    pub teacher_id: Option<DbId>,
    pub program_id: Option<DbId>,
    pub semester: Option<String>,
    pub school_year: Option<String>,
    #[validate(range(min = 0, message = "Units must not be negative"))]
    pub units: i16,
    pub offering_type: String,
    pub code: Option<String>,
}

/// An offering form with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOffering {
    pub course_id: DbId,
    pub teacher_id: DbId,
    pub program_id: DbId,
    pub term: Term,
    pub units: i16,
    pub offering_type: String,
}

/// Validate an offering form and extract its required fields.
///
/// Course, teacher, program, and both term parts are required; missing
/// ones are reported together.
pub fn validate_offering_form(form: &OfferingForm) -> Result<ValidatedOffering, CoreError> {
    form.validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;
    validate_explicit_code(form.code.as_deref())?;

    let semester = non_blank(form.semester.as_deref());
    let school_year = non_blank(form.school_year.as_deref());

    let mut missing = Vec::new();
    if form.course_id.is_none() {
        missing.push("course");
    }
    if form.teacher_id.is_none() {
        missing.push("teacher");
    }
    if form.program_id.is_none() {
        missing.push("program");
    }
    if semester.is_none() {
        missing.push("semester");
    }
    if school_year.is_none() {
        missing.push("school_year");
    }

    match (form.course_id, form.teacher_id, form.program_id, semester, school_year) {
        (Some(course_id), Some(teacher_id), Some(program_id), Some(semester), Some(school_year)) => {
            Ok(ValidatedOffering {
                course_id,
                teacher_id,
                program_id,
                term: Term {
                    semester: semester.to_string(),
                    school_year: school_year.to_string(),
                },
                units: form.units,
                offering_type: form.offering_type.trim().to_string(),
            })
        }
        _ => Err(CoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        ))),
    }
}

/// Check an explicit code's length after trimming. Blank codes are absent
/// and always pass.
pub fn validate_explicit_code(code: Option<&str>) -> Result<(), CoreError> {
    match normalize_explicit_code(code) {
        Some(code) if code.chars().count() > MAX_CODE_LEN => Err(CoreError::Validation(
            format!("Code must be at most {MAX_CODE_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Codes and labels
// ---------------------------------------------------------------------------

/// Draw a random 5-digit code candidate.
pub fn random_code_candidate<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:05}", rng.random_range(CODE_MIN..=CODE_MAX))
}

/// Normalise a caller-supplied code: trimmed, or `None` when blank.
pub fn normalize_explicit_code(code: Option<&str>) -> Option<String> {
    non_blank(code).map(str::to_string)
}

/// Human-readable offering label, e.g. `"48213 - CS101"`.
pub fn offering_label(code: &str, course_code: &str) -> String {
    format!("{code} - {course_code}")
}
