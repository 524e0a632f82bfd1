//! Grade entity model.
//!
//! A grade row is both the enrollment record of a student in an offering
//! and the container for that student's scores.

use registrar_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `grades` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Grade {
    pub id: DbId,
    pub course_offering_id: DbId,
    pub student_id: DbId,
    pub prelim_score: Option<f64>,
    pub midterm_score: Option<f64>,
    pub prefinal_score: Option<f64>,
    pub final_score: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Grade {
    /// `true` while no score has been recorded.
    pub fn is_blank(&self) -> bool {
        self.prelim_score.is_none()
            && self.midterm_score.is_none()
            && self.prefinal_score.is_none()
            && self.final_score.is_none()
    }
}
