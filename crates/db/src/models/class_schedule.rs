//! Class schedule entity model and DTOs.
//!
//! One row per (offering, day); `day` is the 1-6 weekday number.

use chrono::NaiveTime;
use registrar_core::types::{DbId, Timestamp};
use registrar_core::weekday::Weekday;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `class_schedules` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ClassSchedule {
    pub id: DbId,
    pub course_offering_id: DbId,
    pub day: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ClassSchedule {
    /// The row's weekday, or `None` if the stored number is out of range.
    pub fn weekday(&self) -> Option<Weekday> {
        Weekday::from_number(self.day)
    }
}

/// DTO for inserting a schedule row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassSchedule {
    pub course_offering_id: DbId,
    pub day: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: String,
}

/// DTO for rewriting a schedule row in place. The day never changes.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateClassSchedule {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: String,
}
