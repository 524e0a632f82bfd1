//! Weekly class schedule rules.
//!
//! Covers parsing of the raw schedule form, the completeness policy, the
//! allowed time window, and the by-day diff plan used to reconcile stored
//! schedule rows. The weekday is the stable identity of a row within an
//! offering, so callers never deal with row ids.

use std::collections::BTreeSet;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;
use crate::weekday::{parse_day_set, Weekday};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Formats accepted for start/end times, tried in order.
const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"];

/// Whether incomplete schedule input on update clears the stored schedule.
///
/// Submitting a form without days, room, or valid times is how a schedule
/// is cleared; there is no separate "clear" action.
pub const CLEAR_ON_INCOMPLETE_INPUT: bool = true;

// ---------------------------------------------------------------------------
// Time window
// ---------------------------------------------------------------------------

/// The inclusive range of times a class may start or end at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub earliest: NaiveTime,
    pub latest: NaiveTime,
}

impl Default for ScheduleWindow {
    /// 07:30 to 21:30.
    fn default() -> Self {
        Self {
            earliest: NaiveTime::from_hms_opt(7, 30, 0).unwrap_or_default(),
            latest: NaiveTime::from_hms_opt(21, 30, 0).unwrap_or_default(),
        }
    }
}

impl ScheduleWindow {
    /// Check that both times lie inside the window and that `end` is
    /// strictly after `start`.
    pub fn validate(&self, start: NaiveTime, end: NaiveTime) -> Result<(), CoreError> {
        let earliest = self.earliest.format("%H:%M");
        let latest = self.latest.format("%H:%M");

        if start < self.earliest || start > self.latest {
            return Err(CoreError::Validation(format!(
                "Start time {} must be between {earliest} and {latest}",
                start.format("%H:%M")
            )));
        }
        if end < self.earliest || end > self.latest {
            return Err(CoreError::Validation(format!(
                "End time {} must be between {earliest} and {latest}",
                end.format("%H:%M")
            )));
        }
        if end <= start {
            return Err(CoreError::Validation(format!(
                "End time {} must be after start time {}",
                end.format("%H:%M"),
                start.format("%H:%M")
            )));
        }
        Ok(())
    }
}

/// Parse a time of day such as `"09:00"`, `"21:30:00"` or `"9:00 PM"`.
///
/// Returns `None` for blank or unparseable text.
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}

// ---------------------------------------------------------------------------
// Form parsing
// ---------------------------------------------------------------------------

/// Raw schedule fields as submitted alongside an offering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleForm {
    pub room: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Comma-separated day numbers, e.g. `"1,3"` for Monday and Wednesday.
    pub days: Option<String>,
}

/// Why a schedule form was treated as "no schedule".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompleteReason {
    NoDays,
    BlankRoom,
    InvalidStartTime,
    InvalidEndTime,
}

impl IncompleteReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoDays => "no_days",
            Self::BlankRoom => "blank_room",
            Self::InvalidStartTime => "invalid_start_time",
            Self::InvalidEndTime => "invalid_end_time",
        }
    }
}

/// A complete weekly slot: one room and time range repeated on each day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySlot {
    pub room: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub days: BTreeSet<Weekday>,
}

/// The caller's desired schedule after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredSchedule {
    Incomplete(IncompleteReason),
    Complete(WeeklySlot),
}

impl ScheduleForm {
    /// Parse the form without validating the time window.
    pub fn parse(&self) -> DesiredSchedule {
        let days = self.days.as_deref().map(parse_day_set).unwrap_or_default();
        if days.is_empty() {
            return DesiredSchedule::Incomplete(IncompleteReason::NoDays);
        }

        let room = self.room.as_deref().map(str::trim).unwrap_or_default();
        if room.is_empty() {
            return DesiredSchedule::Incomplete(IncompleteReason::BlankRoom);
        }

        let Some(start) = self.start_time.as_deref().and_then(parse_time_of_day) else {
            return DesiredSchedule::Incomplete(IncompleteReason::InvalidStartTime);
        };
        let Some(end) = self.end_time.as_deref().and_then(parse_time_of_day) else {
            return DesiredSchedule::Incomplete(IncompleteReason::InvalidEndTime);
        };

        DesiredSchedule::Complete(WeeklySlot {
            room: room.to_string(),
            start,
            end,
            days,
        })
    }
}

// ---------------------------------------------------------------------------
// Diff plan
// ---------------------------------------------------------------------------

/// Row-level changes needed to turn the stored schedule into the desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulePlan {
    /// Existing rows kept for their day and rewritten in place.
    pub update: Vec<(DbId, Weekday)>,
    /// Days that need a new row.
    pub insert: Vec<Weekday>,
    /// Existing rows whose day is no longer wanted.
    pub delete: Vec<(DbId, Weekday)>,
}

impl SchedulePlan {
    /// Plan an upsert keyed by weekday.
    ///
    /// If `existing` holds more than one row for a day, the first is kept
    /// and the rest are deleted.
    pub fn by_day(existing: &[(DbId, Weekday)], want: &BTreeSet<Weekday>) -> Self {
        let mut plan = Self::default();
        let mut seen = BTreeSet::new();

        for &(id, day) in existing {
            if want.contains(&day) && seen.insert(day) {
                plan.update.push((id, day));
            } else {
                plan.delete.push((id, day));
            }
        }
        plan.insert = want.difference(&seen).copied().collect();
        plan
    }

    /// Plan the removal of every existing row.
    pub fn clear(existing: &[(DbId, Weekday)]) -> Self {
        Self {
            delete: existing.to_vec(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.update.is_empty() && self.insert.is_empty() && self.delete.is_empty()
    }
}
