//! Notification kinds emitted by the offering flows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What happened to a course offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Sent to the creator.
    #[serde(rename = "offering.created")]
    OfferingCreated,
    /// Sent to the editor on every successful update.
    #[serde(rename = "offering.updated")]
    OfferingUpdated,
    /// Sent to the actor, carrying the offering label.
    #[serde(rename = "offering.deleted")]
    OfferingDeleted,
    /// Sent to the assigned teacher.
    #[serde(rename = "offering.teacher_assigned")]
    TeacherAssigned,
    /// Bulk summary of newly enrolled students, sent to the actor.
    #[serde(rename = "offering.students_added")]
    StudentsAdded,
    /// Sent to each newly enrolled student.
    #[serde(rename = "offering.student_added")]
    StudentAddedToOffering,
    /// Bulk summary of dropped students, sent to the actor.
    #[serde(rename = "offering.students_removed")]
    StudentsRemoved,
}

impl NotificationKind {
    /// Dot-separated name stored in `notifications.kind`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OfferingCreated => "offering.created",
            Self::OfferingUpdated => "offering.updated",
            Self::OfferingDeleted => "offering.deleted",
            Self::TeacherAssigned => "offering.teacher_assigned",
            Self::StudentsAdded => "offering.students_added",
            Self::StudentAddedToOffering => "offering.student_added",
            Self::StudentsRemoved => "offering.students_removed",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
