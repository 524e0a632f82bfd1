//! Enrollment roster selection and set algebra.
//!
//! The desired roster of an offering is the union of every student in a
//! block (program + year level + section) and an explicit list of extra
//! students. Reconciliation against the current roster is pure set
//! difference, independent of any persistence mechanism.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Block selection
// ---------------------------------------------------------------------------

/// A possibly partial block selector as submitted by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockSelector {
    pub program_id: Option<DbId>,
    pub year_level: Option<String>,
    pub section: Option<String>,
}

/// A fully specified block of students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub program_id: DbId,
    pub year_level: String,
    pub section: String,
}

impl BlockSelector {
    /// Resolve into a [`Block`] when all three parts are present.
    ///
    /// Blank year level or section counts as missing.
    pub fn resolve(&self) -> Option<Block> {
        let program_id = self.program_id?;
        let year_level = self.year_level.as_deref().map(str::trim)?;
        let section = self.section.as_deref().map(str::trim)?;
        if year_level.is_empty() || section.is_empty() {
            return None;
        }
        Some(Block {
            program_id,
            year_level: year_level.to_string(),
            section: section.to_string(),
        })
    }
}

/// The caller's roster input: a block selector plus explicit extra students.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSelection {
    #[serde(default)]
    pub block: BlockSelector,
    #[serde(default)]
    pub extra_student_ids: Vec<DbId>,
}

/// Union the students found in a block with the explicit extras.
pub fn desired_roster(
    block_students: impl IntoIterator<Item = DbId>,
    extra_student_ids: &[DbId],
) -> BTreeSet<DbId> {
    block_students
        .into_iter()
        .chain(extra_student_ids.iter().copied())
        .collect()
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Students to enroll and to drop so that the roster matches the target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterDiff {
    pub added: BTreeSet<DbId>,
    pub removed: BTreeSet<DbId>,
}

impl RosterDiff {
    /// `added = desired - current`, `removed = current - desired`.
    pub fn compute(current: &BTreeSet<DbId>, desired: &BTreeSet<DbId>) -> Self {
        Self {
            added: desired.difference(current).copied().collect(),
            removed: current.difference(desired).copied().collect(),
        }
    }

    /// Apply the diff to a roster.
    pub fn apply(&self, current: &BTreeSet<DbId>) -> BTreeSet<DbId> {
        current
            .difference(&self.removed)
            .chain(self.added.iter())
            .copied()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
