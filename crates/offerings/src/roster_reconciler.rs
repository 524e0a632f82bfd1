//! Reconciles an offering's enrolled students against a desired set.
//!
//! Enrollment is stored as grade rows: one per (offering, student).

use std::collections::BTreeSet;

use registrar_core::error::CoreError;
use registrar_core::roster::{desired_roster, RosterDiff, RosterSelection};
use registrar_core::types::DbId;

use crate::error::OfferingResult;
use crate::store::RecordStore;

/// Computes and applies roster diffs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RosterReconciler;

impl RosterReconciler {
    /// Union of the selected block's students and the explicit extras.
    ///
    /// A partial block selector contributes nothing. Extras that do not
    /// name an existing student fail with a validation error.
    pub async fn desired_students<S: RecordStore>(
        &self,
        store: &mut S,
        selection: &RosterSelection,
    ) -> OfferingResult<BTreeSet<DbId>> {
        let block_students = match selection.block.resolve() {
            Some(block) => store.students_in_block(&block).await?,
            None => Vec::new(),
        };

        let extras: BTreeSet<DbId> = selection.extra_student_ids.iter().copied().collect();
        if !extras.is_empty() {
            let ids: Vec<DbId> = extras.iter().copied().collect();
            let known: BTreeSet<DbId> = store
                .find_students(&ids)
                .await?
                .into_iter()
                .map(|s| s.id)
                .collect();
            let unknown: Vec<String> = extras
                .difference(&known)
                .map(|id| id.to_string())
                .collect();
            if !unknown.is_empty() {
                return Err(CoreError::Validation(format!(
                    "Unknown student ids: {}",
                    unknown.join(", ")
                ))
                .into());
            }
        }

        Ok(desired_roster(block_students, &selection.extra_student_ids))
    }

    /// Student ids currently enrolled in the offering.
    pub async fn current_students<S: RecordStore>(
        &self,
        store: &mut S,
        offering_id: DbId,
    ) -> OfferingResult<BTreeSet<DbId>> {
        Ok(store
            .list_grades(offering_id)
            .await?
            .into_iter()
            .map(|g| g.student_id)
            .collect())
    }

    /// Make the enrolled set equal `desired`.
    ///
    /// Removed students lose their grade row; added students get a blank
    /// one. An empty `desired` drops everyone.
    pub async fn reconcile<S: RecordStore>(
        &self,
        store: &mut S,
        offering_id: DbId,
        desired: &BTreeSet<DbId>,
    ) -> OfferingResult<RosterDiff> {
        let current = self.current_students(store, offering_id).await?;
        let diff = RosterDiff::compute(&current, desired);

        tracing::debug!(
            offering_id,
            current = current.len(),
            added = diff.added.len(),
            removed = diff.removed.len(),
            "Reconciling roster"
        );

        for &student_id in &diff.removed {
            store.delete_grade(offering_id, student_id).await?;
        }
        for &student_id in &diff.added {
            store.insert_blank_grade(offering_id, student_id).await?;
        }

        Ok(diff)
    }
}
