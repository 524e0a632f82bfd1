//! Reconciles an offering's weekly schedule rows against a submitted form.

use registrar_core::schedule::{
    DesiredSchedule, ScheduleForm, SchedulePlan, ScheduleWindow, WeeklySlot,
};
use registrar_core::types::DbId;
use registrar_core::weekday::Weekday;
use registrar_db::models::class_schedule::{CreateClassSchedule, UpdateClassSchedule};
use serde::Serialize;

use crate::config::OfferingConfig;
use crate::error::OfferingResult;
use crate::store::RecordStore;

/// Days touched by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleChange {
    pub inserted: Vec<Weekday>,
    pub updated: Vec<Weekday>,
    pub deleted: Vec<Weekday>,
    /// The form was incomplete and every existing row was removed.
    pub cleared: bool,
}

impl ScheduleChange {
    /// Whether any row was written or removed.
    pub fn wrote(&self) -> bool {
        !(self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty())
    }
}

/// Applies the lenient schedule policy: a complete form is validated and
/// upserted by weekday, an incomplete one means "no schedule".
#[derive(Debug, Clone)]
pub struct ScheduleReconciler {
    window: ScheduleWindow,
    clear_on_incomplete_input: bool,
}

impl ScheduleReconciler {
    pub fn new(window: ScheduleWindow, clear_on_incomplete_input: bool) -> Self {
        Self {
            window,
            clear_on_incomplete_input,
        }
    }

    pub fn from_config(config: &OfferingConfig) -> Self {
        Self::new(config.window, config.clear_on_incomplete_input)
    }

    /// Write the schedule of a freshly created offering.
    ///
    /// Incomplete input writes nothing. Complete input outside the time
    /// window fails with a validation error before any row is written.
    pub async fn create_lenient<S: RecordStore>(
        &self,
        store: &mut S,
        offering_id: DbId,
        form: &ScheduleForm,
    ) -> OfferingResult<ScheduleChange> {
        let slot = match form.parse() {
            DesiredSchedule::Complete(slot) => slot,
            DesiredSchedule::Incomplete(reason) => {
                tracing::debug!(offering_id, reason = reason.as_str(), "No schedule submitted");
                return Ok(ScheduleChange::default());
            }
        };
        self.window.validate(slot.start, slot.end)?;

        let plan = SchedulePlan::by_day(&[], &slot.days);
        self.apply(store, offering_id, &slot, plan).await
    }

    /// Bring the stored schedule of an existing offering in line with `form`.
    ///
    /// Rows are keyed by weekday: kept days are rewritten in place, new days
    /// inserted, dropped days deleted. Incomplete input clears every row
    /// while the clear-on-incomplete policy is on, and is ignored otherwise.
    pub async fn upsert_lenient<S: RecordStore>(
        &self,
        store: &mut S,
        offering_id: DbId,
        form: &ScheduleForm,
    ) -> OfferingResult<ScheduleChange> {
        let desired = form.parse();
        if let DesiredSchedule::Complete(slot) = &desired {
            self.window.validate(slot.start, slot.end)?;
        }

        let existing: Vec<(DbId, Weekday)> = store
            .list_schedules(offering_id)
            .await?
            .iter()
            .filter_map(|row| row.weekday().map(|day| (row.id, day)))
            .collect();

        match desired {
            DesiredSchedule::Complete(slot) => {
                let plan = SchedulePlan::by_day(&existing, &slot.days);
                self.apply(store, offering_id, &slot, plan).await
            }
            DesiredSchedule::Incomplete(reason) if self.clear_on_incomplete_input => {
                tracing::debug!(
                    offering_id,
                    reason = reason.as_str(),
                    rows = existing.len(),
                    "Incomplete schedule, clearing"
                );
                let plan = SchedulePlan::clear(&existing);
                for &(id, _) in &plan.delete {
                    store.delete_schedule(id).await?;
                }
                Ok(ScheduleChange {
                    deleted: plan.delete.iter().map(|&(_, day)| day).collect(),
                    cleared: true,
                    ..ScheduleChange::default()
                })
            }
            DesiredSchedule::Incomplete(reason) => {
                tracing::debug!(
                    offering_id,
                    reason = reason.as_str(),
                    "Incomplete schedule, keeping stored rows"
                );
                Ok(ScheduleChange::default())
            }
        }
    }

    async fn apply<S: RecordStore>(
        &self,
        store: &mut S,
        offering_id: DbId,
        slot: &WeeklySlot,
        plan: SchedulePlan,
    ) -> OfferingResult<ScheduleChange> {
        tracing::debug!(
            offering_id,
            update = plan.update.len(),
            insert = plan.insert.len(),
            delete = plan.delete.len(),
            "Applying schedule plan"
        );

        for &(id, _) in &plan.delete {
            store.delete_schedule(id).await?;
        }

        let rewrite = UpdateClassSchedule {
            start_time: slot.start,
            end_time: slot.end,
            room: slot.room.clone(),
        };
        for &(id, _) in &plan.update {
            store.update_schedule(id, &rewrite).await?;
        }

        for &day in &plan.insert {
            store
                .insert_schedule(&CreateClassSchedule {
                    course_offering_id: offering_id,
                    day: day.number(),
                    start_time: slot.start,
                    end_time: slot.end,
                    room: slot.room.clone(),
                })
                .await?;
        }

        Ok(ScheduleChange {
            inserted: plan.insert,
            updated: plan.update.into_iter().map(|(_, day)| day).collect(),
            deleted: plan.delete.into_iter().map(|(_, day)| day).collect(),
            cleared: false,
        })
    }
}
