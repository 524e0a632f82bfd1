//! Course offering orchestration service.
//!
//! Composes code generation, roster reconciliation, and schedule
//! reconciliation into the create, update, and delete flows. Each flow runs
//! in one [`RecordStore`] unit of work; notifications are emitted only after
//! it commits and describe only what changed.

use std::collections::BTreeSet;
use std::sync::Arc;

use registrar_core::error::CoreError;
use registrar_core::offering::{
    offering_label, validate_offering_form, OfferingForm, ValidatedOffering,
};
use registrar_core::roster::{RosterDiff, RosterSelection};
use registrar_core::schedule::ScheduleForm;
use registrar_core::types::DbId;
use registrar_db::models::class_schedule::ClassSchedule;
use registrar_db::models::course_offering::{
    CourseOffering, CreateCourseOffering, UpdateCourseOffering,
};
use registrar_db::models::reference::{Course, Teacher};
use registrar_events::{NotificationKind, NotificationSink, PlatformEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::code_generator::CodeGenerator;
use crate::config::OfferingConfig;
use crate::error::OfferingResult;
use crate::locks::OfferingLocks;
use crate::roster_reconciler::RosterReconciler;
use crate::schedule_reconciler::{ScheduleChange, ScheduleReconciler};
use crate::store::{RecordStore, StoreProvider};

/// Source entity type attached to every offering notification.
pub const OFFERING_ENTITY: &str = "course_offering";

// ---------------------------------------------------------------------------
// Requests and results
// ---------------------------------------------------------------------------

/// Everything submitted when creating an offering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOfferingRequest {
    pub actor_user_id: DbId,
    pub offering: OfferingForm,
    #[serde(default)]
    pub roster: RosterSelection,
    #[serde(default)]
    pub schedule: ScheduleForm,
}

/// Everything submitted when editing an offering. `offering.code` is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOfferingRequest {
    pub offering_id: DbId,
    pub actor_user_id: DbId,
    pub offering: OfferingForm,
    #[serde(default)]
    pub roster: RosterSelection,
    #[serde(default)]
    pub schedule: ScheduleForm,
}

/// What a create or update flow wrote.
#[derive(Debug, Clone, Serialize)]
pub struct OfferingOutcome {
    pub offering: CourseOffering,
    pub roster: RosterDiff,
    pub schedule: ScheduleChange,
}

/// An offering with its schedule rows and enrolled students.
#[derive(Debug, Clone, Serialize)]
pub struct OfferingDetail {
    pub offering: CourseOffering,
    /// Ordered by weekday.
    pub schedules: Vec<ClassSchedule>,
    pub student_ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs the offering flows against a [`StoreProvider`].
///
/// Create:
/// 1. Validate the form and its references.
/// 2. Resolve or generate the code.
/// 3. Insert the offering.
/// 4. Enroll the desired roster.
/// 5. Write the schedule.
/// 6. Commit, then notify creator, teacher, and new students.
///
/// Update and delete are serialised per offering via [`OfferingLocks`].
pub struct AssignmentOrchestrator<P: StoreProvider> {
    provider: P,
    sink: Arc<dyn NotificationSink>,
    codes: CodeGenerator,
    schedules: ScheduleReconciler,
    roster: RosterReconciler,
    locks: OfferingLocks,
}

impl<P: StoreProvider> AssignmentOrchestrator<P> {
    pub fn new(provider: P, sink: Arc<dyn NotificationSink>, config: &OfferingConfig) -> Self {
        Self {
            provider,
            sink,
            codes: CodeGenerator::new(config.code_max_attempts),
            schedules: ScheduleReconciler::from_config(config),
            roster: RosterReconciler,
            locks: OfferingLocks::new(),
        }
    }

    /// Replace the code generator, e.g. with a scripted candidate source.
    pub fn with_code_generator(mut self, codes: CodeGenerator) -> Self {
        self.codes = codes;
        self
    }

    /// Create an offering with its roster and schedule.
    pub async fn create(&self, request: CreateOfferingRequest) -> OfferingResult<OfferingOutcome> {
        let form = validate_offering_form(&request.offering)?;

        let mut store = self.provider.begin().await?;
        let (course, teacher) = check_references(&mut store, &form).await?;

        let code = self
            .codes
            .resolve(
                &mut store,
                request.offering.code.as_deref(),
                form.course_id,
                &form.term,
            )
            .await?;

        let offering = store
            .insert_offering(&CreateCourseOffering {
                code,
                course_id: form.course_id,
                teacher_id: form.teacher_id,
                program_id: form.program_id,
                semester: form.term.semester.clone(),
                school_year: form.term.school_year.clone(),
                units: form.units,
                offering_type: form.offering_type.clone(),
            })
            .await?;

        let desired = self
            .roster
            .desired_students(&mut store, &request.roster)
            .await?;
        let roster = self.roster.reconcile(&mut store, offering.id, &desired).await?;
        let schedule = self
            .schedules
            .create_lenient(&mut store, offering.id, &request.schedule)
            .await?;
        let added_users = student_user_ids(&mut store, &roster.added).await?;

        store.commit().await?;

        tracing::info!(
            offering_id = offering.id,
            code = %offering.code,
            added = roster.added.len(),
            days = schedule.inserted.len(),
            "Course offering created"
        );

        let label = offering_label(&offering.code, &course.code);
        let actor = request.actor_user_id;
        self.sink.notify(
            offering_event(NotificationKind::OfferingCreated, &offering, actor)
                .with_payload(json!({ "code": offering.code, "label": label })),
        );
        self.sink.notify(
            offering_event(NotificationKind::TeacherAssigned, &offering, actor)
                .with_target(teacher.user_id)
                .with_payload(json!({ "code": offering.code, "label": label })),
        );
        self.notify_added(&offering, actor, &label, &roster, &added_users);

        Ok(OfferingOutcome {
            offering,
            roster,
            schedule,
        })
    }

    /// Update an offering's fields and reconcile its roster and schedule.
    ///
    /// The code never changes. Fails with `NotFound` if the offering does
    /// not exist.
    pub async fn update(&self, request: UpdateOfferingRequest) -> OfferingResult<OfferingOutcome> {
        let offering_id = request.offering_id;
        let _guard = self.locks.acquire(offering_id).await;

        let mut store = self.provider.begin().await?;
        let previous = store
            .lock_offering(offering_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CourseOffering",
                id: offering_id,
            })?;

        let form = validate_offering_form(&request.offering)?;
        let (course, teacher) = check_references(&mut store, &form).await?;

        let offering = store
            .update_offering(
                offering_id,
                &UpdateCourseOffering {
                    course_id: form.course_id,
                    teacher_id: form.teacher_id,
                    program_id: form.program_id,
                    semester: form.term.semester.clone(),
                    school_year: form.term.school_year.clone(),
                    units: form.units,
                    offering_type: form.offering_type.clone(),
                },
            )
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CourseOffering",
                id: offering_id,
            })?;

        let desired = self
            .roster
            .desired_students(&mut store, &request.roster)
            .await?;
        let roster = self.roster.reconcile(&mut store, offering_id, &desired).await?;
        let schedule = self
            .schedules
            .upsert_lenient(&mut store, offering_id, &request.schedule)
            .await?;
        let added_users = student_user_ids(&mut store, &roster.added).await?;

        store.commit().await?;

        tracing::info!(
            offering_id,
            added = roster.added.len(),
            removed = roster.removed.len(),
            schedule_cleared = schedule.cleared,
            "Course offering updated"
        );

        let label = offering_label(&offering.code, &course.code);
        let actor = request.actor_user_id;
        self.sink.notify(
            offering_event(NotificationKind::OfferingUpdated, &offering, actor)
                .with_payload(json!({ "code": offering.code, "label": label })),
        );
        if previous.teacher_id != offering.teacher_id {
            self.sink.notify(
                offering_event(NotificationKind::TeacherAssigned, &offering, actor)
                    .with_target(teacher.user_id)
                    .with_payload(json!({ "code": offering.code, "label": label })),
            );
        }
        self.notify_added(&offering, actor, &label, &roster, &added_users);
        if !roster.removed.is_empty() {
            self.sink.notify(
                offering_event(NotificationKind::StudentsRemoved, &offering, actor).with_payload(
                    json!({
                        "code": offering.code,
                        "label": label,
                        "count": roster.removed.len(),
                        "student_ids": roster.removed,
                    }),
                ),
            );
        }

        Ok(OfferingOutcome {
            offering,
            roster,
            schedule,
        })
    }

    /// Delete an offering together with its grade and schedule rows.
    ///
    /// Fails with `NotFound` if the offering does not exist.
    pub async fn delete(&self, offering_id: DbId, actor_user_id: DbId) -> OfferingResult<()> {
        let _guard = self.locks.acquire(offering_id).await;

        let mut store = self.provider.begin().await?;
        let offering = store
            .lock_offering(offering_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CourseOffering",
                id: offering_id,
            })?;
        let course_code = match store.find_course(offering.course_id).await? {
            Some(course) => course.code,
            None => offering.course_id.to_string(),
        };

        let grades = store.delete_grades_for_offering(offering_id).await?;
        let schedules = store.delete_schedules_for_offering(offering_id).await?;
        store.delete_offering(offering_id).await?;
        store.commit().await?;

        tracing::info!(
            offering_id,
            code = %offering.code,
            grades,
            schedules,
            "Course offering deleted"
        );

        let label = offering_label(&offering.code, &course_code);
        self.sink.notify(
            offering_event(NotificationKind::OfferingDeleted, &offering, actor_user_id)
                .with_payload(json!({ "code": offering.code, "label": label })),
        );
        Ok(())
    }

    /// Load an offering with its schedule and roster.
    pub async fn get(&self, offering_id: DbId) -> OfferingResult<OfferingDetail> {
        let mut store = self.provider.begin().await?;
        let offering = store
            .find_offering(offering_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CourseOffering",
                id: offering_id,
            })?;
        let schedules = store.list_schedules(offering_id).await?;
        let student_ids = self
            .roster
            .current_students(&mut store, offering_id)
            .await?
            .into_iter()
            .collect();
        store.commit().await?;

        Ok(OfferingDetail {
            offering,
            schedules,
            student_ids,
        })
    }

    /// One notification per newly enrolled student plus a summary for the actor.
    fn notify_added(
        &self,
        offering: &CourseOffering,
        actor: DbId,
        label: &str,
        roster: &RosterDiff,
        added_users: &[DbId],
    ) {
        if roster.added.is_empty() {
            return;
        }
        for &user_id in added_users {
            self.sink.notify(
                offering_event(NotificationKind::StudentAddedToOffering, offering, actor)
                    .with_target(user_id)
                    .with_payload(json!({ "code": offering.code, "label": label })),
            );
        }
        self.sink.notify(
            offering_event(NotificationKind::StudentsAdded, offering, actor).with_payload(json!({
                "code": offering.code,
                "label": label,
                "count": roster.added.len(),
                "student_ids": roster.added,
            })),
        );
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn offering_event(kind: NotificationKind, offering: &CourseOffering, actor: DbId) -> PlatformEvent {
    PlatformEvent::new(kind)
        .with_source(OFFERING_ENTITY, offering.id)
        .with_actor(actor)
}

/// Ensure the course, teacher, and program the form names exist.
async fn check_references<S: RecordStore>(
    store: &mut S,
    form: &ValidatedOffering,
) -> OfferingResult<(Course, Teacher)> {
    let course = store
        .find_course(form.course_id)
        .await?
        .ok_or_else(|| unknown("Course", form.course_id))?;
    let teacher = store
        .find_teacher(form.teacher_id)
        .await?
        .ok_or_else(|| unknown("Teacher", form.teacher_id))?;
    store
        .find_program(form.program_id)
        .await?
        .ok_or_else(|| unknown("Program", form.program_id))?;
    Ok((course, teacher))
}

fn unknown(entity: &str, id: DbId) -> CoreError {
    CoreError::Validation(format!("{entity} {id} does not exist"))
}

/// User ids of the given students, in student id order.
async fn student_user_ids<S: RecordStore>(
    store: &mut S,
    student_ids: &BTreeSet<DbId>,
) -> OfferingResult<Vec<DbId>> {
    if student_ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<DbId> = student_ids.iter().copied().collect();
    Ok(store
        .find_students(&ids)
        .await?
        .into_iter()
        .map(|s| s.user_id)
        .collect())
}
