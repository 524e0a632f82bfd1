//! PostgreSQL record store: one `sqlx` transaction per unit of work.

use async_trait::async_trait;
use registrar_core::error::CoreError;
use registrar_core::roster::Block;
use registrar_core::types::DbId;
use registrar_db::models::class_schedule::{
    ClassSchedule, CreateClassSchedule, UpdateClassSchedule,
};
use registrar_db::models::course_offering::{
    CourseOffering, CreateCourseOffering, UpdateCourseOffering,
};
use registrar_db::models::grade::Grade;
use registrar_db::models::reference::{Course, Program, Teacher};
use registrar_db::models::student::Student;
use registrar_db::repositories::{
    ClassScheduleRepo, CourseOfferingRepo, CourseRepo, GradeRepo, ProgramRepo, StudentRepo,
    TeacherRepo,
};
use registrar_db::DbPool;
use sqlx::{Postgres, Transaction};

use super::{RecordStore, StoreProvider};
use crate::error::{OfferingError, OfferingResult};

/// Opens a [`PgRecordStore`] on a pooled connection.
#[derive(Clone)]
pub struct PgStoreProvider {
    pool: DbPool,
}

impl PgStoreProvider {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreProvider for PgStoreProvider {
    type Store = PgRecordStore;

    async fn begin(&self) -> OfferingResult<PgRecordStore> {
        let tx = self.pool.begin().await?;
        Ok(PgRecordStore { tx })
    }
}

/// A [`RecordStore`] backed by an open transaction. Dropping it without
/// [`commit`](RecordStore::commit) rolls back.
pub struct PgRecordStore {
    tx: Transaction<'static, Postgres>,
}

/// Map unique violations onto [`CoreError::Conflict`], naming the constraint.
fn map_unique(err: sqlx::Error) -> OfferingError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique constraint");
            return CoreError::Conflict(format!("Duplicate value violates {constraint}")).into();
        }
    }
    err.into()
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_course(&mut self, id: DbId) -> OfferingResult<Option<Course>> {
        Ok(CourseRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn find_teacher(&mut self, id: DbId) -> OfferingResult<Option<Teacher>> {
        Ok(TeacherRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn find_program(&mut self, id: DbId) -> OfferingResult<Option<Program>> {
        Ok(ProgramRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn students_in_block(&mut self, block: &Block) -> OfferingResult<Vec<DbId>> {
        Ok(StudentRepo::list_ids_in_block(
            &mut self.tx,
            block.program_id,
            &block.year_level,
            &block.section,
        )
        .await?)
    }

    async fn find_students(&mut self, ids: &[DbId]) -> OfferingResult<Vec<Student>> {
        Ok(StudentRepo::find_by_ids(&mut self.tx, ids).await?)
    }

    async fn code_exists(&mut self, code: &str) -> OfferingResult<bool> {
        Ok(CourseOfferingRepo::code_exists(&mut self.tx, code).await?)
    }

    async fn insert_offering(
        &mut self,
        input: &CreateCourseOffering,
    ) -> OfferingResult<CourseOffering> {
        CourseOfferingRepo::create(&mut self.tx, input)
            .await
            .map_err(map_unique)
    }

    async fn find_offering(&mut self, id: DbId) -> OfferingResult<Option<CourseOffering>> {
        Ok(CourseOfferingRepo::find_by_id(&mut self.tx, id).await?)
    }

    async fn lock_offering(&mut self, id: DbId) -> OfferingResult<Option<CourseOffering>> {
        Ok(CourseOfferingRepo::find_by_id_for_update(&mut self.tx, id).await?)
    }

    async fn update_offering(
        &mut self,
        id: DbId,
        input: &UpdateCourseOffering,
    ) -> OfferingResult<Option<CourseOffering>> {
        Ok(CourseOfferingRepo::update(&mut self.tx, id, input).await?)
    }

    async fn delete_offering(&mut self, id: DbId) -> OfferingResult<bool> {
        Ok(CourseOfferingRepo::delete(&mut self.tx, id).await?)
    }

    async fn list_schedules(&mut self, offering_id: DbId) -> OfferingResult<Vec<ClassSchedule>> {
        Ok(ClassScheduleRepo::list_for_offering(&mut self.tx, offering_id).await?)
    }

    async fn insert_schedule(
        &mut self,
        input: &CreateClassSchedule,
    ) -> OfferingResult<ClassSchedule> {
        ClassScheduleRepo::create(&mut self.tx, input)
            .await
            .map_err(map_unique)
    }

    async fn update_schedule(
        &mut self,
        id: DbId,
        input: &UpdateClassSchedule,
    ) -> OfferingResult<Option<ClassSchedule>> {
        Ok(ClassScheduleRepo::update(&mut self.tx, id, input).await?)
    }

    async fn delete_schedule(&mut self, id: DbId) -> OfferingResult<bool> {
        Ok(ClassScheduleRepo::delete(&mut self.tx, id).await?)
    }

    async fn delete_schedules_for_offering(&mut self, offering_id: DbId) -> OfferingResult<u64> {
        Ok(ClassScheduleRepo::delete_for_offering(&mut self.tx, offering_id).await?)
    }

    async fn list_grades(&mut self, offering_id: DbId) -> OfferingResult<Vec<Grade>> {
        Ok(GradeRepo::list_for_offering(&mut self.tx, offering_id).await?)
    }

    async fn insert_blank_grade(
        &mut self,
        offering_id: DbId,
        student_id: DbId,
    ) -> OfferingResult<Grade> {
        GradeRepo::create_blank(&mut self.tx, offering_id, student_id)
            .await
            .map_err(map_unique)
    }

    async fn delete_grade(&mut self, offering_id: DbId, student_id: DbId) -> OfferingResult<bool> {
        Ok(GradeRepo::delete_for_student(&mut self.tx, offering_id, student_id).await?)
    }

    async fn delete_grades_for_offering(&mut self, offering_id: DbId) -> OfferingResult<u64> {
        Ok(GradeRepo::delete_for_offering(&mut self.tx, offering_id).await?)
    }

    async fn commit(self) -> OfferingResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
