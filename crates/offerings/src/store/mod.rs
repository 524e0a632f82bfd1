//! Transaction-scoped record store used by the offering flows.
//!
//! A flow calls [`StoreProvider::begin`] once, performs every read and
//! write through the returned [`RecordStore`], and finishes with
//! [`RecordStore::commit`]. Dropping a store without committing discards
//! its writes.

use async_trait::async_trait;
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

use crate::error::OfferingResult;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryRecordStore, MemoryStoreProvider, MemoryTables};
pub use postgres::{PgRecordStore, PgStoreProvider};

/// One unit of work over the registrar tables.
///
/// Unique keys are enforced by every implementation: offering code,
/// `(offering, day)` for schedule rows, `(offering, student)` for grade
/// rows. Violations surface as `CoreError::Conflict`.
#[async_trait]
pub trait RecordStore: Send {
    // -- reference data --

    async fn find_course(&mut self, id: DbId) -> OfferingResult<Option<Course>>;
    async fn find_teacher(&mut self, id: DbId) -> OfferingResult<Option<Teacher>>;
    async fn find_program(&mut self, id: DbId) -> OfferingResult<Option<Program>>;
    /// IDs of every student in the block, ascending.
    async fn students_in_block(&mut self, block: &Block) -> OfferingResult<Vec<DbId>>;
    /// Students with the given IDs; unknown IDs are skipped.
    async fn find_students(&mut self, ids: &[DbId]) -> OfferingResult<Vec<Student>>;

    // -- course offerings --

    async fn code_exists(&mut self, code: &str) -> OfferingResult<bool>;
    async fn insert_offering(
        &mut self,
        input: &CreateCourseOffering,
    ) -> OfferingResult<CourseOffering>;
    async fn find_offering(&mut self, id: DbId) -> OfferingResult<Option<CourseOffering>>;
    /// Like [`find_offering`](Self::find_offering), but holds the row until
    /// the store is committed or dropped.
    async fn lock_offering(&mut self, id: DbId) -> OfferingResult<Option<CourseOffering>>;
    async fn update_offering(
        &mut self,
        id: DbId,
        input: &UpdateCourseOffering,
    ) -> OfferingResult<Option<CourseOffering>>;
    async fn delete_offering(&mut self, id: DbId) -> OfferingResult<bool>;

    // -- class schedules --

    /// Schedule rows of an offering ordered by day.
    async fn list_schedules(&mut self, offering_id: DbId) -> OfferingResult<Vec<ClassSchedule>>;
    async fn insert_schedule(
        &mut self,
        input: &CreateClassSchedule,
    ) -> OfferingResult<ClassSchedule>;
    async fn update_schedule(
        &mut self,
        id: DbId,
        input: &UpdateClassSchedule,
    ) -> OfferingResult<Option<ClassSchedule>>;
    async fn delete_schedule(&mut self, id: DbId) -> OfferingResult<bool>;
    async fn delete_schedules_for_offering(&mut self, offering_id: DbId) -> OfferingResult<u64>;

    // -- grades (enrollment) --

    async fn list_grades(&mut self, offering_id: DbId) -> OfferingResult<Vec<Grade>>;
    async fn insert_blank_grade(
        &mut self,
        offering_id: DbId,
        student_id: DbId,
    ) -> OfferingResult<Grade>;
    async fn delete_grade(&mut self, offering_id: DbId, student_id: DbId) -> OfferingResult<bool>;
    async fn delete_grades_for_offering(&mut self, offering_id: DbId) -> OfferingResult<u64>;

    /// Make every write of this unit of work durable.
    async fn commit(self) -> OfferingResult<()>;
}

/// Opens [`RecordStore`]s.
#[async_trait]
pub trait StoreProvider: Send + Sync {
    type Store: RecordStore;

    async fn begin(&self) -> OfferingResult<Self::Store>;
}
