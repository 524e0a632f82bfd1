//! In-memory record store for tests and local tooling.
//!
//! [`MemoryStoreProvider`] owns one set of [`MemoryTables`]. Each store
//! works on a private copy taken at `begin` and holds the provider's lock
//! until it is committed or dropped, so units of work are serialisable.
//! `commit` writes the copy back; dropping discards it.
//!
//! [`MemoryStoreProvider::without_isolation`] releases the lock right after
//! copying, so concurrent units of work overwrite each other on commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
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
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{RecordStore, StoreProvider};
use crate::error::OfferingResult;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Every table the offering flows touch, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    pub programs: BTreeMap<DbId, Program>,
    pub courses: BTreeMap<DbId, Course>,
    pub teachers: BTreeMap<DbId, Teacher>,
    pub students: BTreeMap<DbId, Student>,
    pub offerings: BTreeMap<DbId, CourseOffering>,
    pub schedules: BTreeMap<DbId, ClassSchedule>,
    pub grades: BTreeMap<DbId, Grade>,
    next_id: DbId,
}

impl MemoryTables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    /// Schedule rows of an offering ordered by day, then id.
    pub fn schedules_for(&self, offering_id: DbId) -> Vec<ClassSchedule> {
        let mut rows: Vec<ClassSchedule> = self
            .schedules
            .values()
            .filter(|s| s.course_offering_id == offering_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.day, s.id));
        rows
    }

    /// Grade rows of an offering ordered by student.
    pub fn grades_for(&self, offering_id: DbId) -> Vec<Grade> {
        let mut rows: Vec<Grade> = self
            .grades
            .values()
            .filter(|g| g.course_offering_id == offering_id)
            .cloned()
            .collect();
        rows.sort_by_key(|g| g.student_id);
        rows
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Shared in-memory database.
#[derive(Clone)]
pub struct MemoryStoreProvider {
    tables: Arc<Mutex<MemoryTables>>,
    isolated: bool,
}

impl Default for MemoryStoreProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStoreProvider {
    pub fn new() -> Self {
        Self {
            tables: Arc::default(),
            isolated: true,
        }
    }

    /// A provider whose units of work do not exclude each other.
    ///
    /// `begin` copies the tables, releases the lock and yields once;
    /// `commit` replaces the tables wholesale. Last writer wins.
    pub fn without_isolation() -> Self {
        Self {
            tables: Arc::default(),
            isolated: false,
        }
    }

    /// A copy of the committed state.
    pub async fn snapshot(&self) -> MemoryTables {
        self.tables.lock().await.clone()
    }

    pub async fn add_program(&self, code: &str, name: &str) -> DbId {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.programs.insert(
            id,
            Program {
                id,
                code: code.to_string(),
                name: name.to_string(),
                created_at: Utc::now(),
            },
        );
        id
    }

    pub async fn add_course(&self, code: &str, title: &str) -> DbId {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.courses.insert(
            id,
            Course {
                id,
                code: code.to_string(),
                title: title.to_string(),
                created_at: Utc::now(),
            },
        );
        id
    }

    pub async fn add_teacher(&self, user_id: DbId, first_name: &str, last_name: &str) -> DbId {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.teachers.insert(
            id,
            Teacher {
                id,
                user_id,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Add a student to the block `(program_id, year_level, section)`.
    pub async fn add_student(
        &self,
        user_id: DbId,
        student_number: &str,
        program_id: DbId,
        year_level: &str,
        section: &str,
    ) -> DbId {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.students.insert(
            id,
            Student {
                id,
                user_id,
                student_number: student_number.to_string(),
                first_name: "Student".to_string(),
                last_name: student_number.to_string(),
                program_id,
                year_level: year_level.to_string(),
                section: section.to_string(),
                created_at: Utc::now(),
            },
        );
        id
    }
}

#[async_trait]
impl StoreProvider for MemoryStoreProvider {
    type Store = MemoryRecordStore;

    async fn begin(&self) -> OfferingResult<MemoryRecordStore> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        if self.isolated {
            return Ok(MemoryRecordStore {
                target: Target::Held(guard),
                working,
            });
        }
        drop(guard);
        tokio::task::yield_now().await;
        Ok(MemoryRecordStore {
            target: Target::Detached(self.tables.clone()),
            working,
        })
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// A unit of work over [`MemoryTables`].
pub struct MemoryRecordStore {
    target: Target,
    working: MemoryTables,
}

/// Where a committed copy is written back.
enum Target {
    Held(OwnedMutexGuard<MemoryTables>),
    Detached(Arc<Mutex<MemoryTables>>),
}

fn conflict(what: String) -> CoreError {
    CoreError::Conflict(format!("Duplicate value violates {what}"))
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_course(&mut self, id: DbId) -> OfferingResult<Option<Course>> {
        Ok(self.working.courses.get(&id).cloned())
    }

    async fn find_teacher(&mut self, id: DbId) -> OfferingResult<Option<Teacher>> {
        Ok(self.working.teachers.get(&id).cloned())
    }

    async fn find_program(&mut self, id: DbId) -> OfferingResult<Option<Program>> {
        Ok(self.working.programs.get(&id).cloned())
    }

    async fn students_in_block(&mut self, block: &Block) -> OfferingResult<Vec<DbId>> {
        Ok(self
            .working
            .students
            .values()
            .filter(|s| {
                s.program_id == block.program_id
                    && s.year_level == block.year_level
                    && s.section == block.section
            })
            .map(|s| s.id)
            .collect())
    }

    async fn find_students(&mut self, ids: &[DbId]) -> OfferingResult<Vec<Student>> {
        Ok(self
            .working
            .students
            .values()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn code_exists(&mut self, code: &str) -> OfferingResult<bool> {
        Ok(self.working.offerings.values().any(|o| o.code == code))
    }

    async fn insert_offering(
        &mut self,
        input: &CreateCourseOffering,
    ) -> OfferingResult<CourseOffering> {
        if self.working.offerings.values().any(|o| o.code == input.code) {
            return Err(conflict("uq_course_offerings_code".to_string()).into());
        }
        let id = self.working.next_id();
        let now = Utc::now();
        let row = CourseOffering {
            id,
            code: input.code.clone(),
            course_id: input.course_id,
            teacher_id: input.teacher_id,
            program_id: input.program_id,
            semester: input.semester.clone(),
            school_year: input.school_year.clone(),
            units: input.units,
            offering_type: input.offering_type.clone(),
            created_at: now,
            updated_at: now,
        };
        self.working.offerings.insert(id, row.clone());
        Ok(row)
    }

    async fn find_offering(&mut self, id: DbId) -> OfferingResult<Option<CourseOffering>> {
        Ok(self.working.offerings.get(&id).cloned())
    }

    async fn lock_offering(&mut self, id: DbId) -> OfferingResult<Option<CourseOffering>> {
        // The whole store is already exclusive.
        self.find_offering(id).await
    }

    async fn update_offering(
        &mut self,
        id: DbId,
        input: &UpdateCourseOffering,
    ) -> OfferingResult<Option<CourseOffering>> {
        let Some(row) = self.working.offerings.get_mut(&id) else {
            return Ok(None);
        };
        row.course_id = input.course_id;
        row.teacher_id = input.teacher_id;
        row.program_id = input.program_id;
        row.semester = input.semester.clone();
        row.school_year = input.school_year.clone();
        row.units = input.units;
        row.offering_type = input.offering_type.clone();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete_offering(&mut self, id: DbId) -> OfferingResult<bool> {
        let removed = self.working.offerings.remove(&id).is_some();
        if removed {
            self.working
                .schedules
                .retain(|_, s| s.course_offering_id != id);
            self.working.grades.retain(|_, g| g.course_offering_id != id);
        }
        Ok(removed)
    }

    async fn list_schedules(&mut self, offering_id: DbId) -> OfferingResult<Vec<ClassSchedule>> {
        Ok(self.working.schedules_for(offering_id))
    }

    async fn insert_schedule(
        &mut self,
        input: &CreateClassSchedule,
    ) -> OfferingResult<ClassSchedule> {
        let taken = self
            .working
            .schedules
            .values()
            .any(|s| s.course_offering_id == input.course_offering_id && s.day == input.day);
        if taken {
            return Err(conflict("uq_class_schedules_offering_day".to_string()).into());
        }
        if !self.working.offerings.contains_key(&input.course_offering_id) {
            return Err(CoreError::NotFound {
                entity: "CourseOffering",
                id: input.course_offering_id,
            }
            .into());
        }
        let id = self.working.next_id();
        let now = Utc::now();
        let row = ClassSchedule {
            id,
            course_offering_id: input.course_offering_id,
            day: input.day,
            start_time: input.start_time,
            end_time: input.end_time,
            room: input.room.clone(),
            created_at: now,
            updated_at: now,
        };
        self.working.schedules.insert(id, row.clone());
        Ok(row)
    }

    async fn update_schedule(
        &mut self,
        id: DbId,
        input: &UpdateClassSchedule,
    ) -> OfferingResult<Option<ClassSchedule>> {
        let Some(row) = self.working.schedules.get_mut(&id) else {
            return Ok(None);
        };
        row.start_time = input.start_time;
        row.end_time = input.end_time;
        row.room = input.room.clone();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete_schedule(&mut self, id: DbId) -> OfferingResult<bool> {
        Ok(self.working.schedules.remove(&id).is_some())
    }

    async fn delete_schedules_for_offering(&mut self, offering_id: DbId) -> OfferingResult<u64> {
        let before = self.working.schedules.len();
        self.working
            .schedules
            .retain(|_, s| s.course_offering_id != offering_id);
        Ok((before - self.working.schedules.len()) as u64)
    }

    async fn list_grades(&mut self, offering_id: DbId) -> OfferingResult<Vec<Grade>> {
        Ok(self.working.grades_for(offering_id))
    }

    async fn insert_blank_grade(
        &mut self,
        offering_id: DbId,
        student_id: DbId,
    ) -> OfferingResult<Grade> {
        let taken = self
            .working
            .grades
            .values()
            .any(|g| g.course_offering_id == offering_id && g.student_id == student_id);
        if taken {
            return Err(conflict("uq_grades_offering_student".to_string()).into());
        }
        if !self.working.students.contains_key(&student_id) {
            return Err(CoreError::NotFound {
                entity: "Student",
                id: student_id,
            }
            .into());
        }
        let id = self.working.next_id();
        let now = Utc::now();
        let row = Grade {
            id,
            course_offering_id: offering_id,
            student_id,
            prelim_score: None,
            midterm_score: None,
            prefinal_score: None,
            final_score: None,
            created_at: now,
            updated_at: now,
        };
        self.working.grades.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_grade(&mut self, offering_id: DbId, student_id: DbId) -> OfferingResult<bool> {
        let before = self.working.grades.len();
        self.working
            .grades
            .retain(|_, g| !(g.course_offering_id == offering_id && g.student_id == student_id));
        Ok(self.working.grades.len() < before)
    }

    async fn delete_grades_for_offering(&mut self, offering_id: DbId) -> OfferingResult<u64> {
        let before = self.working.grades.len();
        self.working
            .grades
            .retain(|_, g| g.course_offering_id != offering_id);
        Ok((before - self.working.grades.len()) as u64)
    }

    async fn commit(self) -> OfferingResult<()> {
        match self.target {
            Target::Held(mut guard) => *guard = self.working,
            Target::Detached(tables) => *tables.lock().await = self.working,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::OfferingError;

    async fn seeded() -> (MemoryStoreProvider, CreateCourseOffering) {
        let provider = MemoryStoreProvider::new();
        let program_id = provider.add_program("BSCS", "Computer Science").await;
        let course_id = provider.add_course("CS101", "Intro").await;
        let teacher_id = provider.add_teacher(900, "Ada", "Reyes").await;
        let input = CreateCourseOffering {
            code: "48213".to_string(),
            course_id,
            teacher_id,
            program_id,
            semester: "1st".to_string(),
            school_year: "2025-2026".to_string(),
            units: 3,
            offering_type: "lecture".to_string(),
        };
        (provider, input)
    }

    #[tokio::test]
    async fn committed_writes_are_visible_to_later_stores() {
        let (provider, input) = seeded().await;

        let mut store = provider.begin().await.unwrap();
        let offering = store.insert_offering(&input).await.unwrap();
        store.commit().await.unwrap();

        let mut store = provider.begin().await.unwrap();
        assert!(store.code_exists("48213").await.unwrap());
        assert_eq!(store.find_offering(offering.id).await.unwrap(), Some(offering));
    }

    #[tokio::test]
    async fn dropped_store_discards_writes() {
        let (provider, input) = seeded().await;

        let mut store = provider.begin().await.unwrap();
        store.insert_offering(&input).await.unwrap();
        drop(store);

        assert!(provider.snapshot().await.offerings.is_empty());
    }

    #[tokio::test]
    async fn isolated_units_of_work_are_serialised() {
        let (provider, input) = seeded().await;

        let mut first = provider.begin().await.unwrap();
        first.insert_offering(&input).await.unwrap();

        let second = provider.clone();
        let waiter = tokio::spawn(async move {
            let mut store = second.begin().await.unwrap();
            store.code_exists("48213").await.unwrap()
        });
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        first.commit().await.unwrap();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn detached_units_of_work_overwrite_each_other() {
        let provider = MemoryStoreProvider::without_isolation();
        let program_id = provider.add_program("BSCS", "Computer Science").await;

        let mut first = provider.begin().await.unwrap();
        let mut second = provider.begin().await.unwrap();
        assert!(first.find_program(program_id).await.unwrap().is_some());

        first.working.programs.clear();
        first.commit().await.unwrap();
        assert!(provider.snapshot().await.programs.is_empty());

        second.working.courses.clear();
        second.commit().await.unwrap();
        assert_eq!(provider.snapshot().await.programs.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_code_is_a_conflict() {
        let (provider, input) = seeded().await;
        let mut store = provider.begin().await.unwrap();
        store.insert_offering(&input).await.unwrap();

        let err = store.insert_offering(&input).await.unwrap_err();
        assert_matches!(err, OfferingError::Core(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn one_schedule_row_per_day() {
        let (provider, input) = seeded().await;
        let mut store = provider.begin().await.unwrap();
        let offering = store.insert_offering(&input).await.unwrap();

        let row = CreateClassSchedule {
            course_offering_id: offering.id,
            day: 1,
            start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: chrono::NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            room: "A2-401".to_string(),
        };
        store.insert_schedule(&row).await.unwrap();
        let err = store.insert_schedule(&row).await.unwrap_err();
        assert_matches!(err, OfferingError::Core(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_offering_cascades() {
        let (provider, input) = seeded().await;
        let student = provider.add_student(1001, "S-1", input.program_id, "2", "A").await;

        let mut store = provider.begin().await.unwrap();
        let offering = store.insert_offering(&input).await.unwrap();
        store.insert_blank_grade(offering.id, student).await.unwrap();
        assert!(store.delete_offering(offering.id).await.unwrap());
        assert!(store.list_grades(offering.id).await.unwrap().is_empty());
        store.commit().await.unwrap();

        assert!(provider.snapshot().await.grades.is_empty());
    }
}
