//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods that
//! accept `&mut PgConnection` as the first argument, so the same methods run
//! on a pooled connection or inside a transaction (`&mut *tx`).

pub mod class_schedule_repo;
pub mod course_offering_repo;
pub mod grade_repo;
pub mod notification_repo;
pub mod reference_repo;
pub mod student_repo;

pub use class_schedule_repo::ClassScheduleRepo;
pub use course_offering_repo::CourseOfferingRepo;
pub use grade_repo::GradeRepo;
pub use notification_repo::NotificationRepo;
pub use reference_repo::{CourseRepo, ProgramRepo, TeacherRepo};
pub use student_repo::StudentRepo;
