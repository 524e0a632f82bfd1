//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO for in-place changes where rows are mutable

pub mod class_schedule;
pub mod course_offering;
pub mod grade;
pub mod notification;
pub mod reference;
pub mod student;
