//! Registrar domain core.
//!
//! Pure logic shared by the persistence and orchestration layers: id and
//! timestamp aliases, the domain error type, weekday handling, schedule
//! parsing and validation, roster set algebra, and offering-code rules.
//! This crate has zero internal deps and never touches the database.

pub mod error;
pub mod offering;
pub mod roster;
pub mod schedule;
pub mod types;
pub mod weekday;
