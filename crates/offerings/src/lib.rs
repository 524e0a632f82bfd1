//! Course offering orchestration.
//!
//! Creates, updates and deletes course offerings together with their
//! weekly schedule rows and enrollment (grade) rows, and emits
//! notifications describing exactly what changed.
//!
//! - [`AssignmentOrchestrator`]: the create / update / delete / get flows.
//! - [`CodeGenerator`]: unique 5-digit offering codes.
//! - [`ScheduleReconciler`]: upsert-by-weekday of schedule rows.
//! - [`RosterReconciler`]: set diff of enrolled students.
//! - [`command`]: JSON line commands driving the flows.
//! - [`store`]: the transaction-scoped [`RecordStore`](store::RecordStore)
//!   with PostgreSQL and in-memory implementations.

pub mod code_generator;
pub mod command;
pub mod config;
pub mod error;
pub mod locks;
pub mod orchestrator;
pub mod roster_reconciler;
pub mod schedule_reconciler;
pub mod store;

pub use code_generator::CodeGenerator;
pub use config::OfferingConfig;
pub use error::{OfferingError, OfferingResult};
pub use locks::OfferingLocks;
pub use orchestrator::{
    AssignmentOrchestrator, CreateOfferingRequest, OfferingDetail, OfferingOutcome,
    UpdateOfferingRequest,
};
pub use roster_reconciler::RosterReconciler;
pub use schedule_reconciler::{ScheduleChange, ScheduleReconciler};
