//! Registrar event bus and notification delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the notification event envelope.
//! - [`NotificationKind`]: the closed set of events offering flows emit.
//! - [`NotificationSink`]: the seam producers publish through.
//! - [`NotificationPersistence`]: background service that writes every
//!   event to the `notifications` table.

pub mod bus;
pub mod kinds;
pub mod persistence;

pub use bus::{EventBus, NotificationSink, PlatformEvent};
pub use kinds::NotificationKind;
pub use persistence::NotificationPersistence;
