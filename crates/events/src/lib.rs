//! Domain-event infrastructure for the booking engine.
//!
//! The engine emits events (booking finalized, amendment resolved,
//! engagement cancelled) for external collaborators such as the notification
//! service. Publishing is fire-and-forget: the engine never awaits delivery
//! confirmation.

pub mod bus;

pub use bus::{DomainEvent, EventBus};
