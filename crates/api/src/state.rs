use std::sync::Arc;

use crate::config::ServerConfig;
use crate::payments::PaymentGateway;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// All collaborators are injected here — there is no global state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mentorbook_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing domain events.
    pub event_bus: Arc<mentorbook_events::EventBus>,
    /// Payment gateway collaborator.
    pub payment_gateway: Arc<dyn PaymentGateway>,
}
