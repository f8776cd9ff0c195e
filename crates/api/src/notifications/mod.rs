//! In-process stand-in for the external notification collaborator.
//!
//! [`NotificationRelay`] subscribes to the event bus and hands each domain
//! event to the downstream notification service. Delivery is fire-and-forget
//! from the engine's perspective: publishing never blocks a request, and a
//! failed delivery only logs.

use tokio::sync::broadcast;

use mentorbook_events::{bus, DomainEvent};

/// Consumes domain events and forwards the notification-worthy ones.
pub struct NotificationRelay;

impl NotificationRelay {
    /// Run the relay loop.
    ///
    /// Subscribes to the event bus via `receiver`; the loop exits when the
    /// channel closes (i.e. the [`EventBus`](mentorbook_events::EventBus)
    /// is dropped).
    pub async fn run(mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => Self::deliver(&event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification relay shutting down");
                    break;
                }
            }
        }
    }

    /// Hand one event to the notification service.
    ///
    /// The cancellation notice is addressed to the mentor; the payload
    /// already carries the resolved identity and reason.
    fn deliver(event: &DomainEvent) {
        match event.event_type.as_str() {
            bus::ENGAGEMENT_CANCELLED => {
                tracing::info!(
                    engagement_id = ?event.source_entity_id,
                    mentor = %event.payload["mentor_email"].as_str().unwrap_or("<unknown>"),
                    reason = %event.payload["reason"].as_str().unwrap_or(""),
                    "Delivering cancellation notice"
                );
            }
            bus::REQUEST_DECIDED | bus::BOOKING_FINALIZED | bus::AMENDMENT_PROPOSED
            | bus::AMENDMENT_RESOLVED => {
                tracing::info!(
                    event_type = %event.event_type,
                    source_id = ?event.source_entity_id,
                    "Delivering notification"
                );
            }
            other => {
                tracing::debug!(event_type = %other, "Ignoring event with no notification rule");
            }
        }
    }
}
