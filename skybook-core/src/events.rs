use async_trait::async_trait;
use skybook_shared::BookingEvent;

/// Outbound notification channel for booking lifecycle events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        event: &BookingEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Publisher used when no broker is configured: the event only goes to the log.
pub struct LogEventPublisher;

#[async_trait]
impl EventPublisher for LogEventPublisher {
    async fn publish(
        &self,
        event: &BookingEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            topic = event.topic(),
            pnr = %event.pnr,
            kind = ?event.kind,
            seats = event.seat_count,
            "Booking event (no broker configured)"
        );
        Ok(())
    }
}
