use crate::pii::Masked;

/// Kafka topic carrying booking lifecycle notifications.
pub const BOOKING_EVENTS_TOPIC: &str = "booking.events";

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingEventKind {
    Booked,
    Cancelled,
}

/// Notification emitted after a booking or a cancellation went through.
/// Downstream consumers (e-mail, analytics) key on `pnr`.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingEvent {
    pub kind: BookingEventKind,
    pub pnr: String,
    pub user_email: Masked<String>,
    pub departure_flight_id: String,
    pub return_flight_id: Option<String>,
    pub seat_count: u32,
    pub total_price: i64,
    pub occurred_at: i64,
}

impl BookingEvent {
    pub fn topic(&self) -> &'static str {
        BOOKING_EVENTS_TOPIC
    }

    pub fn key(&self) -> &str {
        &self.pnr
    }
}
