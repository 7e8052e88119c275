pub mod events;
pub mod pii;

pub use events::{BookingEvent, BookingEventKind, BOOKING_EVENTS_TOPIC};
pub use pii::Masked;
