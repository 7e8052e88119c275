pub mod events;
pub mod flight;
pub mod inventory;
pub mod repository;
pub mod ticket;
pub mod user;
pub mod validation;

pub use flight::{AirlineSearch, Flight, FlightSearch, InventoryError, NewFlight};
pub use inventory::InventoryClient;
pub use repository::{FlightRepository, StoreError, TicketRepository, UserRepository};
pub use ticket::{BookingRequest, CancelOutcome, Passenger, PassengerRequest, Ticket, TripType};
pub use validation::{FieldError, ValidationErrors};

/// Failures surfaced by the booking orchestrator.
///
/// `InvalidRequest`, `Conflict` and `NotFound` carry a caller-facing reason
/// that is returned verbatim.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// The inventory service did not answer in time or could not be reached.
    #[error("Inventory service unavailable: {0}")]
    Unavailable(String),

    /// A forward step failed and undoing the earlier steps failed as well.
    #[error("{cause}; compensation failed: {compensation}")]
    CompensationFailed {
        cause: Box<BookingError>,
        compensation: String,
    },

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl BookingError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Unavailable(_))
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => BookingError::Conflict(msg),
            StoreError::NotFound(msg) => BookingError::NotFound(msg),
            StoreError::Backend(msg) => BookingError::Storage(msg),
        }
    }
}

impl From<ValidationErrors> for BookingError {
    fn from(errors: ValidationErrors) -> Self {
        BookingError::Validation(errors)
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_text_is_verbatim() {
        let err = BookingError::InvalidRequest("Not enough seats in return flight".to_string());
        assert_eq!(err.to_string(), "Not enough seats in return flight");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_compensation_failure_keeps_original_cause() {
        let err = BookingError::CompensationFailed {
            cause: Box::new(BookingError::Conflict("Not enough seats in return flight".to_string())),
            compensation: "release of 2 seats on FL1 failed: Flight not found: FL1".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("Not enough seats in return flight"));
        assert!(text.contains("compensation failed"));
    }

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(BookingError::Unavailable("timed out".to_string()).is_retryable());
        assert!(!BookingError::from(StoreError::Backend("io".to_string())).is_retryable());
    }
}
