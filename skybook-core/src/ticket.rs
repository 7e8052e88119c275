use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CANCELLED_SUCCESSFULLY: &str = "Cancelled Successfully";
pub const ALREADY_CANCELLED: &str = "Ticket already cancelled";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::OneWay => "ONE_WAY",
            TripType::RoundTrip => "ROUND_TRIP",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ONE_WAY" => Some(TripType::OneWay),
            "ROUND_TRIP" => Some(TripType::RoundTrip),
            _ => None,
        }
    }
}

/// One booking. Keyed by its PNR; never deleted, only cancelled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    pub id: Uuid,
    pub pnr: String,
    pub user_email: String,
    pub departure_flight_id: String,
    /// Set if and only if `trip_type` is `RoundTrip`.
    pub return_flight_id: Option<String>,
    pub trip_type: TripType,
    pub booking_time: DateTime<Utc>,
    /// Comma-separated seat labels, one per passenger.
    pub seats_booked: String,
    pub total_price: i64,
    pub canceled: bool,
}

impl Ticket {
    /// Seats held by this ticket on each of its flights.
    ///
    /// Cancellation releases exactly this many seats, so the stored label
    /// string is the source of truth rather than the passenger rows.
    pub fn seat_count(&self) -> u32 {
        count_seat_labels(&self.seats_booked)
    }

    /// Flights this ticket holds seats on, departure first.
    pub fn flight_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.departure_flight_id.as_str()).chain(self.return_flight_id.as_deref())
    }

    /// Flips the ticket to cancelled. Returns `false` when it already was.
    pub fn cancel(&mut self) -> bool {
        if self.canceled {
            return false;
        }
        self.canceled = true;
        true
    }
}

pub fn count_seat_labels(seats_booked: &str) -> u32 {
    seats_booked
        .split(',')
        .filter(|label| !label.trim().is_empty())
        .count() as u32
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passenger {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub name: String,
    pub gender: String,
    pub age: i32,
    pub seat_number: String,
    pub meal_preference: Option<String>,
}

/// Passenger as supplied by the caller, before a seat is assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassengerRequest {
    pub name: String,
    pub gender: String,
    pub age: i32,
    #[serde(default)]
    pub seat_number: Option<String>,
    #[serde(default)]
    pub meal_preference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub user_email: String,
    pub departure_flight_id: String,
    #[serde(default)]
    pub return_flight_id: Option<String>,
    pub trip_type: TripType,
    pub passengers: Vec<PassengerRequest>,
}

impl BookingRequest {
    pub fn seat_count(&self) -> u32 {
        self.passengers.len() as u32
    }
}

/// Result of a cancellation request; both outcomes are successes for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    AlreadyCancelled,
}

impl CancelOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            CancelOutcome::Cancelled => CANCELLED_SUCCESSFULLY,
            CancelOutcome::AlreadyCancelled => ALREADY_CANCELLED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(seats: &str, return_flight: Option<&str>) -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            pnr: "PNR123".to_string(),
            user_email: "user@example.com".to_string(),
            departure_flight_id: "FL1".to_string(),
            return_flight_id: return_flight.map(str::to_string),
            trip_type: if return_flight.is_some() { TripType::RoundTrip } else { TripType::OneWay },
            booking_time: Utc::now(),
            seats_booked: seats.to_string(),
            total_price: 100,
            canceled: false,
        }
    }

    #[test]
    fn test_trip_type_names() {
        assert_eq!(serde_json::to_string(&TripType::OneWay).unwrap(), "\"ONE_WAY\"");
        assert_eq!(serde_json::to_string(&TripType::RoundTrip).unwrap(), "\"ROUND_TRIP\"");
        assert_eq!(TripType::parse("ROUND_TRIP"), Some(TripType::RoundTrip));
        assert_eq!(TripType::parse("round_trip"), None);
    }

    #[test]
    fn test_seat_count_from_label_string() {
        assert_eq!(ticket("A1,A2", None).seat_count(), 2);
        assert_eq!(ticket("A1", None).seat_count(), 1);
        assert_eq!(ticket("A1,,A3,", None).seat_count(), 2);
        assert_eq!(ticket("", None).seat_count(), 0);
    }

    #[test]
    fn test_flight_ids_and_cancel() {
        let mut round_trip = ticket("1A", Some("FL2"));
        assert_eq!(round_trip.flight_ids().collect::<Vec<_>>(), vec!["FL1", "FL2"]);
        assert_eq!(ticket("1A", None).flight_ids().count(), 1);

        assert!(round_trip.cancel());
        assert!(!round_trip.cancel());
        assert!(round_trip.canceled);
    }
}
