use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest seat price accepted when a flight is added, in minor units.
pub const MAX_SEAT_PRICE: i64 = 100_000_000_000;

/// Seat counts are stored in 32-bit integer columns.
pub const MAX_TOTAL_SEATS: u32 = i32::MAX as u32;

/// A scheduled flight and its seat inventory.
///
/// `available_seats` is the only mutable part of the record and only moves
/// through [`Flight::reserve`] / [`Flight::release`], which keep
/// `0 <= available_seats <= total_seats`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub total_seats: u32,
    pub available_seats: u32,
    /// Price of one seat, in minor currency units.
    pub price: i64,
}

impl Flight {
    pub fn has_capacity(&self, seats: u32) -> bool {
        self.available_seats >= seats
    }

    /// Price of `seats` seats, or `None` if it does not fit in an `i64`.
    pub fn fare_for(&self, seats: u32) -> Option<i64> {
        self.price.checked_mul(i64::from(seats))
    }

    /// Take `seats` out of the available pool.
    pub fn reserve(&mut self, seats: u32) -> Result<(), InventoryError> {
        if !self.has_capacity(seats) {
            return Err(InventoryError::InsufficientSeats {
                flight_id: self.id.clone(),
                requested: seats,
                available: self.available_seats,
            });
        }
        self.available_seats -= seats;
        Ok(())
    }

    /// Put `seats` back. Capacity never exceeds `total_seats`; the number of
    /// seats that did not fit is returned so callers can log the anomaly.
    pub fn release(&mut self, seats: u32) -> u32 {
        let room = self.total_seats.saturating_sub(self.available_seats);
        let accepted = seats.min(room);
        self.available_seats += accepted;
        seats - accepted
    }

    /// Two flights with the same airline, route and departure are the same
    /// scheduled service.
    pub fn same_schedule(&self, other: &Flight) -> bool {
        self.airline == other.airline
            && self.origin == other.origin
            && self.destination == other.destination
            && self.departure_time == other.departure_time
    }
}

/// Payload for adding a flight to the inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFlight {
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub total_seats: u32,
    pub price: i64,
}

impl NewFlight {
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.airline.trim().is_empty() {
            return Err(InventoryError::InvalidFlight("airline must not be blank".into()));
        }
        if self.origin.trim().is_empty() || self.destination.trim().is_empty() {
            return Err(InventoryError::InvalidFlight("origin and destination are required".into()));
        }
        if self.origin == self.destination {
            return Err(InventoryError::InvalidFlight("origin and destination must differ".into()));
        }
        if self.arrival_time <= self.departure_time {
            return Err(InventoryError::InvalidFlight("arrival must be after departure".into()));
        }
        if self.total_seats == 0 {
            return Err(InventoryError::InvalidFlight("total seats must be at least 1".into()));
        }
        if self.total_seats > MAX_TOTAL_SEATS {
            return Err(InventoryError::InvalidFlight(format!(
                "total seats must be at most {MAX_TOTAL_SEATS}"
            )));
        }
        if self.price < 0 {
            return Err(InventoryError::InvalidFlight("price must not be negative".into()));
        }
        if self.price > MAX_SEAT_PRICE {
            return Err(InventoryError::InvalidFlight(format!(
                "price must be at most {MAX_SEAT_PRICE}"
            )));
        }
        Ok(())
    }

    /// New flights open with every seat available.
    pub fn into_flight(self, id: String) -> Flight {
        Flight {
            id,
            airline: self.airline,
            origin: self.origin,
            destination: self.destination,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            total_seats: self.total_seats,
            available_seats: self.total_seats,
            price: self.price,
        }
    }
}

/// Route search over a departure window (inclusive on both ends).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSearch {
    pub origin: String,
    pub destination: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl FlightSearch {
    pub fn matches(&self, flight: &Flight) -> bool {
        flight.origin == self.origin
            && flight.destination == self.destination
            && flight.departure_time >= self.from
            && flight.departure_time <= self.to
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirlineSearch {
    pub origin: String,
    pub destination: String,
    pub airline: String,
}

impl AirlineSearch {
    pub fn matches(&self, flight: &Flight) -> bool {
        flight.origin == self.origin
            && flight.destination == self.destination
            && flight.airline == self.airline
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("Flight not found: {0}")]
    NotFound(String),

    #[error("Not enough seats")]
    InsufficientSeats {
        flight_id: String,
        requested: u32,
        available: u32,
    },

    #[error("Flight already exists")]
    Duplicate,

    #[error("Invalid flight: {0}")]
    InvalidFlight(String),

    #[error("Seat count must be at least 1")]
    InvalidSeatCount,

    #[error("Inventory service unavailable: {0}")]
    Unavailable(String),

    #[error("Inventory storage failure: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn new_flight() -> NewFlight {
        let departure = Utc.with_ymd_and_hms(2025, 3, 1, 6, 30, 0).unwrap();
        NewFlight {
            airline: "Indigo".to_string(),
            origin: "BLR".to_string(),
            destination: "DEL".to_string(),
            departure_time: departure,
            arrival_time: departure + Duration::hours(2),
            total_seats: 3,
            price: 3_000,
        }
    }

    #[test]
    fn test_reserve_and_release_stay_in_bounds() {
        let mut flight = new_flight().into_flight("F1".to_string());
        assert_eq!(flight.available_seats, 3);

        flight.reserve(2).unwrap();
        assert_eq!(flight.available_seats, 1);

        let err = flight.reserve(2).unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientSeats {
                flight_id: "F1".to_string(),
                requested: 2,
                available: 1,
            }
        );
        assert_eq!(err.to_string(), "Not enough seats");
        assert_eq!(flight.available_seats, 1);

        // Releasing more than was taken is capped at capacity.
        assert_eq!(flight.release(5), 3);
        assert_eq!(flight.available_seats, 3);
    }

    #[test]
    fn test_new_flight_validation() {
        assert!(new_flight().validate().is_ok());

        let mut same_city = new_flight();
        same_city.destination = "BLR".to_string();
        assert!(matches!(same_city.validate(), Err(InventoryError::InvalidFlight(_))));

        let mut backwards = new_flight();
        backwards.arrival_time = backwards.departure_time - Duration::minutes(5);
        assert!(backwards.validate().is_err());

        let mut empty = new_flight();
        empty.total_seats = 0;
        assert!(empty.validate().is_err());

        let mut huge = new_flight();
        huge.total_seats = MAX_TOTAL_SEATS + 1;
        assert!(matches!(huge.validate(), Err(InventoryError::InvalidFlight(_))));

        let mut pricey = new_flight();
        pricey.price = MAX_SEAT_PRICE + 1;
        assert!(matches!(pricey.validate(), Err(InventoryError::InvalidFlight(_))));
        pricey.price = MAX_SEAT_PRICE;
        assert!(pricey.validate().is_ok());
    }

    #[test]
    fn test_fare_overflow_is_detected() {
        let mut flight = new_flight().into_flight("F1".to_string());
        assert_eq!(flight.fare_for(2), Some(6_000));

        flight.price = i64::MAX / 2 + 1;
        assert_eq!(flight.fare_for(1), Some(i64::MAX / 2 + 1));
        assert_eq!(flight.fare_for(2), None);
    }

    #[test]
    fn test_search_window_is_inclusive() {
        let flight = new_flight().into_flight("F1".to_string());
        let search = FlightSearch {
            origin: "BLR".to_string(),
            destination: "DEL".to_string(),
            from: flight.departure_time,
            to: flight.departure_time,
        };
        assert!(search.matches(&flight));

        let reversed = FlightSearch {
            origin: "DEL".to_string(),
            destination: "BLR".to_string(),
            ..search
        };
        assert!(!reversed.matches(&flight));
    }
}
