//! Pre-condition checks run on inbound requests before the orchestrator sees
//! them. Every violation is collected so the caller gets the full list in one
//! round trip.

use serde::Serialize;
use std::collections::HashSet;

use crate::ticket::{BookingRequest, TripType};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_email(errors: &mut ValidationErrors, field: &str, email: &str) {
    if blank(email) {
        errors.add(field, "must not be blank");
    } else if !email.contains('@') {
        errors.add(field, "must be a valid email address");
    }
}

pub fn validate_booking_request(req: &BookingRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    validate_email(&mut errors, "user_email", &req.user_email);

    if blank(&req.departure_flight_id) {
        errors.add("departure_flight_id", "must not be blank");
    }

    match (req.trip_type, req.return_flight_id.as_deref()) {
        (TripType::RoundTrip, None) => {
            errors.add("return_flight_id", "is required for a ROUND_TRIP booking");
        }
        (TripType::RoundTrip, Some(id)) if blank(id) => {
            errors.add("return_flight_id", "must not be blank");
        }
        (TripType::RoundTrip, Some(id)) if id == req.departure_flight_id => {
            errors.add("return_flight_id", "must differ from the departure flight");
        }
        (TripType::OneWay, Some(_)) => {
            errors.add("return_flight_id", "must be empty for a ONE_WAY booking");
        }
        _ => {}
    }

    if req.passengers.is_empty() {
        errors.add("passengers", "at least one passenger is required");
    }

    let mut seen_seats = HashSet::new();
    for (i, p) in req.passengers.iter().enumerate() {
        if blank(&p.name) {
            errors.add(format!("passengers[{i}].name"), "must not be blank");
        }
        if blank(&p.gender) {
            errors.add(format!("passengers[{i}].gender"), "must not be blank");
        }
        if p.age < 1 {
            errors.add(format!("passengers[{i}].age"), "must be at least 1");
        }
        if let Some(seat) = p.seat_number.as_deref() {
            let seat = seat.trim();
            if seat.is_empty() {
                errors.add(format!("passengers[{i}].seat_number"), "must not be blank");
            } else if seat.contains(',') {
                errors.add(format!("passengers[{i}].seat_number"), "must not contain ','");
            } else if !seen_seats.insert(seat.to_string()) {
                errors.add(format!("passengers[{i}].seat_number"), "is already taken in this booking");
            }
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::PassengerRequest;

    fn passenger(name: &str, age: i32) -> PassengerRequest {
        PassengerRequest {
            name: name.to_string(),
            gender: "Male".to_string(),
            age,
            seat_number: None,
            meal_preference: None,
        }
    }

    fn request() -> BookingRequest {
        BookingRequest {
            user_email: "user@example.com".to_string(),
            departure_flight_id: "FL1".to_string(),
            return_flight_id: None,
            trip_type: TripType::OneWay,
            passengers: vec![passenger("John Doe", 30)],
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_booking_request(&request()).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut req = request();
        req.user_email = "   ".to_string();
        req.passengers = vec![passenger("", 0), passenger("Jane", 25)];
        req.passengers[1].gender = String::new();

        let errors = validate_booking_request(&req).unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "user_email",
                "passengers[0].name",
                "passengers[0].age",
                "passengers[1].gender",
            ]
        );
    }

    #[test]
    fn test_empty_passenger_list_rejected() {
        let mut req = request();
        req.passengers.clear();
        let errors = validate_booking_request(&req).unwrap_err();
        assert_eq!(errors.errors()[0].field, "passengers");
    }

    #[test]
    fn test_trip_type_and_return_flight_must_agree() {
        let mut req = request();
        req.trip_type = TripType::RoundTrip;
        assert!(validate_booking_request(&req).is_err());

        req.return_flight_id = Some("FL2".to_string());
        assert!(validate_booking_request(&req).is_ok());

        req.trip_type = TripType::OneWay;
        assert!(validate_booking_request(&req).is_err());
    }

    #[test]
    fn test_seat_labels_must_be_unique_and_comma_free() {
        let mut req = request();
        req.passengers = vec![passenger("A", 30), passenger("B", 31), passenger("C", 32)];
        req.passengers[0].seat_number = Some("1A".to_string());
        req.passengers[1].seat_number = Some("1A".to_string());
        req.passengers[2].seat_number = Some("1B,1C".to_string());

        let errors = validate_booking_request(&req).unwrap_err();
        assert_eq!(errors.errors().len(), 2);
        assert_eq!(errors.errors()[0].field, "passengers[1].seat_number");
        assert_eq!(errors.errors()[1].message, "must not contain ','");
    }
}
