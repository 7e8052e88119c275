use skybook_core::{AirlineSearch, Flight, FlightRepository, FlightSearch, InventoryError, NewFlight};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Flight inventory operations: the business rules around the repository.
pub struct FlightService {
    repo: Arc<dyn FlightRepository>,
}

impl FlightService {
    pub fn new(repo: Arc<dyn FlightRepository>) -> Self {
        Self { repo }
    }

    /// Add a flight to the inventory. All seats start out available.
    pub async fn add_flight(&self, new_flight: NewFlight) -> Result<Flight, InventoryError> {
        new_flight.validate()?;

        let flight = new_flight.into_flight(Uuid::new_v4().to_string());
        let flight = self.repo.insert_flight(flight).await.inspect_err(|e| {
            if *e == InventoryError::Duplicate {
                warn!("Rejected duplicate flight schedule");
            }
        })?;

        info!(
            "Flight added: {} {} {}->{} ({} seats)",
            flight.id, flight.airline, flight.origin, flight.destination, flight.total_seats
        );
        Ok(flight)
    }

    pub async fn get_flight(&self, id: &str) -> Result<Flight, InventoryError> {
        self.repo
            .find_flight(id)
            .await?
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))
    }

    pub async fn find_flight(&self, id: &str) -> Result<Option<Flight>, InventoryError> {
        self.repo.find_flight(id).await
    }

    pub async fn list_flights(&self) -> Result<Vec<Flight>, InventoryError> {
        self.repo.list_flights().await
    }

    pub async fn search_flights(&self, search: &FlightSearch) -> Result<Vec<Flight>, InventoryError> {
        if search.to < search.from {
            return Ok(Vec::new());
        }
        self.repo.search_flights(search).await
    }

    pub async fn search_by_airline(&self, search: &AirlineSearch) -> Result<Vec<Flight>, InventoryError> {
        self.repo.search_by_airline(search).await
    }

    pub async fn reserve_seats(&self, id: &str, seats: u32) -> Result<Flight, InventoryError> {
        if seats == 0 {
            return Err(InventoryError::InvalidSeatCount);
        }
        let flight = self.repo.reserve_seats(id, seats).await?;
        info!("Reserved {} seats on {}: {} left", seats, id, flight.available_seats);
        Ok(flight)
    }

    pub async fn release_seats(&self, id: &str, seats: u32) -> Result<Flight, InventoryError> {
        if seats == 0 {
            return Err(InventoryError::InvalidSeatCount);
        }
        let flight = self.repo.release_seats(id, seats).await?;
        info!("Released {} seats on {}: {} available", seats, id, flight.available_seats);
        Ok(flight)
    }
}
