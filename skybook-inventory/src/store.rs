use async_trait::async_trait;
use skybook_core::{AirlineSearch, Flight, FlightRepository, FlightSearch, InventoryError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

/// In-memory flight inventory.
///
/// Each flight sits behind its own mutex, so seat counter updates on one
/// flight are linearizable while updates on different flights proceed in
/// parallel. The outer map lock is only held long enough to find the slot.
pub struct InMemoryFlightRepository {
    flights: RwLock<HashMap<String, Arc<Mutex<Flight>>>>,
}

impl InMemoryFlightRepository {
    pub fn new() -> Self {
        Self {
            flights: RwLock::new(HashMap::new()),
        }
    }

    async fn slot(&self, id: &str) -> Result<Arc<Mutex<Flight>>, InventoryError> {
        self.flights
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))
    }

    async fn snapshot(&self) -> Vec<Flight> {
        let slots: Vec<Arc<Mutex<Flight>>> = self.flights.read().await.values().cloned().collect();

        let mut flights = Vec::with_capacity(slots.len());
        for slot in slots {
            flights.push(slot.lock().await.clone());
        }
        flights.sort_by(|a, b| a.departure_time.cmp(&b.departure_time).then_with(|| a.id.cmp(&b.id)));
        flights
    }
}

impl Default for InMemoryFlightRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlightRepository for InMemoryFlightRepository {
    async fn insert_flight(&self, flight: Flight) -> Result<Flight, InventoryError> {
        let mut flights = self.flights.write().await;

        if flights.contains_key(&flight.id) {
            return Err(InventoryError::Duplicate);
        }
        for slot in flights.values() {
            if slot.lock().await.same_schedule(&flight) {
                return Err(InventoryError::Duplicate);
            }
        }

        flights.insert(flight.id.clone(), Arc::new(Mutex::new(flight.clone())));
        Ok(flight)
    }

    async fn find_flight(&self, id: &str) -> Result<Option<Flight>, InventoryError> {
        match self.slot(id).await {
            Ok(slot) => Ok(Some(slot.lock().await.clone())),
            Err(InventoryError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_flights(&self) -> Result<Vec<Flight>, InventoryError> {
        Ok(self.snapshot().await)
    }

    async fn search_flights(&self, search: &FlightSearch) -> Result<Vec<Flight>, InventoryError> {
        Ok(self
            .snapshot()
            .await
            .into_iter()
            .filter(|f| search.matches(f))
            .collect())
    }

    async fn search_by_airline(&self, search: &AirlineSearch) -> Result<Vec<Flight>, InventoryError> {
        Ok(self
            .snapshot()
            .await
            .into_iter()
            .filter(|f| search.matches(f))
            .collect())
    }

    async fn reserve_seats(&self, id: &str, seats: u32) -> Result<Flight, InventoryError> {
        let slot = self.slot(id).await?;
        let mut flight = slot.lock().await;
        flight.reserve(seats)?;
        Ok(flight.clone())
    }

    async fn release_seats(&self, id: &str, seats: u32) -> Result<Flight, InventoryError> {
        let slot = self.slot(id).await?;
        let mut flight = slot.lock().await;
        let overflow = flight.release(seats);
        if overflow > 0 {
            warn!(
                flight_id = id,
                requested = seats,
                dropped = overflow,
                "Release would exceed capacity, clamped to total seats"
            );
        }
        Ok(flight.clone())
    }
}
