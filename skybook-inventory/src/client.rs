use async_trait::async_trait;
use skybook_core::{Flight, InventoryClient, InventoryError};
use std::sync::Arc;

use crate::service::FlightService;

/// Inventory client for single-process deployments: calls the flight
/// service directly instead of going over HTTP.
pub struct LocalInventoryClient {
    service: Arc<FlightService>,
}

impl LocalInventoryClient {
    pub fn new(service: Arc<FlightService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl InventoryClient for LocalInventoryClient {
    async fn get_flight(&self, flight_id: &str) -> Result<Option<Flight>, InventoryError> {
        self.service.find_flight(flight_id).await
    }

    async fn reserve_seats(&self, flight_id: &str, seats: u32) -> Result<(), InventoryError> {
        self.service.reserve_seats(flight_id, seats).await.map(|_| ())
    }

    async fn release_seats(&self, flight_id: &str, seats: u32) -> Result<(), InventoryError> {
        self.service.release_seats(flight_id, seats).await.map(|_| ())
    }
}
