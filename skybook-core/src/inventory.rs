use async_trait::async_trait;

use crate::flight::{Flight, InventoryError};

/// The booking side's view of the flight inventory service.
///
/// May be backed by an in-process service or a remote one; either way every
/// call can suspend, and the orchestrator bounds each call with a timeout.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Read-only snapshot of a flight, `None` when it does not exist.
    async fn get_flight(&self, flight_id: &str) -> Result<Option<Flight>, InventoryError>;

    async fn reserve_seats(&self, flight_id: &str, seats: u32) -> Result<(), InventoryError>;

    async fn release_seats(&self, flight_id: &str, seats: u32) -> Result<(), InventoryError>;
}
