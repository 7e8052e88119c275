use async_trait::async_trait;
use uuid::Uuid;

use crate::flight::{AirlineSearch, Flight, FlightSearch, InventoryError};
use crate::ticket::{Passenger, Ticket};
use crate::user::User;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Repository trait for flight inventory records.
///
/// `reserve_seats` and `release_seats` are single read-modify-write steps on
/// one record. Implementations must serialize them per flight so that two
/// concurrent reservations never both succeed against the same remaining
/// capacity, without blocking work on other flights.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn insert_flight(&self, flight: Flight) -> Result<Flight, InventoryError>;

    async fn find_flight(&self, id: &str) -> Result<Option<Flight>, InventoryError>;

    async fn list_flights(&self) -> Result<Vec<Flight>, InventoryError>;

    async fn search_flights(&self, search: &FlightSearch) -> Result<Vec<Flight>, InventoryError>;

    async fn search_by_airline(&self, search: &AirlineSearch) -> Result<Vec<Flight>, InventoryError>;

    async fn reserve_seats(&self, id: &str, seats: u32) -> Result<Flight, InventoryError>;

    async fn release_seats(&self, id: &str, seats: u32) -> Result<Flight, InventoryError>;
}

/// Repository trait for tickets and their passengers
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Insert a new ticket. Fails with `StoreError::Conflict` if the PNR is taken.
    async fn create_ticket(&self, ticket: &Ticket) -> Result<Ticket, StoreError>;

    async fn update_ticket(&self, ticket: &Ticket) -> Result<Ticket, StoreError>;

    /// Flip `canceled` from false to true in one step. Returns `false` when the
    /// ticket was already cancelled, so only one caller wins a cancel race.
    async fn mark_cancelled(&self, pnr: &str) -> Result<bool, StoreError>;

    async fn find_by_pnr(&self, pnr: &str) -> Result<Option<Ticket>, StoreError>;

    async fn find_by_user(&self, email: &str) -> Result<Vec<Ticket>, StoreError>;

    async fn save_passengers(&self, passengers: &[Passenger]) -> Result<Vec<Passenger>, StoreError>;

    async fn find_passengers(&self, ticket_id: Uuid) -> Result<Vec<Passenger>, StoreError>;
}

/// Repository trait for registered users
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
