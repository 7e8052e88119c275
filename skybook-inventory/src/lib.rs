pub mod client;
pub mod service;
pub mod store;

pub use client::LocalInventoryClient;
pub use service::FlightService;
pub use store::InMemoryFlightRepository;
