pub mod memory;
pub mod orchestrator;
pub mod pnr;
pub mod saga;
pub mod seats;

pub use memory::InMemoryTicketRepository;
pub use orchestrator::{BookingOrchestrator, BookingSettings};
