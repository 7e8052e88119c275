pub mod app_config;
pub mod database;
pub mod events;
pub mod flight_repo;
pub mod inventory_client;
pub mod redis_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use app_config::{Config, StorageBackend};
pub use database::DbClient;
pub use flight_repo::PostgresFlightRepository;
pub use inventory_client::HttpInventoryClient;
pub use redis_repo::RedisClient;
pub use ticket_repo::PostgresTicketRepository;
pub use user_repo::PostgresUserRepository;

#[cfg(feature = "kafka")]
pub use events::KafkaEventPublisher;

/// Postgres reports duplicate keys with SQLSTATE 23505.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
