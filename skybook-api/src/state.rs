use anyhow::Context;
use skybook_booking::{BookingOrchestrator, BookingSettings, InMemoryTicketRepository};
use skybook_core::events::{EventPublisher, LogEventPublisher};
use skybook_core::{FlightRepository, InventoryClient, TicketRepository, UserRepository};
use skybook_inventory::{FlightService, InMemoryFlightRepository, LocalInventoryClient};
use skybook_store::{
    Config, DbClient, HttpInventoryClient, PostgresFlightRepository, PostgresTicketRepository,
    PostgresUserRepository, RedisClient, StorageBackend,
};
use std::sync::Arc;
use tracing::info;

use crate::users::InMemoryUserRepository;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub enforce_on_bookings: bool,
}

#[derive(Clone)]
pub struct RateLimitSettings {
    pub requests_per_window: i64,
    pub window_seconds: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<FlightService>,
    pub bookings: Arc<BookingOrchestrator>,
    pub users: Arc<dyn UserRepository>,
    pub redis: Option<Arc<RedisClient>>,
    pub rate_limit: RateLimitSettings,
    pub auth: AuthConfig,
}

impl AppState {
    /// Everything in process memory, no external services.
    pub fn in_memory(auth: AuthConfig, booking: BookingSettings) -> Self {
        let flights = Arc::new(FlightService::new(Arc::new(InMemoryFlightRepository::new())));
        let inventory: Arc<dyn InventoryClient> = Arc::new(LocalInventoryClient::new(flights.clone()));
        let bookings = BookingOrchestrator::new(
            inventory,
            Arc::new(InMemoryTicketRepository::new()),
            Arc::new(LogEventPublisher),
            booking,
        );

        Self {
            flights,
            bookings: Arc::new(bookings),
            users: Arc::new(InMemoryUserRepository::new()),
            redis: None,
            rate_limit: RateLimitSettings {
                requests_per_window: 100,
                window_seconds: 60,
            },
            auth,
        }
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (flight_repo, tickets, users) = match config.storage.backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                memory_repositories()
            }
            StorageBackend::Postgres => postgres_repositories(config).await?,
        };

        let flights = Arc::new(FlightService::new(flight_repo));

        let inventory: Arc<dyn InventoryClient> = match config.inventory.base_url.as_deref() {
            Some(base_url) => {
                info!("Using remote flight inventory at {}", base_url);
                Arc::new(
                    HttpInventoryClient::new(base_url, config.booking.inventory_timeout())
                        .context("Failed to build inventory HTTP client")?,
                )
            }
            None => Arc::new(LocalInventoryClient::new(flights.clone())),
        };

        let bookings = BookingOrchestrator::new(
            inventory,
            tickets,
            event_publisher(config)?,
            BookingSettings {
                inventory_timeout: config.booking.inventory_timeout(),
                ..Default::default()
            },
        );

        let redis = match config.redis.url.as_deref() {
            Some(url) => {
                let client = RedisClient::new(url).await.context("Failed to create Redis client")?;
                info!("Rate limiting enabled via Redis");
                Some(Arc::new(client))
            }
            None => None,
        };

        Ok(Self {
            flights,
            bookings: Arc::new(bookings),
            users,
            redis,
            rate_limit: RateLimitSettings {
                requests_per_window: config.rate_limit.requests_per_window,
                window_seconds: config.rate_limit.window_seconds,
            },
            auth: AuthConfig {
                secret: config.auth.jwt_secret.clone(),
                expiration: config.auth.jwt_expiration_seconds,
                enforce_on_bookings: config.auth.enforce_on_bookings,
            },
        })
    }
}

type Repositories = (
    Arc<dyn FlightRepository>,
    Arc<dyn TicketRepository>,
    Arc<dyn UserRepository>,
);

fn memory_repositories() -> Repositories {
    (
        Arc::new(InMemoryFlightRepository::new()),
        Arc::new(InMemoryTicketRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
    )
}

async fn postgres_repositories(config: &Config) -> anyhow::Result<Repositories> {
    let url = config
        .database
        .url
        .as_deref()
        .context("database.url is required for postgres storage")?;
    let db = DbClient::new(url).await.context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;
    info!("Using Postgres storage");

    let repositories: Repositories = (
        Arc::new(PostgresFlightRepository::new(db.pool.clone())),
        Arc::new(PostgresTicketRepository::new(db.pool.clone())),
        Arc::new(PostgresUserRepository::new(db.pool)),
    );
    Ok(repositories)
}

#[cfg(feature = "kafka")]
fn event_publisher(config: &Config) -> anyhow::Result<Arc<dyn EventPublisher>> {
    match config.kafka.brokers.as_deref() {
        Some(brokers) => {
            let producer = skybook_store::KafkaEventPublisher::new(brokers)
                .context("Failed to create Kafka producer")?;
            info!("Publishing booking events to Kafka at {}", brokers);
            Ok(Arc::new(producer))
        }
        None => Ok(Arc::new(LogEventPublisher)),
    }
}

#[cfg(not(feature = "kafka"))]
fn event_publisher(config: &Config) -> anyhow::Result<Arc<dyn EventPublisher>> {
    if config.kafka.brokers.is_some() {
        tracing::warn!("kafka.brokers is set but this build has no Kafka support; events go to the log");
    }
    Ok(Arc::new(LogEventPublisher))
}
