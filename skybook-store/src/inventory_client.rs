use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use skybook_core::{Flight, InventoryClient, InventoryError};
use std::time::Duration;
use tracing::debug;

/// Talks to a remote flight service over its internal HTTP routes.
pub struct HttpInventoryClient {
    client: Client,
    base_url: String,
}

impl HttpInventoryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn adjust_seats(&self, action: &str, flight_id: &str, seats: u32) -> Result<(), InventoryError> {
        let url = format!("{}/api/flight/internal/{}/{}/{}", self.base_url, flight_id, action, seats);
        debug!("PUT {}", url);

        let response = self.client.put(&url).send().await.map_err(transport)?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(status_error(response, flight_id, seats))
    }
}

fn transport(err: reqwest::Error) -> InventoryError {
    InventoryError::Unavailable(err.to_string())
}

fn status_error(response: Response, flight_id: &str, seats: u32) -> InventoryError {
    match response.status() {
        StatusCode::NOT_FOUND => InventoryError::NotFound(flight_id.to_string()),
        // The remote count is not part of the response
        StatusCode::CONFLICT => InventoryError::InsufficientSeats {
            flight_id: flight_id.to_string(),
            requested: seats,
            available: 0,
        },
        StatusCode::BAD_REQUEST => InventoryError::InvalidSeatCount,
        status if status.is_server_error() => {
            InventoryError::Unavailable(format!("inventory service returned {}", status))
        }
        status => InventoryError::Storage(format!("unexpected inventory response {}", status)),
    }
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    async fn get_flight(&self, flight_id: &str) -> Result<Option<Flight>, InventoryError> {
        let url = format!("{}/api/flight/{}", self.base_url, flight_id);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(transport)?;
        match response.status() {
            StatusCode::OK => response.json::<Flight>().await.map(Some).map_err(transport),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(status_error(response, flight_id, 0)),
        }
    }

    async fn reserve_seats(&self, flight_id: &str, seats: u32) -> Result<(), InventoryError> {
        self.adjust_seats("reserve", flight_id, seats).await
    }

    async fn release_seats(&self, flight_id: &str, seats: u32) -> Result<(), InventoryError> {
        self.adjust_seats("release", flight_id, seats).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use chrono::{TimeZone, Utc};

    fn flight() -> Flight {
        let departure = Utc.with_ymd_and_hms(2025, 9, 1, 7, 0, 0).unwrap();
        Flight {
            id: "FL1".to_string(),
            airline: "Indigo".to_string(),
            origin: "BLR".to_string(),
            destination: "DEL".to_string(),
            departure_time: departure,
            arrival_time: departure + chrono::Duration::hours(3),
            total_seats: 10,
            available_seats: 4,
            price: 5_000,
        }
    }

    async fn get_flight(Path(id): Path<String>) -> Result<Json<Flight>, AxumStatus> {
        match id.as_str() {
            "FL1" => Ok(Json(flight())),
            "BROKEN" => Err(AxumStatus::INTERNAL_SERVER_ERROR),
            _ => Err(AxumStatus::NOT_FOUND),
        }
    }

    async fn reserve(Path((id, count)): Path<(String, u32)>) -> AxumStatus {
        match (id.as_str(), count) {
            ("FL1", n) if n <= 4 => AxumStatus::OK,
            ("FL1", _) => AxumStatus::CONFLICT,
            _ => AxumStatus::NOT_FOUND,
        }
    }

    async fn slow_release() -> AxumStatus {
        tokio::time::sleep(Duration::from_secs(5)).await;
        AxumStatus::OK
    }

    async fn serve() -> String {
        let app = Router::new()
            .route("/api/flight/{id}", get(get_flight))
            .route("/api/flight/internal/{id}/reserve/{count}", put(reserve))
            .route("/api/flight/internal/{id}/release/{count}", put(slow_release));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_get_flight_maps_statuses() {
        let base = serve().await;
        let client = HttpInventoryClient::new(&base, Duration::from_secs(2)).unwrap();

        assert_eq!(client.get_flight("FL1").await.unwrap(), Some(flight()));
        assert_eq!(client.get_flight("FL404").await.unwrap(), None);
        assert!(matches!(
            client.get_flight("BROKEN").await.unwrap_err(),
            InventoryError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_reserve_maps_statuses() {
        let base = serve().await;
        let client = HttpInventoryClient::new(&format!("{base}/"), Duration::from_secs(2)).unwrap();

        client.reserve_seats("FL1", 2).await.unwrap();
        assert!(matches!(
            client.reserve_seats("FL1", 9).await.unwrap_err(),
            InventoryError::InsufficientSeats { requested: 9, .. }
        ));
        assert_eq!(
            client.reserve_seats("FL404", 1).await.unwrap_err(),
            InventoryError::NotFound("FL404".to_string())
        );
    }

    #[tokio::test]
    async fn test_slow_service_is_unavailable() {
        let base = serve().await;
        let client = HttpInventoryClient::new(&base, Duration::from_millis(100)).unwrap();

        assert!(matches!(
            client.release_seats("FL1", 1).await.unwrap_err(),
            InventoryError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let client = HttpInventoryClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            client.get_flight("FL1").await.unwrap_err(),
            InventoryError::Unavailable(_)
        ));
    }
}
