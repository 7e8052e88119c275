use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skybook_core::{AirlineSearch, Flight, FlightRepository, FlightSearch, InventoryError};
use sqlx::PgPool;

use crate::is_unique_violation;

pub struct PostgresFlightRepository {
    pool: PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: String,
    airline: String,
    origin: String,
    destination: String,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    total_seats: i32,
    available_seats: i32,
    price: i64,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            airline: row.airline,
            origin: row.origin,
            destination: row.destination,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            total_seats: row.total_seats.max(0) as u32,
            available_seats: row.available_seats.max(0) as u32,
            price: row.price,
        }
    }
}

const FLIGHT_COLUMNS: &str =
    "id, airline, origin, destination, departure_time, arrival_time, total_seats, available_seats, price";

fn storage(err: sqlx::Error) -> InventoryError {
    InventoryError::Storage(err.to_string())
}

/// Seat counts are INTEGER columns; anything beyond that can never be satisfied.
fn seats_param(seats: u32) -> i32 {
    i32::try_from(seats).unwrap_or(i32::MAX)
}

#[async_trait]
impl FlightRepository for PostgresFlightRepository {
    async fn insert_flight(&self, flight: Flight) -> Result<Flight, InventoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO flights (id, airline, origin, destination, departure_time, arrival_time, total_seats, available_seats, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&flight.id)
        .bind(&flight.airline)
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .bind(seats_param(flight.total_seats))
        .bind(seats_param(flight.available_seats))
        .bind(flight.price)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(flight),
            Err(e) if is_unique_violation(&e) => Err(InventoryError::Duplicate),
            Err(e) => Err(storage(e)),
        }
    }

    async fn find_flight(&self, id: &str) -> Result<Option<Flight>, InventoryError> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        Ok(row.map(Flight::from))
    }

    async fn list_flights(&self) -> Result<Vec<Flight>, InventoryError> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights ORDER BY departure_time, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn search_flights(&self, search: &FlightSearch) -> Result<Vec<Flight>, InventoryError> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            r#"
            SELECT {FLIGHT_COLUMNS} FROM flights
            WHERE origin = $1 AND destination = $2
              AND departure_time >= $3 AND departure_time <= $4
            ORDER BY departure_time, id
            "#
        ))
        .bind(&search.origin)
        .bind(&search.destination)
        .bind(search.from)
        .bind(search.to)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn search_by_airline(&self, search: &AirlineSearch) -> Result<Vec<Flight>, InventoryError> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            r#"
            SELECT {FLIGHT_COLUMNS} FROM flights
            WHERE origin = $1 AND destination = $2 AND airline = $3
            ORDER BY departure_time, id
            "#
        ))
        .bind(&search.origin)
        .bind(&search.destination)
        .bind(&search.airline)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn reserve_seats(&self, id: &str, seats: u32) -> Result<Flight, InventoryError> {
        // Single conditional UPDATE: the row lock serializes concurrent
        // reservations and the predicate keeps the counter non-negative.
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            r#"
            UPDATE flights SET available_seats = available_seats - $2
            WHERE id = $1 AND available_seats >= $2
            RETURNING {FLIGHT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(seats_param(seats))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        match self.find_flight(id).await? {
            Some(current) => Err(InventoryError::InsufficientSeats {
                flight_id: id.to_string(),
                requested: seats,
                available: current.available_seats,
            }),
            None => Err(InventoryError::NotFound(id.to_string())),
        }
    }

    /// Never raises availability above `total_seats`.
    async fn release_seats(&self, id: &str, seats: u32) -> Result<Flight, InventoryError> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            r#"
            UPDATE flights SET available_seats = LEAST(total_seats, available_seats + $2)
            WHERE id = $1
            RETURNING {FLIGHT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(seats_param(seats))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or_else(|| InventoryError::NotFound(id.to_string()))?;

        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_row_conversion_clamps_negative_counters() {
        let departure = Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap();
        let row = FlightRow {
            id: "F1".to_string(),
            airline: "Indigo".to_string(),
            origin: "BLR".to_string(),
            destination: "DEL".to_string(),
            departure_time: departure,
            arrival_time: departure,
            total_seats: 10,
            available_seats: -1,
            price: 4_500,
        };
        let flight = Flight::from(row);
        assert_eq!(flight.available_seats, 0);
        assert_eq!(flight.total_seats, 10);
    }

    #[test]
    fn test_oversized_seat_request_saturates() {
        assert_eq!(seats_param(3), 3);
        assert_eq!(seats_param(u32::MAX), i32::MAX);
    }
}
