use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skybook_core::{Passenger, StoreError, Ticket, TicketRepository, TripType};
use sqlx::PgPool;
use uuid::Uuid;

use crate::is_unique_violation;

pub struct PostgresTicketRepository {
    pool: PgPool,
}

impl PostgresTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    pnr: String,
    user_email: String,
    departure_flight_id: String,
    return_flight_id: Option<String>,
    trip_type: String,
    booking_time: DateTime<Utc>,
    seats_booked: String,
    total_price: i64,
    canceled: bool,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = StoreError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let trip_type = TripType::parse(&row.trip_type).ok_or_else(|| {
            StoreError::Backend(format!("ticket {} has unknown trip type {}", row.pnr, row.trip_type))
        })?;

        Ok(Ticket {
            id: row.id,
            pnr: row.pnr,
            user_email: row.user_email,
            departure_flight_id: row.departure_flight_id,
            return_flight_id: row.return_flight_id,
            trip_type,
            booking_time: row.booking_time,
            seats_booked: row.seats_booked,
            total_price: row.total_price,
            canceled: row.canceled,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PassengerRow {
    id: Uuid,
    ticket_id: Uuid,
    name: String,
    gender: String,
    age: i32,
    seat_number: String,
    meal_preference: Option<String>,
}

impl From<PassengerRow> for Passenger {
    fn from(row: PassengerRow) -> Self {
        Passenger {
            id: row.id,
            ticket_id: row.ticket_id,
            name: row.name,
            gender: row.gender,
            age: row.age,
            seat_number: row.seat_number,
            meal_preference: row.meal_preference,
        }
    }
}

const TICKET_COLUMNS: &str = "id, pnr, user_email, departure_flight_id, return_flight_id, trip_type, booking_time, seats_booked, total_price, canceled";

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    async fn create_ticket(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO tickets (id, pnr, user_email, departure_flight_id, return_flight_id, trip_type, booking_time, seats_booked, total_price, canceled)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(ticket.id)
        .bind(&ticket.pnr)
        .bind(&ticket.user_email)
        .bind(&ticket.departure_flight_id)
        .bind(&ticket.return_flight_id)
        .bind(ticket.trip_type.as_str())
        .bind(ticket.booking_time)
        .bind(&ticket.seats_booked)
        .bind(ticket.total_price)
        .bind(ticket.canceled)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(ticket.clone()),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::Conflict(format!("PNR {} already exists", ticket.pnr)))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET seats_booked = $2, total_price = $3, canceled = $4
            WHERE pnr = $1
            "#,
        )
        .bind(&ticket.pnr)
        .bind(&ticket.seats_booked)
        .bind(ticket.total_price)
        .bind(ticket.canceled)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Ticket {}", ticket.pnr)));
        }
        Ok(ticket.clone())
    }

    async fn mark_cancelled(&self, pnr: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE tickets SET canceled = TRUE WHERE pnr = $1 AND canceled = FALSE")
            .bind(pnr)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        let exists: Option<(bool,)> = sqlx::query_as("SELECT canceled FROM tickets WHERE pnr = $1")
            .bind(pnr)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        match exists {
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound(format!("Ticket {}", pnr))),
        }
    }

    async fn find_by_pnr(&self, pnr: &str) -> Result<Option<Ticket>, StoreError> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE pnr = $1"
        ))
        .bind(pnr)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(Ticket::try_from).transpose()
    }

    async fn find_by_user(&self, email: &str) -> Result<Vec<Ticket>, StoreError> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE user_email = $1 ORDER BY booking_time DESC, pnr"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(Ticket::try_from).collect()
    }

    async fn save_passengers(&self, passengers: &[Passenger]) -> Result<Vec<Passenger>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        for p in passengers {
            sqlx::query(
                r#"
                INSERT INTO passengers (id, ticket_id, name, gender, age, seat_number, meal_preference)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(p.id)
            .bind(p.ticket_id)
            .bind(&p.name)
            .bind(&p.gender)
            .bind(p.age)
            .bind(&p.seat_number)
            .bind(&p.meal_preference)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;
        Ok(passengers.to_vec())
    }

    async fn find_passengers(&self, ticket_id: Uuid) -> Result<Vec<Passenger>, StoreError> {
        let rows = sqlx::query_as::<_, PassengerRow>(
            r#"
            SELECT id, ticket_id, name, gender, age, seat_number, meal_preference
            FROM passengers WHERE ticket_id = $1
            ORDER BY seat_number
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Passenger::from).collect())
    }
}
