use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use skybook_core::validation::validate_booking_request;
use skybook_core::{BookingRequest, Passenger, PassengerRequest, Ticket, TripType};

use crate::middleware::{customer_auth_middleware, CustomerClaims};
use crate::{error::AppError, state::AppState};

/// Booking payload; the departure flight comes from the path.
#[derive(Debug, Deserialize)]
pub struct BookTicketBody {
    pub user_email: String,
    #[serde(default)]
    pub return_flight_id: Option<String>,
    pub trip_type: TripType,
    pub passengers: Vec<PassengerRequest>,
}

#[derive(Debug, Serialize)]
struct Booked {
    pnr: String,
}

#[derive(Debug, Serialize)]
struct TicketView {
    #[serde(flatten)]
    ticket: Ticket,
    passengers: Vec<Passenger>,
}

#[derive(Debug, Serialize)]
struct Message {
    message: &'static str,
}

pub fn routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/api/flight/booking/{departure_flight_id}", post(book_ticket))
        .route("/api/flight/ticket/{pnr}", get(get_ticket))
        .route("/api/flight/booking/history/{email}", get(history))
        .route("/api/flight/booking/cancel/{pnr}", delete(cancel));

    if state.auth.enforce_on_bookings {
        router.route_layer(middleware::from_fn_with_state(state.clone(), customer_auth_middleware))
    } else {
        router
    }
}

/// With authentication on, customers may only act on their own e-mail.
fn check_owner(claims: Option<&CustomerClaims>, email: &str) -> Result<(), AppError> {
    match claims {
        Some(claims) if !claims.email.eq_ignore_ascii_case(email) => Err(AppError::AuthorizationError(
            "Token does not belong to this user".to_string(),
        )),
        _ => Ok(()),
    }
}

async fn book_ticket(
    State(state): State<AppState>,
    Path(departure_flight_id): Path<String>,
    claims: Option<Extension<CustomerClaims>>,
    Json(body): Json<BookTicketBody>,
) -> Result<(StatusCode, Json<Booked>), AppError> {
    let request = BookingRequest {
        user_email: body.user_email,
        departure_flight_id,
        return_flight_id: body.return_flight_id,
        trip_type: body.trip_type,
        passengers: body.passengers,
    };

    validate_booking_request(&request)?;
    check_owner(claims.as_deref(), &request.user_email)?;

    let pnr = state.bookings.book_ticket(request).await?;
    Ok((StatusCode::CREATED, Json(Booked { pnr })))
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
    claims: Option<Extension<CustomerClaims>>,
) -> Result<Json<TicketView>, AppError> {
    let ticket = state.bookings.get_by_pnr(&pnr).await?;
    check_owner(claims.as_deref(), &ticket.user_email)?;

    let passengers = state.bookings.passengers_for(&ticket).await?;
    Ok(Json(TicketView { ticket, passengers }))
}

async fn history(
    State(state): State<AppState>,
    Path(email): Path<String>,
    claims: Option<Extension<CustomerClaims>>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    check_owner(claims.as_deref(), &email)?;
    Ok(Json(state.bookings.history_by_email(&email).await?))
}

async fn cancel(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
    claims: Option<Extension<CustomerClaims>>,
) -> Result<Json<Message>, AppError> {
    if claims.is_some() {
        let ticket = state.bookings.get_by_pnr(&pnr).await?;
        check_owner(claims.as_deref(), &ticket.user_email)?;
    }

    let outcome = state.bookings.cancel_by_pnr(&pnr).await?;
    Ok(Json(Message {
        message: outcome.message(),
    }))
}
