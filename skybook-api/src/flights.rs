use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use skybook_core::{AirlineSearch, Flight, FlightSearch, NewFlight};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
struct FlightAdded {
    flight_id: String,
    message: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/flight/airline/inventory/add", post(add_flight))
        .route("/api/flight/all", get(list_flights))
        .route("/api/flight/search", post(search_flights))
        .route("/api/flight/search/airline", post(search_by_airline))
        .route("/api/flight/{id}", get(get_flight))
        .route("/api/flight/internal/{id}/reserve/{count}", put(reserve_seats))
        .route("/api/flight/internal/{id}/release/{count}", put(release_seats))
}

async fn add_flight(
    State(state): State<AppState>,
    Json(new_flight): Json<NewFlight>,
) -> Result<(StatusCode, Json<FlightAdded>), AppError> {
    let flight = state.flights.add_flight(new_flight).await?;
    Ok((
        StatusCode::CREATED,
        Json(FlightAdded {
            flight_id: flight.id,
            message: "Flight added successfully",
        }),
    ))
}

async fn list_flights(State(state): State<AppState>) -> Result<Json<Vec<Flight>>, AppError> {
    Ok(Json(state.flights.list_flights().await?))
}

async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Flight>, AppError> {
    Ok(Json(state.flights.get_flight(&id).await?))
}

async fn search_flights(
    State(state): State<AppState>,
    Json(search): Json<FlightSearch>,
) -> Result<Json<Vec<Flight>>, AppError> {
    Ok(Json(state.flights.search_flights(&search).await?))
}

async fn search_by_airline(
    State(state): State<AppState>,
    Json(search): Json<AirlineSearch>,
) -> Result<Json<Vec<Flight>>, AppError> {
    Ok(Json(state.flights.search_by_airline(&search).await?))
}

// Internal routes, called by a remote booking service's inventory client.

async fn reserve_seats(
    State(state): State<AppState>,
    Path((id, count)): Path<(String, u32)>,
) -> Result<Json<Flight>, AppError> {
    Ok(Json(state.flights.reserve_seats(&id, count).await?))
}

async fn release_seats(
    State(state): State<AppState>,
    Path((id, count)): Path<(String, u32)>,
) -> Result<Json<Flight>, AppError> {
    Ok(Json(state.flights.release_seats(&id, count).await?))
}
