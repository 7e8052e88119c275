use chrono::Utc;
use skybook_core::events::EventPublisher;
use skybook_core::{
    BookingError, BookingRequest, BookingResult, CancelOutcome, InventoryClient, InventoryError,
    Passenger, StoreError, Ticket, TicketRepository, TripType,
};
use skybook_shared::{BookingEvent, BookingEventKind, Masked};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::pnr::{generate_pnr, MAX_PNR_ATTEMPTS};
use crate::saga::{SeatHolds, TimedInventory};
use crate::seats::{assign_seat_labels, join_seat_labels};

pub const DEPARTURE_NOT_FOUND: &str = "Departure flight not found";
pub const NOT_ENOUGH_SEATS: &str = "Not enough seats";
pub const RETURN_NOT_FOUND: &str = "Return flight not found";
pub const NOT_ENOUGH_SEATS_RETURN: &str = "Not enough seats in return flight";
pub const SEAT_RESERVATION_FAILED: &str = "Seat reservation failed";
pub const TICKET_NOT_FOUND: &str = "Ticket not found";
pub const FARE_OUT_OF_RANGE: &str = "Total fare is out of range";

#[derive(Debug, Clone)]
pub struct BookingSettings {
    /// Upper bound for every single inventory call.
    pub inventory_timeout: Duration,
    pub max_pnr_attempts: u32,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            inventory_timeout: Duration::from_secs(5),
            max_pnr_attempts: MAX_PNR_ATTEMPTS,
        }
    }
}

/// Drives a booking across the inventory service and the ticket store.
///
/// Seats are reserved departure first, then return. Any failure after a
/// reservation succeeded releases the held seats again before the error is
/// returned, so a failed booking leaves inventory as it found it.
pub struct BookingOrchestrator {
    inventory: TimedInventory,
    tickets: Arc<dyn TicketRepository>,
    events: Arc<dyn EventPublisher>,
    settings: BookingSettings,
}

impl BookingOrchestrator {
    pub fn new(
        inventory: Arc<dyn InventoryClient>,
        tickets: Arc<dyn TicketRepository>,
        events: Arc<dyn EventPublisher>,
        settings: BookingSettings,
    ) -> Self {
        Self {
            inventory: TimedInventory::new(inventory, settings.inventory_timeout),
            tickets,
            events,
            settings,
        }
    }

    /// Book a one-way or round trip and return the new PNR.
    pub async fn book_ticket(&self, request: BookingRequest) -> BookingResult<String> {
        let seat_count = request.seat_count();
        if seat_count == 0 {
            return Err(BookingError::InvalidRequest(
                "At least one passenger is required".to_string(),
            ));
        }

        let return_flight_id = match (request.trip_type, request.return_flight_id.as_deref()) {
            (TripType::RoundTrip, Some(id)) => Some(id.to_string()),
            (TripType::RoundTrip, None) => {
                return Err(BookingError::InvalidRequest(
                    "Return flight is required for a round trip".to_string(),
                ))
            }
            (TripType::OneWay, Some(_)) => {
                return Err(BookingError::InvalidRequest(
                    "Return flight is only allowed for a round trip".to_string(),
                ))
            }
            (TripType::OneWay, None) => None,
        };

        // Availability checks against a snapshot; the reservations below are
        // what actually decide.
        let departure = self
            .inventory
            .get_flight(&request.departure_flight_id)
            .await
            .map_err(from_inventory)?
            .ok_or_else(|| BookingError::InvalidRequest(DEPARTURE_NOT_FOUND.to_string()))?;
        if !departure.has_capacity(seat_count) {
            return Err(BookingError::InvalidRequest(NOT_ENOUGH_SEATS.to_string()));
        }
        let mut total_price = departure
            .fare_for(seat_count)
            .ok_or_else(|| BookingError::InvalidRequest(FARE_OUT_OF_RANGE.to_string()))?;

        if let Some(return_id) = return_flight_id.as_deref() {
            let return_flight = self
                .inventory
                .get_flight(return_id)
                .await
                .map_err(from_inventory)?
                .ok_or_else(|| BookingError::InvalidRequest(RETURN_NOT_FOUND.to_string()))?;
            if !return_flight.has_capacity(seat_count) {
                return Err(BookingError::InvalidRequest(NOT_ENOUGH_SEATS_RETURN.to_string()));
            }
            total_price = return_flight
                .fare_for(seat_count)
                .and_then(|fare| total_price.checked_add(fare))
                .ok_or_else(|| BookingError::InvalidRequest(FARE_OUT_OF_RANGE.to_string()))?;
        }

        let holds = self
            .hold_seats(&request.departure_flight_id, return_flight_id.as_deref(), seat_count)
            .await?;

        let labels = assign_seat_labels(&request.passengers);

        let ticket = match self
            .persist_ticket(&request, return_flight_id, &labels, total_price)
            .await
        {
            Ok(ticket) => ticket,
            Err(e) => return Err(self.compensate(holds, e).await),
        };

        let passengers: Vec<Passenger> = request
            .passengers
            .iter()
            .zip(labels)
            .map(|(p, seat_number)| Passenger {
                id: Uuid::new_v4(),
                ticket_id: ticket.id,
                name: p.name.clone(),
                gender: p.gender.clone(),
                age: p.age,
                seat_number,
                meal_preference: p.meal_preference.clone(),
            })
            .collect();

        // The PNR is already valid at this point; missing passenger rows do
        // not undo the booking.
        if let Err(e) = self.tickets.save_passengers(&passengers).await {
            error!(pnr = %ticket.pnr, "Failed to store passengers: {}", e);
        }

        self.publish(BookingEventKind::Booked, &ticket).await;

        info!(
            "Ticket booked: pnr={} user={} seats={} total={}",
            ticket.pnr,
            Masked(ticket.user_email.as_str()),
            ticket.seats_booked,
            ticket.total_price
        );
        Ok(ticket.pnr)
    }

    async fn hold_seats(
        &self,
        departure_id: &str,
        return_id: Option<&str>,
        seats: u32,
    ) -> BookingResult<SeatHolds> {
        let mut holds = SeatHolds::new();

        self.inventory
            .reserve_seats(departure_id, seats)
            .await
            .map_err(|e| reservation_failure(e, SEAT_RESERVATION_FAILED))?;
        holds.record(departure_id, seats);

        if let Some(return_id) = return_id {
            if let Err(e) = self.inventory.reserve_seats(return_id, seats).await {
                let cause = reservation_failure(e, NOT_ENOUGH_SEATS_RETURN);
                return Err(self.compensate(holds, cause).await);
            }
            holds.record(return_id, seats);
        }

        Ok(holds)
    }

    /// Release `holds` after `cause` ended the booking and return the error
    /// the caller should see.
    async fn compensate(&self, holds: SeatHolds, cause: BookingError) -> BookingError {
        warn!("Booking aborted ({}), releasing {} seat hold(s)", cause, holds.len());

        match holds.release_all(&self.inventory).await {
            Ok(()) => cause,
            Err(compensation) => {
                error!("Seats left held after failed booking: {}", compensation);
                BookingError::CompensationFailed {
                    cause: Box::new(cause),
                    compensation,
                }
            }
        }
    }

    async fn persist_ticket(
        &self,
        request: &BookingRequest,
        return_flight_id: Option<String>,
        labels: &[String],
        total_price: i64,
    ) -> BookingResult<Ticket> {
        let mut ticket = Ticket {
            id: Uuid::new_v4(),
            pnr: String::new(),
            user_email: request.user_email.clone(),
            departure_flight_id: request.departure_flight_id.clone(),
            return_flight_id,
            trip_type: request.trip_type,
            booking_time: Utc::now(),
            seats_booked: join_seat_labels(labels),
            total_price,
            canceled: false,
        };

        let attempts = self.settings.max_pnr_attempts.max(1);
        for attempt in 1..=attempts {
            ticket.pnr = generate_pnr();
            match self.tickets.create_ticket(&ticket).await {
                Ok(stored) => return Ok(stored),
                Err(StoreError::Conflict(_)) if attempt < attempts => {
                    debug!("PNR {} already taken, drawing another", ticket.pnr);
                }
                Err(StoreError::Conflict(_)) => break,
                Err(e) => return Err(e.into()),
            }
        }

        Err(BookingError::Conflict(format!(
            "Could not allocate a unique PNR after {attempts} attempts"
        )))
    }

    pub async fn get_by_pnr(&self, pnr: &str) -> BookingResult<Ticket> {
        self.tickets
            .find_by_pnr(pnr)
            .await?
            .ok_or_else(|| BookingError::NotFound(TICKET_NOT_FOUND.to_string()))
    }

    pub async fn passengers_for(&self, ticket: &Ticket) -> BookingResult<Vec<Passenger>> {
        Ok(self.tickets.find_passengers(ticket.id).await?)
    }

    /// Every ticket booked under `email`, cancelled ones included.
    pub async fn history_by_email(&self, email: &str) -> BookingResult<Vec<Ticket>> {
        Ok(self.tickets.find_by_user(email).await?)
    }

    /// Cancel a ticket and give its seats back to every flight it holds.
    ///
    /// Cancelling twice is not an error: the second call reports
    /// `AlreadyCancelled` and does not touch inventory. The ticket is marked
    /// cancelled before any seat is released, so of two concurrent cancels
    /// only one releases seats.
    pub async fn cancel_by_pnr(&self, pnr: &str) -> BookingResult<CancelOutcome> {
        let mut ticket = self.get_by_pnr(pnr).await?;

        if ticket.canceled {
            info!("Ticket {} already cancelled", pnr);
            return Ok(CancelOutcome::AlreadyCancelled);
        }

        if !self.tickets.mark_cancelled(pnr).await? {
            info!("Ticket {} was cancelled by a concurrent request", pnr);
            return Ok(CancelOutcome::AlreadyCancelled);
        }

        let seats = ticket.seat_count();
        if seats == 0 {
            warn!("Ticket {} holds no seat labels, nothing to release", pnr);
        } else {
            let mut released = 0;
            for flight_id in ticket.flight_ids() {
                if let Err(e) = self.inventory.release_seats(flight_id, seats).await {
                    if released == 0 {
                        // No seat went back yet, so the cancel can safely be retried.
                        if let Err(reopen) = self.tickets.update_ticket(&ticket).await {
                            error!("Ticket {} left cancelled with seats still held: {}", pnr, reopen);
                        }
                    } else {
                        error!(
                            "Cancel of {} released {} flight(s) before {} failed: {}",
                            pnr, released, flight_id, e
                        );
                    }
                    return Err(from_inventory(e));
                }
                released += 1;
            }
        }

        ticket.cancel();

        self.publish(BookingEventKind::Cancelled, &ticket).await;
        info!("Ticket {} cancelled, {} seat(s) released per flight", pnr, seats);
        Ok(CancelOutcome::Cancelled)
    }

    async fn publish(&self, kind: BookingEventKind, ticket: &Ticket) {
        let event = BookingEvent {
            kind,
            pnr: ticket.pnr.clone(),
            user_email: Masked(ticket.user_email.clone()),
            departure_flight_id: ticket.departure_flight_id.clone(),
            return_flight_id: ticket.return_flight_id.clone(),
            seat_count: ticket.seat_count(),
            total_price: ticket.total_price,
            occurred_at: Utc::now().timestamp(),
        };

        if let Err(e) = self.events.publish(&event).await {
            warn!("Failed to publish {:?} event for {}: {}", kind, ticket.pnr, e);
        }
    }
}

fn from_inventory(err: InventoryError) -> BookingError {
    match err {
        InventoryError::NotFound(id) => BookingError::NotFound(format!("Flight not found: {id}")),
        e @ (InventoryError::InsufficientSeats { .. } | InventoryError::Duplicate) => {
            BookingError::Conflict(e.to_string())
        }
        e @ (InventoryError::InvalidFlight(_) | InventoryError::InvalidSeatCount) => {
            BookingError::InvalidRequest(e.to_string())
        }
        InventoryError::Unavailable(msg) => BookingError::Unavailable(msg),
        InventoryError::Storage(msg) => BookingError::Storage(msg),
    }
}

/// A lost race on a reservation is reported with `reason`; anything else
/// keeps its own meaning.
fn reservation_failure(err: InventoryError, reason: &str) -> BookingError {
    match err {
        InventoryError::InsufficientSeats { .. } => BookingError::Conflict(reason.to_string()),
        other => from_inventory(other),
    }
}
