use async_trait::async_trait;
use skybook_core::{Passenger, StoreError, Ticket, TicketRepository};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Ticket store used when no database is configured, and by tests.
pub struct InMemoryTicketRepository {
    tickets: RwLock<HashMap<String, Ticket>>,
    passengers: RwLock<HashMap<Uuid, Vec<Passenger>>>,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self {
            tickets: RwLock::new(HashMap::new()),
            passengers: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTicketRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn create_ticket(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        let mut tickets = self.tickets.write().await;
        if tickets.contains_key(&ticket.pnr) {
            return Err(StoreError::Conflict(format!("PNR {} already exists", ticket.pnr)));
        }
        tickets.insert(ticket.pnr.clone(), ticket.clone());
        Ok(ticket.clone())
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        let mut tickets = self.tickets.write().await;
        let stored = tickets
            .get_mut(&ticket.pnr)
            .ok_or_else(|| StoreError::NotFound(format!("Ticket {}", ticket.pnr)))?;
        *stored = ticket.clone();
        Ok(ticket.clone())
    }

    async fn mark_cancelled(&self, pnr: &str) -> Result<bool, StoreError> {
        let mut tickets = self.tickets.write().await;
        let stored = tickets
            .get_mut(pnr)
            .ok_or_else(|| StoreError::NotFound(format!("Ticket {}", pnr)))?;
        Ok(stored.cancel())
    }

    async fn find_by_pnr(&self, pnr: &str) -> Result<Option<Ticket>, StoreError> {
        Ok(self.tickets.read().await.get(pnr).cloned())
    }

    async fn find_by_user(&self, email: &str) -> Result<Vec<Ticket>, StoreError> {
        let mut found: Vec<Ticket> = self
            .tickets
            .read()
            .await
            .values()
            .filter(|t| t.user_email == email)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.booking_time.cmp(&a.booking_time).then_with(|| a.pnr.cmp(&b.pnr)));
        Ok(found)
    }

    async fn save_passengers(&self, passengers: &[Passenger]) -> Result<Vec<Passenger>, StoreError> {
        let mut stored = self.passengers.write().await;
        for passenger in passengers {
            stored.entry(passenger.ticket_id).or_default().push(passenger.clone());
        }
        Ok(passengers.to_vec())
    }

    async fn find_passengers(&self, ticket_id: Uuid) -> Result<Vec<Passenger>, StoreError> {
        Ok(self.passengers.read().await.get(&ticket_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use skybook_core::TripType;

    fn ticket(pnr: &str, email: &str, minutes_ago: i64) -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            pnr: pnr.to_string(),
            user_email: email.to_string(),
            departure_flight_id: "FL1".to_string(),
            return_flight_id: None,
            trip_type: TripType::OneWay,
            booking_time: Utc::now() - Duration::minutes(minutes_ago),
            seats_booked: "1A".to_string(),
            total_price: 100,
            canceled: false,
        }
    }

    #[tokio::test]
    async fn test_duplicate_pnr_conflicts() {
        let repo = InMemoryTicketRepository::new();
        repo.create_ticket(&ticket("ABC123", "a@x.com", 0)).await.unwrap();
        let err = repo.create_ticket(&ticket("ABC123", "b@x.com", 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(repo.find_by_pnr("ABC123").await.unwrap().unwrap().user_email, "a@x.com");
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let repo = InMemoryTicketRepository::new();
        repo.create_ticket(&ticket("OLD001", "a@x.com", 60)).await.unwrap();
        repo.create_ticket(&ticket("NEW001", "a@x.com", 1)).await.unwrap();
        repo.create_ticket(&ticket("OTHER1", "b@x.com", 1)).await.unwrap();

        let pnrs: Vec<String> = repo
            .find_by_user("a@x.com")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.pnr)
            .collect();
        assert_eq!(pnrs, vec!["NEW001", "OLD001"]);
        assert!(repo.find_by_user("nobody@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_ticket() {
        let repo = InMemoryTicketRepository::new();
        let err = repo.update_ticket(&ticket("NOPE00", "a@x.com", 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_cancelled_only_once() {
        let repo = InMemoryTicketRepository::new();
        repo.create_ticket(&ticket("CXL001", "a@x.com", 0)).await.unwrap();

        assert!(repo.mark_cancelled("CXL001").await.unwrap());
        assert!(!repo.mark_cancelled("CXL001").await.unwrap());
        assert!(repo.find_by_pnr("CXL001").await.unwrap().unwrap().canceled);

        let err = repo.mark_cancelled("NOPE00").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_passengers_by_ticket() {
        let repo = InMemoryTicketRepository::new();
        let t = ticket("PAX001", "a@x.com", 0);
        let passenger = Passenger {
            id: Uuid::new_v4(),
            ticket_id: t.id,
            name: "Asha".to_string(),
            gender: "Female".to_string(),
            age: 31,
            seat_number: "1A".to_string(),
            meal_preference: Some("VEG".to_string()),
        };
        repo.save_passengers(std::slice::from_ref(&passenger)).await.unwrap();
        assert_eq!(repo.find_passengers(t.id).await.unwrap(), vec![passenger]);
        assert!(repo.find_passengers(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
