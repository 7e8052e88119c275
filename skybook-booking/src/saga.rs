use skybook_core::{Flight, InventoryClient, InventoryError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Inventory client with every call bounded by a deadline.
///
/// A call that does not finish in time is reported as
/// `InventoryError::Unavailable`; whether the remote side applied it is unknown.
pub struct TimedInventory {
    client: Arc<dyn InventoryClient>,
    timeout: Duration,
}

impl TimedInventory {
    pub fn new(client: Arc<dyn InventoryClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn bounded<T, F>(&self, call: String, fut: F) -> Result<T, InventoryError>
    where
        F: Future<Output = Result<T, InventoryError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Inventory call {} timed out after {:?}", call, self.timeout);
                Err(InventoryError::Unavailable(format!(
                    "{call} timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }

    pub async fn get_flight(&self, flight_id: &str) -> Result<Option<Flight>, InventoryError> {
        self.bounded(format!("get_flight({flight_id})"), self.client.get_flight(flight_id))
            .await
    }

    pub async fn reserve_seats(&self, flight_id: &str, seats: u32) -> Result<(), InventoryError> {
        self.bounded(
            format!("reserve_seats({flight_id}, {seats})"),
            self.client.reserve_seats(flight_id, seats),
        )
        .await
    }

    pub async fn release_seats(&self, flight_id: &str, seats: u32) -> Result<(), InventoryError> {
        self.bounded(
            format!("release_seats({flight_id}, {seats})"),
            self.client.release_seats(flight_id, seats),
        )
        .await
    }
}

/// Seats taken out of inventory on behalf of a booking that is not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatHold {
    pub flight_id: String,
    pub seats: u32,
}

/// Completed reservation steps of one booking, oldest first.
#[derive(Debug, Default)]
pub struct SeatHolds {
    holds: Vec<SeatHold>,
}

impl SeatHolds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, flight_id: &str, seats: u32) {
        self.holds.push(SeatHold {
            flight_id: flight_id.to_string(),
            seats,
        });
    }

    pub fn len(&self) -> usize {
        self.holds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holds.is_empty()
    }

    pub fn holds(&self) -> &[SeatHold] {
        &self.holds
    }

    /// Give every held seat back, newest hold first.
    ///
    /// All holds are attempted even if one fails. The error lists the holds
    /// that could not be released; those seats stay out of inventory.
    pub async fn release_all(self, inventory: &TimedInventory) -> Result<(), String> {
        let mut failures = Vec::new();

        for hold in self.holds.iter().rev() {
            if let Err(e) = inventory.release_seats(&hold.flight_id, hold.seats).await {
                error!(
                    flight_id = %hold.flight_id,
                    seats = hold.seats,
                    "Compensating release failed: {}",
                    e
                );
                failures.push(format!("release of {} seats on {} failed: {}", hold.seats, hold.flight_id, e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        released: Mutex<Vec<(String, u32)>>,
        broken: Option<&'static str>,
    }

    #[async_trait]
    impl InventoryClient for Recorder {
        async fn get_flight(&self, _flight_id: &str) -> Result<Option<Flight>, InventoryError> {
            Ok(None)
        }

        async fn reserve_seats(&self, _flight_id: &str, _seats: u32) -> Result<(), InventoryError> {
            Ok(())
        }

        async fn release_seats(&self, flight_id: &str, seats: u32) -> Result<(), InventoryError> {
            self.released.lock().unwrap().push((flight_id.to_string(), seats));
            if self.broken == Some(flight_id) {
                return Err(InventoryError::NotFound(flight_id.to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_release_all_newest_first() {
        let recorder = Arc::new(Recorder::default());
        let inventory = TimedInventory::new(recorder.clone(), Duration::from_secs(1));

        let mut holds = SeatHolds::new();
        holds.record("FL1", 2);
        holds.record("FL2", 2);
        assert_eq!(holds.len(), 2);

        holds.release_all(&inventory).await.unwrap();
        assert_eq!(
            *recorder.released.lock().unwrap(),
            vec![("FL2".to_string(), 2), ("FL1".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_release_all_keeps_going_after_failure() {
        let recorder = Arc::new(Recorder {
            broken: Some("FL2"),
            ..Default::default()
        });
        let inventory = TimedInventory::new(recorder.clone(), Duration::from_secs(1));

        let mut holds = SeatHolds::new();
        holds.record("FL1", 1);
        holds.record("FL2", 1);

        let err = holds.release_all(&inventory).await.unwrap_err();
        assert!(err.contains("FL2"));
        assert!(!err.contains("on FL1"));
        assert_eq!(recorder.released.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_holds_release_nothing() {
        let recorder = Arc::new(Recorder::default());
        let inventory = TimedInventory::new(recorder.clone(), Duration::from_secs(1));
        let holds = SeatHolds::new();
        assert!(holds.is_empty());
        holds.release_all(&inventory).await.unwrap();
        assert!(recorder.released.lock().unwrap().is_empty());
    }
}
