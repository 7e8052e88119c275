use skybook_shared::BookingEvent;

/// JSON payload published for a booking event.
pub fn encode_event(event: &BookingEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

#[cfg(feature = "kafka")]
pub use kafka::KafkaEventPublisher;

#[cfg(feature = "kafka")]
mod kafka {
    use async_trait::async_trait;
    use rdkafka::config::ClientConfig;
    use rdkafka::producer::{FutureProducer, FutureRecord};
    use rdkafka::util::Timeout;
    use skybook_core::events::EventPublisher;
    use skybook_shared::BookingEvent;
    use std::time::Duration;
    use tracing::{error, info};

    use super::encode_event;

    #[derive(Clone)]
    pub struct KafkaEventPublisher {
        producer: FutureProducer,
    }

    impl KafkaEventPublisher {
        pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
            let producer: FutureProducer = ClientConfig::new()
                .set("bootstrap.servers", brokers)
                .set("message.timeout.ms", "5000")
                .create()?;

            Ok(Self { producer })
        }
    }

    #[async_trait]
    impl EventPublisher for KafkaEventPublisher {
        async fn publish(
            &self,
            event: &BookingEvent,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let payload = encode_event(event)?;
            let record = FutureRecord::to(event.topic())
                .key(event.key())
                .payload(&payload);

            match self.producer.send(record, Timeout::After(Duration::from_secs(0))).await {
                Ok(delivery) => {
                    info!(
                        "Sent {:?} event for {} to {}: partition {} offset {}",
                        event.kind,
                        event.pnr,
                        event.topic(),
                        delivery.partition,
                        delivery.offset
                    );
                    Ok(())
                }
                Err((e, _msg)) => {
                    error!("Failed to send message to {}: {}", event.topic(), e);
                    Err(Box::new(e))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skybook_shared::{BookingEventKind, Masked};

    #[test]
    fn test_payload_carries_real_email() {
        let event = BookingEvent {
            kind: BookingEventKind::Booked,
            pnr: "AB12CD".to_string(),
            user_email: Masked("flyer@example.com".to_string()),
            departure_flight_id: "FL1".to_string(),
            return_flight_id: Some("FL2".to_string()),
            seat_count: 2,
            total_price: 500,
            occurred_at: 1_700_000_000,
        };

        let payload = encode_event(&event).unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(json["kind"], "BOOKED");
        assert_eq!(json["user_email"], "flyer@example.com");
        assert_eq!(json["return_flight_id"], "FL2");
    }
}
