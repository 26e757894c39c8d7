use std::time::Duration;

use async_trait::async_trait;
use corelib::models::PriceUpdate;
use rdkafka::producer::{FutureProducer, FutureRecord};

use super::KafkaSettings;
use crate::sink::{PriceSink, TransportError};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Kafka-backed sink.
///
/// The message key is the symbol, so partitioned delivery preserves
/// per-symbol order. Delivery failures surface to the caller; this layer
/// never retries.
pub struct KafkaSink {
    producer: FutureProducer,
    topic: String,
}

impl KafkaSink {
    pub fn new(settings: &KafkaSettings) -> Result<Self, TransportError> {
        let producer: FutureProducer = settings
            .client_config()
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self {
            producer,
            topic: settings.topic.clone(),
        })
    }
}

#[async_trait]
impl PriceSink for KafkaSink {
    async fn enqueue(&self, update: PriceUpdate) -> Result<(), TransportError> {
        let payload = serde_json::to_string(&update)?;
        let record = FutureRecord::to(&self.topic)
            .key(&update.symbol)
            .payload(&payload);

        self.producer
            .send(record, DELIVERY_TIMEOUT)
            .await
            .map(|_| ())
            .map_err(|(e, _)| TransportError::Delivery {
                topic: self.topic.clone(),
                reason: e.to_string(),
            })
    }
}
