use async_trait::async_trait;
use corelib::models::PriceUpdate;
use thiserror::Error;

/// Delivery capability for price updates.
///
/// Implementations may fail transiently; the caller decides whether to
/// retry or drop. Implementations that key delivery by symbol preserve
/// per-symbol order; ordering across symbols is not part of the contract.
#[async_trait]
pub trait PriceSink: Send + Sync + 'static {
    async fn enqueue(&self, update: PriceUpdate) -> Result<(), TransportError>;
}

#[derive(Error, Debug)]
pub enum TransportError {
    /// The ingestion side is gone; no further deliveries can succeed.
    #[error("ingestion channel closed")]
    ChannelClosed,

    #[error("failed to encode price update: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("kafka client error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// Delivery of a single message failed; later deliveries may succeed.
    #[error("delivery to topic {topic} failed: {reason}")]
    Delivery { topic: String, reason: String },

    #[error("topic administration failed: {0}")]
    Admin(String),
}
