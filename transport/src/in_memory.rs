use async_trait::async_trait;
use corelib::models::PriceUpdate;
use engine::channel::PriceSender;

use crate::sink::{PriceSink, TransportError};

/// In-process transport: a sink view over the ingestion queue.
///
/// Enqueue cost is one channel send; backpressure behavior follows the
/// queue's configuration (unbounded or bounded).
pub struct InMemorySink {
    tx: PriceSender,
}

impl InMemorySink {
    pub fn new(tx: PriceSender) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl PriceSink for InMemorySink {
    async fn enqueue(&self, update: PriceUpdate) -> Result<(), TransportError> {
        self.tx
            .send(update)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use engine::channel::price_queue;

    #[tokio::test]
    async fn enqueued_updates_reach_the_receiver() {
        let (tx, mut rx) = price_queue(None);
        let sink = InMemorySink::new(tx);

        sink.enqueue(PriceUpdate::new("fameli", 100.0, Utc::now()))
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap().symbol, "fameli");
    }

    #[tokio::test]
    async fn enqueue_fails_once_the_reader_is_gone() {
        let (tx, rx) = price_queue(None);
        let sink = InMemorySink::new(tx);
        drop(rx);

        let err = sink
            .enqueue(PriceUpdate::new("fameli", 100.0, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ChannelClosed));
    }
}
