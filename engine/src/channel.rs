//! Ingestion channel decoupling update arrival from detection.
//!
//! Single logical reader; any number of producers. Once every sender is
//! dropped the receiver drains what is buffered and then reports
//! end-of-stream, so an orderly producer-side shutdown loses nothing.

use corelib::models::PriceUpdate;
use tokio::sync::mpsc;

/// Build the ingestion queue.
///
/// `capacity = None` keeps the queue unbounded (sends never wait);
/// `Some(n)` bounds it at `n` and lets `send` suspend under backpressure.
pub fn price_queue(capacity: Option<usize>) -> (PriceSender, PriceReceiver) {
    match capacity {
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (PriceSender::Unbounded(tx), PriceReceiver::Unbounded(rx))
        }
        Some(n) => {
            let (tx, rx) = mpsc::channel(n.max(1));
            (PriceSender::Bounded(tx), PriceReceiver::Bounded(rx))
        }
    }
}

/// Producer side of the ingestion queue.
#[derive(Clone, Debug)]
pub enum PriceSender {
    Unbounded(mpsc::UnboundedSender<PriceUpdate>),
    Bounded(mpsc::Sender<PriceUpdate>),
}

impl PriceSender {
    /// Deliver one update to the reader.
    ///
    /// Suspends only on a bounded queue at capacity. Fails once the reader
    /// is gone; the update is handed back to the caller.
    pub async fn send(&self, update: PriceUpdate) -> Result<(), PriceUpdate> {
        match self {
            Self::Unbounded(tx) => tx.send(update).map_err(|e| e.0),
            Self::Bounded(tx) => tx.send(update).await.map_err(|e| e.0),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Self::Unbounded(tx) => tx.is_closed(),
            Self::Bounded(tx) => tx.is_closed(),
        }
    }
}

/// Consumer side of the ingestion queue.
#[derive(Debug)]
pub enum PriceReceiver {
    Unbounded(mpsc::UnboundedReceiver<PriceUpdate>),
    Bounded(mpsc::Receiver<PriceUpdate>),
}

impl PriceReceiver {
    /// Wait for the next update; `None` means every sender is gone and the
    /// buffer is drained.
    pub async fn recv(&mut self) -> Option<PriceUpdate> {
        match self {
            Self::Unbounded(rx) => rx.recv().await,
            Self::Bounded(rx) => rx.recv().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio::time::{Duration, sleep};

    fn update(symbol: &str, price: f64) -> PriceUpdate {
        PriceUpdate::new(symbol, price, Utc::now())
    }

    #[tokio::test]
    async fn delivers_in_arrival_order() {
        let (tx, mut rx) = price_queue(None);

        tx.send(update("a", 1.0)).await.unwrap();
        tx.send(update("b", 2.0)).await.unwrap();
        tx.send(update("c", 3.0)).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().symbol, "a");
        assert_eq!(rx.recv().await.unwrap().symbol, "b");
        assert_eq!(rx.recv().await.unwrap().symbol, "c");
    }

    #[tokio::test]
    async fn drains_buffered_updates_after_close() {
        let (tx, mut rx) = price_queue(None);

        tx.send(update("a", 1.0)).await.unwrap();
        tx.send(update("b", 2.0)).await.unwrap();
        drop(tx);

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn send_fails_once_reader_is_gone() {
        let (tx, rx) = price_queue(None);
        drop(rx);

        let rejected = tx.send(update("a", 1.0)).await.unwrap_err();
        assert_eq!(rejected.symbol, "a");
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn bounded_queue_applies_backpressure() {
        let (tx, mut rx) = price_queue(Some(1));

        tx.send(update("a", 1.0)).await.unwrap();

        // Second send must wait until the reader makes room.
        let blocked = tx.send(update("b", 2.0));
        tokio::select! {
            _ = blocked => panic!("send completed against a full queue"),
            _ = sleep(Duration::from_millis(10)) => {}
        }

        assert_eq!(rx.recv().await.unwrap().symbol, "a");
        tx.send(update("b", 2.0)).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().symbol, "b");
    }
}
