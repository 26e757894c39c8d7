//! Synthetic price update generator.
//!
//! Each tick emits a batch of randomized updates. Timestamps are jittered
//! up to one second into the past, so a fresh update can find a reference
//! that is already a full second older.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use corelib::models::PriceUpdate;
use corelib::validation::validate;
use rand::Rng;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{info, warn};
use transport::sink::{PriceSink, TransportError};

pub struct Simulator {
    symbols: Vec<String>,
    batch_size: usize,
    tick_interval: Duration,
}

impl Simulator {
    pub fn new(symbols: Vec<String>, batch_size: usize, tick_interval: Duration) -> Self {
        Self {
            symbols,
            batch_size,
            tick_interval,
        }
    }

    /// Generate until `shutdown` flips or the sink reports the ingestion
    /// side gone. Updates failing validation are logged per violated rule
    /// and skipped; other delivery failures drop the single update.
    pub async fn run(&self, sink: Arc<dyn PriceSink>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut sent: u64 = 0;
        let mut window_start = Instant::now();

        info!(
            symbols = self.symbols.len(),
            batch_size = self.batch_size,
            "price update generator started"
        );

        'generation: loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let now = Utc::now();
            for _ in 0..self.batch_size {
                let update = random_update(&self.symbols, now);

                if let Err(e) = validate(&update) {
                    for violation in &e.violations {
                        warn!(field = violation.field, "validation failed: {}", violation.message);
                    }
                    continue;
                }

                match sink.enqueue(update).await {
                    Ok(()) => sent += 1,
                    Err(TransportError::ChannelClosed) => {
                        warn!("ingestion channel closed, generator stopping");
                        break 'generation;
                    }
                    Err(e) => warn!(error = %e, "enqueue failed, dropping update"),
                }
            }

            if window_start.elapsed() >= Duration::from_secs(1) {
                info!(sent, "updates sent in last second");
                sent = 0;
                window_start = Instant::now();
            }
        }

        info!("price update generator stopped");
    }
}

fn random_update(symbols: &[String], now: DateTime<Utc>) -> PriceUpdate {
    let mut rng = rand::thread_rng();

    let symbol = symbols[rng.gen_range(0..symbols.len())].clone();
    let price = rng.gen_range(1_000.0..51_000.0);
    let jitter_ms: i64 = rng.gen_range(0..1_000);

    PriceUpdate::new(symbol, price, now - ChronoDuration::milliseconds(jitter_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use corelib::validation::is_valid;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct CollectingSink {
        updates: Mutex<Vec<PriceUpdate>>,
    }

    #[async_trait]
    impl PriceSink for CollectingSink {
        async fn enqueue(&self, update: PriceUpdate) -> Result<(), TransportError> {
            self.updates.lock().push(update);
            Ok(())
        }
    }

    #[test]
    fn random_updates_are_valid_and_jittered_into_the_past() {
        let symbols = vec!["fameli".to_string(), "folad".to_string()];
        let now = Utc::now();

        for _ in 0..1_000 {
            let update = random_update(&symbols, now);
            assert!(is_valid(&update));
            assert!(update.timestamp <= now);
            assert!(now - update.timestamp < ChronoDuration::seconds(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn emits_one_batch_per_tick_and_stops_on_shutdown() {
        let sink = Arc::new(CollectingSink::default());
        let simulator = Simulator::new(
            vec!["shsta".to_string()],
            25,
            Duration::from_millis(100),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let runner = {
            let sink = Arc::clone(&sink) as Arc<dyn PriceSink>;
            tokio::spawn(async move { simulator.run(sink, shutdown_rx).await })
        };
        tokio::task::yield_now().await;

        // First tick fires immediately; one more interval means two batches.
        tokio::time::advance(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;

        shutdown_tx.send(true).unwrap();
        runner.await.unwrap();

        assert_eq!(sink.updates.lock().len(), 50);
    }
}
