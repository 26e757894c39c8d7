//! Throughput accounting off the hot path.
//!
//! Detection admissions bump a relaxed atomic counter; a periodic reporter
//! swaps the count out and emits it. Detection tasks never wait on the
//! reporter, so the count is best-effort rather than synchronized with
//! detection completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};

#[derive(Clone, Debug, Default)]
pub struct ThroughputCounter {
    processed: Arc<AtomicU64>,
}

impl ThroughputCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// One observation admitted into detection.
    pub fn record(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Read and reset the window count.
    pub fn take(&self) -> u64 {
        self.processed.swap(0, Ordering::Relaxed)
    }

    pub fn current(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

/// Receiver of periodic throughput reports.
pub trait ThroughputSink: Send + Sync + 'static {
    fn report(&self, window_start: DateTime<Utc>, processed: u64);
}

/// Emits reports as structured info events.
#[derive(Debug, Default)]
pub struct LogThroughputSink;

impl ThroughputSink for LogThroughputSink {
    fn report(&self, window_start: DateTime<Utc>, processed: u64) {
        tracing::info!(
            window_start = %window_start.format("%H:%M:%S%.3f"),
            processed,
            "updates processed in last interval"
        );
    }
}

/// Periodic read-and-reset loop.
///
/// Runs until `shutdown` flips to true or its sender is dropped. Missed
/// ticks are skipped rather than bunched.
pub async fn run_reporter(
    counter: ThroughputCounter,
    every: Duration,
    sink: Arc<dyn ThroughputSink>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; consume it so the first
    // reported window spans a full interval.
    ticker.tick().await;

    let mut window_start = Utc::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let processed = counter.take();
                sink.report(window_start, processed);
                window_start = Utc::now();
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tokio::time::advance;

    #[derive(Default)]
    struct CollectingSink {
        windows: Mutex<Vec<u64>>,
    }

    impl ThroughputSink for CollectingSink {
        fn report(&self, _window_start: DateTime<Utc>, processed: u64) {
            self.windows.lock().push(processed);
        }
    }

    #[test]
    fn take_resets_the_counter() {
        let counter = ThroughputCounter::new();
        counter.record();
        counter.record();

        assert_eq!(counter.take(), 2);
        assert_eq!(counter.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reports_and_resets_every_interval() {
        let counter = ThroughputCounter::new();
        let sink = Arc::new(CollectingSink::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(run_reporter(
            counter.clone(),
            Duration::from_secs(1),
            sink.clone(),
            shutdown_rx,
        ));
        tokio::task::yield_now().await;

        counter.record();
        counter.record();
        counter.record();
        advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        counter.record();
        advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        assert_eq!(*sink.windows.lock(), vec![3, 1, 0]);

        let _ = shutdown_tx.send(true);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_shutdown_signal() {
        let counter = ThroughputCounter::new();
        let sink = Arc::new(CollectingSink::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_reporter(
            counter,
            Duration::from_secs(1),
            sink,
            shutdown_rx,
        ));
        tokio::task::yield_now().await;

        let _ = shutdown_tx.send(true);
        handle.await.unwrap();
    }
}
