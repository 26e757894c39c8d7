//! Spike detection.
//!
//! For each observation: append it to its symbol's history, evict beyond
//! capacity, pick the oldest entry at least one second older than the
//! observation, and compare the percentage change against the threshold.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use corelib::models::{PriceUpdate, SpikeAlert};

use crate::history::PriceHistory;
use crate::pipeline::UpdateProcessor;
use crate::store::SymbolStore;

/// Default lookback between an observation and its reference.
pub const DEFAULT_LOOKBACK_MS: i64 = 1_000;

/// Absolute percentage change of `current` against `reference`.
///
/// `reference` is non-zero by construction: updates are validated to carry
/// a strictly positive price before they reach the engine.
pub fn percent_change(current: f64, reference: f64) -> f64 {
    ((current - reference) / reference * 100.0).abs()
}

pub struct SpikeDetector<H> {
    store: Arc<SymbolStore<H>>,
    threshold_pct: f64,
    lookback: Duration,
}

impl<H: PriceHistory> SpikeDetector<H> {
    pub fn new(store: Arc<SymbolStore<H>>, threshold_pct: f64) -> Self {
        Self::with_lookback(store, threshold_pct, Duration::milliseconds(DEFAULT_LOOKBACK_MS))
    }

    pub fn with_lookback(store: Arc<SymbolStore<H>>, threshold_pct: f64, lookback: Duration) -> Self {
        Self {
            store,
            threshold_pct,
            lookback,
        }
    }

    /// Record `update` and evaluate it against its reference.
    ///
    /// Returns `None` when no entry is old enough to serve as a reference
    /// (history too short or too young) or the change stays at or below
    /// the threshold. Append, evict and reference scan run under the
    /// symbol's lock; the comparison happens on a clone outside it.
    pub fn detect(&self, update: &PriceUpdate) -> Option<SpikeAlert> {
        let cutoff = update.timestamp - self.lookback;

        let reference = self.store.with_history(&update.symbol, |history| {
            history.record(update.clone());
            history.reference_at_or_before(cutoff)
        })?;

        let change = percent_change(update.price, reference.price);
        if change > self.threshold_pct {
            Some(SpikeAlert {
                symbol: update.symbol.clone(),
                reference_price: reference.price,
                current_price: update.price,
                percent_change: change,
                timestamp: update.timestamp,
            })
        } else {
            None
        }
    }
}

#[async_trait]
impl<H: PriceHistory> UpdateProcessor for SpikeDetector<H> {
    async fn process(&self, update: PriceUpdate) -> anyhow::Result<Option<SpikeAlert>> {
        Ok(self.detect(&update))
    }
}

/// Receiver of spike alerts.
///
/// Called inline on the detection path; implementations must return
/// quickly and must not block.
pub trait AlertSink: Send + Sync + 'static {
    fn spike(&self, alert: &SpikeAlert);
}

/// Emits alerts as structured warnings.
#[derive(Debug, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn spike(&self, alert: &SpikeAlert) {
        tracing::warn!(
            symbol = %alert.symbol,
            reference_price = alert.reference_price,
            current_price = alert.current_price,
            percent_change = format_args!("{:.2}", alert.percent_change),
            at = %alert.timestamp.format("%H:%M:%S%.3f"),
            "spike detected"
        );
    }
}
