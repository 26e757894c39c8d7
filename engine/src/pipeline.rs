//! Pipeline driver: the read → admit → dispatch loop.
//!
//! Design principles:
//! - **Bounded fan-out**: a semaphore caps concurrently executing
//!   detection units; the permit travels into the task so it is released
//!   on every exit path, including panics.
//! - **Isolation**: a failing detection unit is logged and counted, never
//!   propagated to the driver or to other units.
//! - **Structured drain**: every dispatched unit is tracked in a
//!   `JoinSet`; shutdown completes only after all of them have.

use std::sync::Arc;

use async_trait::async_trait;
use corelib::models::{PriceUpdate, SpikeAlert};
use tokio::sync::{Semaphore, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{Instrument, debug, error, info, info_span};

use crate::channel::PriceReceiver;
use crate::config::PipelineConfig;
use crate::detector::AlertSink;
use crate::error::PipelineError;
use crate::throughput::ThroughputCounter;

/// Unit of detection work the driver dispatches.
#[async_trait]
pub trait UpdateProcessor: Send + Sync + 'static {
    async fn process(&self, update: PriceUpdate) -> anyhow::Result<Option<SpikeAlert>>;
}

/// Driver lifecycle, published on a watch channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Draining,
    Stopped,
}

/// Totals for one pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Observations admitted into detection.
    pub admitted: u64,
    /// Detection units that failed or panicked.
    pub faulted: u64,
}

pub struct PipelineDriver<P> {
    processor: Arc<P>,
    alerts: Arc<dyn AlertSink>,
    counter: ThroughputCounter,
    permits: Arc<Semaphore>,
    state_tx: watch::Sender<PipelineState>,
}

impl<P: UpdateProcessor> PipelineDriver<P> {
    pub fn new(
        cfg: &PipelineConfig,
        processor: Arc<P>,
        alerts: Arc<dyn AlertSink>,
        counter: ThroughputCounter,
    ) -> Self {
        let (state_tx, _) = watch::channel(PipelineState::Idle);
        Self {
            processor,
            alerts,
            counter,
            permits: Arc::new(Semaphore::new(cfg.max_concurrent_detections.max(1))),
            state_tx,
        }
    }

    /// Observe state transitions (Idle → Running → Draining → Stopped).
    pub fn state(&self) -> watch::Receiver<PipelineState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: PipelineState) {
        debug!(state = ?state, "pipeline state");
        let _ = self.state_tx.send(state);
    }

    /// Run until the ingestion channel closes or `shutdown` flips.
    ///
    /// Channel close drains everything buffered; an explicit shutdown
    /// stops reading immediately and discards what is still buffered.
    /// Either way the driver waits for all in-flight detection units
    /// before reporting Stopped.
    pub async fn run(
        &self,
        mut rx: PriceReceiver,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<RunSummary, PipelineError> {
        self.set_state(PipelineState::Running);
        info!(
            max_concurrent = self.permits.available_permits(),
            "pipeline started"
        );

        let mut tasks: JoinSet<bool> = JoinSet::new();
        let mut summary = RunSummary::default();

        loop {
            // Opportunistic reap: the set stays bounded by in-flight work.
            while let Some(finished) = tasks.try_join_next() {
                summary.faulted += fault_count(finished);
            }

            let update = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("shutdown requested, discarding buffered updates");
                        break;
                    }
                    continue;
                }
                maybe = rx.recv() => match maybe {
                    Some(update) => update,
                    None => {
                        info!("ingestion channel closed");
                        break;
                    }
                },
            };

            let permit = self.permits.clone().acquire_owned().await?;

            self.counter.record();
            summary.admitted += 1;

            let processor = Arc::clone(&self.processor);
            let alerts = Arc::clone(&self.alerts);
            let span = info_span!("detection", symbol = %update.symbol);
            tasks.spawn(
                async move {
                    let _permit = permit;
                    let symbol = update.symbol.clone();
                    let at = update.timestamp;

                    match processor.process(update).await {
                        Ok(Some(alert)) => {
                            alerts.spike(&alert);
                            false
                        }
                        Ok(None) => false,
                        Err(e) => {
                            error!(symbol = %symbol, at = %at, error = ?e, "detection unit failed");
                            true
                        }
                    }
                }
                .instrument(span),
            );
        }

        self.set_state(PipelineState::Draining);
        info!(in_flight = tasks.len(), "pipeline draining");

        while let Some(finished) = tasks.join_next().await {
            summary.faulted += fault_count(finished);
        }

        self.set_state(PipelineState::Stopped);
        info!(
            admitted = summary.admitted,
            faulted = summary.faulted,
            "pipeline stopped"
        );
        Ok(summary)
    }
}

fn fault_count(finished: Result<bool, JoinError>) -> u64 {
    match finished {
        Ok(false) => 0,
        Ok(true) => 1,
        Err(e) if e.is_cancelled() => 0,
        Err(e) => {
            error!(error = ?e, "detection unit panicked");
            1
        }
    }
}
