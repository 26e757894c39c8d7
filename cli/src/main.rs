mod cli;
mod config;
mod simulator;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{Instrument, info};

use common::logger::{RunId, init_logger, run_span};
use engine::channel::{PriceSender, price_queue};
use engine::detector::{LogAlertSink, SpikeDetector};
use engine::history::CountBoundedHistory;
use engine::pipeline::PipelineDriver;
use engine::store::SymbolStore;
use engine::throughput::{LogThroughputSink, ThroughputCounter, run_reporter};
use transport::kafka;
use transport::{in_memory::InMemorySink, sink::PriceSink};

use crate::cli::{Cli, TransportKind};
use crate::config::AppConfig;
use crate::simulator::Simulator;

/// Number of partitions for a freshly provisioned price topic.
const TOPIC_PARTITIONS: i32 = 12;
const TOPIC_REPLICATION: i32 = 1;

/// Build the generator-facing sink for the selected transport.
///
/// The pipeline always reads from the in-process queue. In-memory mode
/// wires the generator straight to it; Kafka mode provisions the topic,
/// feeds the queue through a consumer bridge, and hands the generator a
/// producer.
async fn setup_transport(
    cfg: &AppConfig,
    ingest_tx: PriceSender,
    shutdown_rx: watch::Receiver<bool>,
) -> anyhow::Result<Arc<dyn PriceSink>> {
    match cfg.transport {
        TransportKind::InMemory => Ok(Arc::new(InMemorySink::new(ingest_tx))),
        TransportKind::Kafka => {
            kafka::admin::ensure_topic(&cfg.kafka, TOPIC_PARTITIONS, TOPIC_REPLICATION)
                .await
                .context("topic provisioning failed")?;

            let consumer = kafka::consumer::price_consumer(&cfg.kafka)
                .context("failed to create kafka consumer")?;
            tokio::spawn(kafka::consumer::run_consumer_bridge(
                consumer,
                ingest_tx,
                shutdown_rx,
            ));

            let sink =
                kafka::producer::KafkaSink::new(&cfg.kafka).context("failed to create kafka producer")?;
            Ok(Arc::new(sink))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_cli(&cli);

    init_logger("spikeline", cfg.json_logs);

    let run_id = RunId::new();
    info!(
        run_id = %run_id,
        transport = ?cfg.transport,
        window_capacity = cfg.pipeline.window_capacity,
        spike_threshold_pct = cfg.pipeline.spike_threshold_pct,
        max_concurrent = cfg.pipeline.max_concurrent_detections,
        "starting spikeline"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (ingest_tx, ingest_rx) = price_queue(cfg.pipeline.queue_capacity);

    let sink = setup_transport(&cfg, ingest_tx, shutdown_rx.clone()).await?;

    let counter = ThroughputCounter::new();
    tokio::spawn(run_reporter(
        counter.clone(),
        Duration::from_millis(cfg.pipeline.report_interval_ms),
        Arc::new(LogThroughputSink),
        shutdown_rx.clone(),
    ));

    let store = {
        let capacity = cfg.pipeline.window_capacity;
        Arc::new(SymbolStore::new(move || CountBoundedHistory::new(capacity)))
    };
    let detector = Arc::new(SpikeDetector::new(store, cfg.pipeline.spike_threshold_pct));

    let driver = PipelineDriver::new(&cfg.pipeline, detector, Arc::new(LogAlertSink), counter);
    let pipeline = {
        let shutdown_rx = shutdown_rx.clone();
        let span = run_span(&run_id);
        tokio::spawn(async move { driver.run(ingest_rx, shutdown_rx).await }.instrument(span))
    };

    let generator = {
        let simulator = Simulator::new(cfg.symbols.clone(), cfg.batch_size, cfg.tick_interval);
        let shutdown_rx = shutdown_rx.clone();
        tokio::spawn(async move { simulator.run(sink, shutdown_rx).await })
    };

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);

    let _ = generator.await;
    let summary = pipeline
        .await
        .context("pipeline task panicked")?
        .context("pipeline failed")?;

    info!(
        admitted = summary.admitted,
        faulted = summary.faulted,
        "run complete"
    );
    Ok(())
}
