use std::time::Duration;

use engine::config::{PipelineConfig, default_max_concurrent};
use transport::kafka::KafkaSettings;

use crate::cli::{Cli, TransportKind};

/// Runtime configuration, assembled once at startup and passed by
/// reference into each component. CLI flags win; Kafka connectivity comes
/// from the environment so deployments can differ without new flags.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub transport: TransportKind,
    pub pipeline: PipelineConfig,
    pub kafka: KafkaSettings,

    // Generator settings
    pub symbols: Vec<String>,
    pub batch_size: usize,
    pub tick_interval: Duration,

    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        let pipeline = PipelineConfig {
            window_capacity: cli.window_capacity.max(1),
            spike_threshold_pct: cli.spike_threshold_pct,
            max_concurrent_detections: cli
                .max_concurrent_detections
                .unwrap_or_else(default_max_concurrent),
            report_interval_ms: cli.report_interval_ms.max(1),
            queue_capacity: cli.queue_capacity,
        };

        let kafka = KafkaSettings {
            bootstrap_servers: env_or("KAFKA_BOOTSTRAP", "localhost:9092"),
            topic: env_or("KAFKA_TOPIC", "price-updates"),
            group_id: env_or("KAFKA_GROUP_ID", "price-update-consumer"),
        };

        Self {
            transport: cli.transport,
            pipeline,
            kafka,
            symbols: cli.symbols.clone(),
            batch_size: cli.batch_size.max(1),
            tick_interval: Duration::from_micros(cli.tick_micros.max(1)),
            json_logs: cli.json_logs,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
