use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    /// Generator feeds the pipeline through the in-process queue
    InMemory,
    /// Generator produces to Kafka; a consumer bridge feeds the pipeline
    Kafka,
}

#[derive(Debug, Parser)]
#[clap(name = "spikeline", version, about = "Real-time price spike detection")]
pub struct Cli {
    /// Transport carrying updates from the generator into the pipeline
    #[clap(long, value_enum, default_value = "in-memory")]
    pub transport: TransportKind,

    /// Recent observations retained per symbol
    #[clap(long, default_value = "100")]
    pub window_capacity: usize,

    /// Minimum absolute percentage change that qualifies as a spike
    #[clap(long, default_value = "2.0")]
    pub spike_threshold_pct: f64,

    /// Concurrent detection cap; defaults to available cores x 100
    #[clap(long)]
    pub max_concurrent_detections: Option<usize>,

    /// Milliseconds between throughput reports
    #[clap(long, default_value = "1000")]
    pub report_interval_ms: u64,

    /// Bound the ingestion queue (backpressure); unbounded when omitted
    #[clap(long)]
    pub queue_capacity: Option<usize>,

    /// Symbols the generator draws from
    #[clap(
        long,
        value_delimiter = ',',
        default_value = "fameli,vabemellat,shapna,folad,shsta"
    )]
    pub symbols: Vec<String>,

    /// Updates generated per tick
    #[clap(long, default_value = "10000")]
    pub batch_size: usize,

    /// Microseconds between generator ticks
    #[clap(long, default_value = "50")]
    pub tick_micros: u64,

    /// Emit JSON logs instead of pretty output
    #[clap(long)]
    pub json_logs: bool,
}
