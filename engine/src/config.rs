/// Immutable pipeline configuration.
///
/// Assembled once at startup and passed by reference into each component's
/// constructor; nothing reads configuration ambiently after that.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Number of recent observations retained per symbol.
    ///
    /// The history is bounded by entry count, not elapsed time, so this
    /// approximates a one-second window only at matching arrival rates.
    pub window_capacity: usize,

    /// Minimum absolute percentage change that qualifies as a spike.
    pub spike_threshold_pct: f64,

    /// Upper bound on concurrently executing detection units.
    ///
    /// Arrival bursts beyond this cap queue at the admission gate instead
    /// of growing the task set.
    pub max_concurrent_detections: usize,

    /// Wall-clock interval between throughput reports.
    pub report_interval_ms: u64,

    /// Ingestion queue bound.
    ///
    /// `None` keeps the queue unbounded: the producing side never blocks,
    /// at the cost of unbounded memory under sustained overload. `Some(n)`
    /// applies backpressure at `n` buffered updates instead.
    pub queue_capacity: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_capacity: 100,
            spike_threshold_pct: 2.0,
            max_concurrent_detections: default_max_concurrent(),
            report_interval_ms: 1_000,
            queue_capacity: None,
        }
    }
}

/// Default admission cap: a fixed multiple of the processing units the
/// runtime has available.
pub fn default_max_concurrent() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    cores * 100
}
