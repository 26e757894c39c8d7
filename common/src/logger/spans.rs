use tracing::Span;

use super::RunId;

/// Root span for a pipeline run; every event inside the driver inherits
/// the run id.
pub fn run_span(run_id: &RunId) -> Span {
    tracing::info_span!("run", run_id = %run_id)
}
