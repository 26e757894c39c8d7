use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The admission semaphore was closed; no further detection work can
    /// be admitted. Fatal for the run.
    #[error("admission limiter closed: {0}")]
    AdmissionClosed(#[from] tokio::sync::AcquireError),
}
