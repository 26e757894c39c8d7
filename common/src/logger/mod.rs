mod init;
mod run_id;
mod spans;

pub use init::init_logger;
pub use run_id::RunId;
pub use spans::run_span;
