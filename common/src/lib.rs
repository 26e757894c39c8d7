pub mod logger;

pub use logger::{RunId, init_logger};
