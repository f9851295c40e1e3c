//! Observability: log subscriber setup for the command line.

pub mod logging;

pub use logging::{LogFormat, init_logging};
