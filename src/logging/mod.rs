//! Ambient diagnostics
//!
//! The recorder reports successes at `debug` and failures at `error`
//! through `tracing`. Hosts with their own subscriber need nothing from
//! here; others can initialize the file-backed one.

pub mod file_logger;

pub use file_logger::{get_log_directory, init_file_logging};
