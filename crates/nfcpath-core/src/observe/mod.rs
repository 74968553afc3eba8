//! # Observability
//!
//! Structured logging for nfcpath runs via `tracing`. Library code only emits
//! events; binaries call [`init_logging`] once at startup.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
