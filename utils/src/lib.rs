//! Shared utilities for the ballot ledger.

pub mod logging;

pub use logging::{init_logging, LogFormat};
