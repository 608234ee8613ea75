//! logfwd daemon library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `logfwd-daemon` is used as the `logfwd` binary (main.rs).

pub mod app;
pub mod cli;
pub mod logging;
pub mod metrics_server;
