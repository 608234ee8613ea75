//! CLI argument definitions for the `logfwd` binary.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/logfwd/logfwd.toml";

/// Log forwarding agent.
///
/// Reads newline-delimited JSON log records from stdin, batches them,
/// and delivers each batch to the configured log API.
#[derive(Parser, Debug)]
#[command(name = "logfwd")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to logfwd.toml configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log every received line and idle poll.
    #[arg(short, long)]
    pub verbose: bool,

    /// Validate configuration file and exit without reading input.
    #[arg(long)]
    pub validate: bool,
}
