//! Application wiring -- configuration loading and forwarder assembly.
//!
//! Keeps `main.rs` thin so the full load → build → run path can be
//! exercised from integration tests with an in-memory reader.

use anyhow::Result;
use tokio::io::AsyncBufRead;

use logfwd_core::config::LogfwdConfig;
use logfwd_forwarder::{
    Forwarder, ForwarderBuilder, ForwarderConfig, ForwarderStats, HttpTransport,
    HttpTransportConfig,
};

use crate::cli::DaemonCli;

/// Load the configuration file, apply environment and CLI overrides, then validate.
///
/// Priority: CLI flags > environment variables > config file > defaults.
pub async fn load_config(cli: &DaemonCli) -> Result<LogfwdConfig> {
    let mut config = LogfwdConfig::from_file(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;

    config.apply_env_overrides();
    apply_cli_overrides(&mut config, cli);

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    Ok(config)
}

/// Apply command-line overrides on top of an already loaded configuration.
///
/// `--verbose` without `--log-level` also lowers an `info`/`warn`/`error`
/// level to `debug` so the verbose diagnostics are visible.
pub fn apply_cli_overrides(config: &mut LogfwdConfig, cli: &DaemonCli) {
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format = format.clone();
    }
    if cli.verbose {
        config.forwarder.verbose = true;
        let quieter_than_debug = matches!(
            config.general.log_level.as_str(),
            "info" | "warn" | "error"
        );
        if cli.log_level.is_none() && quieter_than_debug {
            config.general.log_level = "debug".to_owned();
        }
    }
}

/// Build a forwarder reading from `reader` and posting through [`HttpTransport`].
pub fn build_forwarder<R>(config: &LogfwdConfig, reader: R) -> Result<Forwarder<R, HttpTransport>>
where
    R: AsyncBufRead + Unpin,
{
    let transport_config = HttpTransportConfig::from_core(&config.api);
    let transport = HttpTransport::new(&transport_config)
        .map_err(|e| anyhow::anyhow!("failed to create http transport: {}", e))?;

    tracing::info!(endpoint = %transport.endpoint(), "http transport initialized");

    ForwarderBuilder::new(reader, transport)
        .config(ForwarderConfig::from_core(&config.forwarder))
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build forwarder: {}", e))
}

/// Build the forwarder and run it until `reader` reaches end-of-stream.
pub async fn run<R>(config: &LogfwdConfig, reader: R) -> Result<ForwarderStats>
where
    R: AsyncBufRead + Unpin,
{
    let forwarder = build_forwarder(config, reader)?;
    forwarder
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("forwarder stopped with error: {}", e))
}
