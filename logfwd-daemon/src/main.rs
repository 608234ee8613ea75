use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;

use logfwd_daemon::cli::DaemonCli;
use logfwd_daemon::{app, logging, metrics_server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let config = app::load_config(&cli).await?;

    if cli.validate {
        eprintln!("configuration is valid: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;

    tracing::info!(
        config = %cli.config.display(),
        url = %config.api.url,
        "logfwd starting"
    );

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let stats = app::run(&config, stdin).await?;

    tracing::info!(
        lines_read = stats.lines_read,
        entries_forwarded = stats.entries_forwarded,
        batches_flushed = stats.batches_flushed(),
        delivery_attempts = stats.delivery_attempts,
        "logfwd exiting"
    );
    Ok(())
}
