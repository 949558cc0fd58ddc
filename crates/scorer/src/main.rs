use anyhow::Result;
use std::path::Path;

mod cli;
mod error;
mod feature_source;
mod metrics;
mod normalization;
mod pipeline;
mod report;
mod table;
mod wallet_features;
mod wallet_ids;
mod wallet_scoring;

fn main() -> Result<()> {
    let config = common::config::Config::load()?;

    let dispatch = common::observability::build_dispatch("scorer", &config.general.log_level);
    tracing::dispatcher::set_global_default(dispatch).map_err(anyhow::Error::msg)?;

    let cmd = cli::parse_args(std::env::args()).map_err(anyhow::Error::msg)?;

    let prometheus = metrics::install_prometheus()?;
    metrics::describe();

    tracing::info!(command = ?cmd, "wallet risk scorer starting");

    if let Err(e) = cli::run_command(&config, &cmd) {
        tracing::error!(error = %e, "batch aborted; no output written");
        return Err(e);
    }

    if let Some(path) = &config.observability.metrics_textfile {
        metrics::write_textfile(&prometheus, Path::new(path))?;
    }

    Ok(())
}
