use std::path::Path;

use anyhow::Result;
use common::config::Config;

use crate::feature_source;
use crate::pipeline::{score_batch, BatchResult, ScoringParams};
use crate::report;
use crate::wallet_ids::load_wallet_ids;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Score the batch and write the output table.
    Run,
    /// Score the batch and print every intermediate value as JSON lines.
    Breakdown,
}

pub const USAGE: &str = "usage: scorer [run|breakdown]";

pub fn parse_args<I>(mut args: I) -> std::result::Result<Command, String>
where
    I: Iterator<Item = String>,
{
    // Drop argv[0].
    let _ = args.next();

    let Some(cmd) = args.next() else {
        return Ok(Command::Run);
    };

    let parsed = match cmd.as_str() {
        "run" => Command::Run,
        "breakdown" => Command::Breakdown,
        other => return Err(format!("unknown command: {other}\n{USAGE}")),
    };

    if let Some(extra) = args.next() {
        return Err(format!("unexpected argument: {extra}\n{USAGE}"));
    }
    Ok(parsed)
}

/// Everything up to (not including) writing output. Fails before any scoring on bad input.
pub fn score_from_config(config: &Config) -> Result<BatchResult> {
    let params = ScoringParams::from_config(&config.scoring)?;

    let ids = load_wallet_ids(Path::new(&config.input.path), &config.input.column)?;
    tracing::info!(
        path = %config.input.path,
        wallets = ids.ids.len(),
        duplicates = ids.duplicates,
        "wallet ids loaded"
    );

    let mut source = feature_source::from_config(&config.features)?;
    let batch = score_batch(&ids.ids, source.as_mut(), &params)?;

    let summary = &batch.summary;
    tracing::info!(
        source = source.name(),
        wallets = summary.wallets,
        liquidated = summary.liquidated,
        mean_score = summary.mean_score,
        min_score = summary.min_score,
        max_score = summary.max_score,
        "batch scored"
    );
    Ok(batch)
}

pub fn run_command(config: &Config, cmd: &Command) -> Result<()> {
    let batch = score_from_config(config)?;
    match cmd {
        Command::Run => report::write_scores(Path::new(&config.output.path), &batch.wallets)?,
        Command::Breakdown => {
            let stdout = std::io::stdout();
            report::render_breakdown(&batch.wallets, &mut stdout.lock())?;
        }
    }
    Ok(())
}
