use std::path::Path;

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub fn describe() {
    describe_counter!(
        "scorer_wallets_loaded_total",
        "Unique wallet ids read from the input table."
    );
    describe_counter!(
        "scorer_duplicate_wallets_total",
        "Input rows dropped because their id repeated after case folding."
    );
    describe_counter!("scorer_wallets_scored_total", "Wallets given a final score.");
    describe_counter!(
        "scorer_liquidated_wallets_total",
        "Scored wallets with at least one liquidation."
    );
    describe_histogram!("scorer_final_score", "Final risk score (0-1000).");
    describe_histogram!(
        "scorer_batch_duration_ms",
        "Wall time of one scoring batch in milliseconds."
    );
}

/// Install the global recorder without an HTTP listener; the run is a one-shot batch.
pub fn install_prometheus() -> Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Write the current exposition for a node-exporter textfile collector.
pub fn write_textfile(handle: &PrometheusHandle, path: &Path) -> Result<()> {
    std::fs::write(path, handle.render())
        .with_context(|| format!("writing metrics textfile {}", path.display()))
}
