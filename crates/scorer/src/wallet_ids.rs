use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, ScoreError};
use crate::table::Table;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletIds {
    /// Lowercased ids, first occurrence order.
    pub ids: Vec<String>,
    /// Rows dropped because their id was already seen after case folding.
    pub duplicates: usize,
}

pub fn normalize_wallet_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn load_wallet_ids(path: &Path, column: &str) -> Result<WalletIds> {
    let table = Table::read(path)?;
    wallet_ids_from_table(&table, column)
}

pub fn wallet_ids_from_table(table: &Table, column: &str) -> Result<WalletIds> {
    let idx = table.column_index(column)?;

    let mut seen = HashSet::with_capacity(table.rows.len());
    let mut out = WalletIds::default();
    for (line, cells) in &table.rows {
        let id = cells.get(idx).map(|c| normalize_wallet_id(c)).unwrap_or_default();
        if id.is_empty() {
            return Err(ScoreError::MalformedIdentifier {
                path: table.path.clone(),
                line: *line,
            });
        }
        if seen.insert(id.clone()) {
            out.ids.push(id);
        } else {
            tracing::warn!(wallet_id = %id, line, "duplicate wallet id dropped");
            out.duplicates += 1;
        }
    }

    metrics::counter!("scorer_wallets_loaded_total").increment(out.ids.len() as u64);
    metrics::counter!("scorer_duplicate_wallets_total").increment(out.duplicates as u64);

    Ok(out)
}
