use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use common::config::{FeatureSourceKind, Features};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, ScoreError};
use crate::table::Table;
use crate::wallet_features::RawMetrics;
use crate::wallet_ids::normalize_wallet_id;

/// Supplies raw metrics for a wallet. Scoring never looks past this trait.
pub trait FeatureSource {
    fn name(&self) -> &'static str;
    fn fetch(&mut self, wallet_id: &str) -> Result<RawMetrics>;
}

pub fn from_config(cfg: &Features) -> Result<Box<dyn FeatureSource>> {
    match cfg.source {
        FeatureSourceKind::Simulated => Ok(Box::new(SimulatedFeatureSource::new(cfg.seed))),
        FeatureSourceKind::Table => {
            // Config::validate guarantees the path for table sources.
            let path = cfg.path.as_deref().unwrap_or_default();
            Ok(Box::new(TableFeatureSource::load(Path::new(path))?))
        }
    }
}

/// 2021-01-01, in days since the unix epoch.
const FIRST_TXN_BASE_DAY: i64 = 18_628;
/// 2024-01-01, in days since the unix epoch.
const LAST_TXN_BASE_DAY: i64 = 19_723;

/// Placeholder metrics drawn from a seeded RNG.
///
/// Draws happen in wallet order, so the same seed and id list reproduce the same batch.
pub struct SimulatedFeatureSource {
    rng: StdRng,
    first_txn_base: DateTime<Utc>,
    last_txn_base: DateTime<Utc>,
}

impl SimulatedFeatureSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            first_txn_base: DateTime::<Utc>::UNIX_EPOCH + Duration::days(FIRST_TXN_BASE_DAY),
            last_txn_base: DateTime::<Utc>::UNIX_EPOCH + Duration::days(LAST_TXN_BASE_DAY),
        }
    }
}

impl FeatureSource for SimulatedFeatureSource {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn fetch(&mut self, _wallet_id: &str) -> Result<RawMetrics> {
        let rng = &mut self.rng;
        Ok(RawMetrics {
            transaction_count: rng.gen_range(10..200),
            deposit_total: rng.gen_range(500.0..10_000.0),
            borrow_total: rng.gen_range(100.0..5_000.0),
            repay_total: rng.gen_range(100.0..5_000.0),
            redeem_total: rng.gen_range(100.0..3_000.0),
            liquidation_count: rng.gen_range(0..3),
            first_txn: self.first_txn_base + Duration::days(rng.gen_range(0..300)),
            last_txn: self.last_txn_base + Duration::days(rng.gen_range(0..300)),
        })
    }
}

const FEATURE_COLUMNS: [&str; 9] = [
    "wallet_id",
    "transaction_count",
    "deposit_total",
    "borrow_total",
    "repay_total",
    "redeem_total",
    "liquidation_count",
    "first_txn",
    "last_txn",
];

/// Metrics read from a feature table keyed by (lowercased) wallet id.
#[derive(Debug)]
pub struct TableFeatureSource {
    rows: HashMap<String, RawMetrics>,
}

impl TableFeatureSource {
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_table(&Table::read(path)?)
    }

    pub fn from_table(table: &Table) -> Result<Self> {
        let mut idx = [0usize; FEATURE_COLUMNS.len()];
        for (slot, name) in idx.iter_mut().zip(FEATURE_COLUMNS) {
            *slot = table.column_index(name)?;
        }

        let mut rows = HashMap::with_capacity(table.rows.len());
        for (line, cells) in &table.rows {
            let row = RowParser {
                table,
                line: *line,
                cells,
                idx: &idx,
            };
            let wallet_id = normalize_wallet_id(row.cell(0)?);
            if wallet_id.is_empty() {
                return Err(row.malformed("empty wallet_id".to_string()));
            }
            let metrics = RawMetrics {
                transaction_count: row.count(1)?,
                deposit_total: row.total(2)?,
                borrow_total: row.total(3)?,
                repay_total: row.total(4)?,
                redeem_total: row.total(5)?,
                liquidation_count: row.count(6)?,
                first_txn: row.timestamp(7)?,
                last_txn: row.timestamp(8)?,
            };
            if rows.insert(wallet_id.clone(), metrics).is_some() {
                return Err(row.malformed(format!("duplicate feature row for {wallet_id}")));
            }
        }

        tracing::debug!(path = %table.path.display(), wallets = rows.len(), "feature table loaded");
        Ok(Self { rows })
    }
}

impl FeatureSource for TableFeatureSource {
    fn name(&self) -> &'static str {
        "table"
    }

    fn fetch(&mut self, wallet_id: &str) -> Result<RawMetrics> {
        self.rows
            .get(wallet_id)
            .cloned()
            .ok_or_else(|| ScoreError::MissingFeatures {
                wallet_id: wallet_id.to_string(),
            })
    }
}

struct RowParser<'a> {
    table: &'a Table,
    line: usize,
    cells: &'a [String],
    idx: &'a [usize; FEATURE_COLUMNS.len()],
}

impl RowParser<'_> {
    fn malformed(&self, reason: String) -> ScoreError {
        ScoreError::MalformedFeatureRow {
            path: self.table.path.clone(),
            line: self.line,
            reason,
        }
    }

    fn cell(&self, field: usize) -> Result<&str> {
        self.cells
            .get(self.idx[field])
            .map(String::as_str)
            .ok_or_else(|| self.malformed(format!("missing {}", FEATURE_COLUMNS[field])))
    }

    fn count(&self, field: usize) -> Result<u32> {
        let raw = self.cell(field)?;
        raw.parse().map_err(|e| {
            self.malformed(format!(
                "{}: `{raw}` is not a non-negative integer ({e})",
                FEATURE_COLUMNS[field]
            ))
        })
    }

    fn total(&self, field: usize) -> Result<f64> {
        let raw = self.cell(field)?;
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(self.malformed(format!(
                "{}: `{raw}` is not a finite number",
                FEATURE_COLUMNS[field]
            ))),
        }
    }

    fn timestamp(&self, field: usize) -> Result<DateTime<Utc>> {
        let raw = self.cell(field)?;
        parse_timestamp(raw).ok_or_else(|| {
            self.malformed(format!(
                "{}: `{raw}` is neither RFC 3339 nor YYYY-MM-DD",
                FEATURE_COLUMNS[field]
            ))
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
