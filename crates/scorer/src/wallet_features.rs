use chrono::{DateTime, Utc};
use serde::Serialize;

const SECS_PER_DAY: i64 = 86_400;

/// Raw behavioral metrics for one wallet, as delivered by a feature source.
///
/// Totals are accepted as-is; negative values are not rejected here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawMetrics {
    pub transaction_count: u32,
    pub deposit_total: f64,
    pub borrow_total: f64,
    pub repay_total: f64,
    pub redeem_total: f64,
    pub liquidation_count: u32,
    pub first_txn: DateTime<Utc>,
    pub last_txn: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// Inclusive day span between first and last transaction, never below 1.
    pub wallet_age_days: i64,
    /// Unclamped; may exceed 1.
    pub repayment_ratio: f64,
    /// Unclamped.
    pub capital_ratio_proxy: f64,
}

impl DerivedMetrics {
    /// First ratio that is NaN or infinite, e.g. when a negative `borrow_total` cancels epsilon.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        if !self.repayment_ratio.is_finite() {
            Some("repayment_ratio")
        } else if !self.capital_ratio_proxy.is_finite() {
            Some("capital_ratio_proxy")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalletRecord {
    pub wallet_id: String,
    pub raw: RawMetrics,
    pub derived: DerivedMetrics,
}

/// Whole-day difference, floored like a calendar day count (a partial day doesn't count).
fn day_span(first: DateTime<Utc>, last: DateTime<Utc>) -> i64 {
    (last - first).num_seconds().div_euclid(SECS_PER_DAY)
}

pub fn derive_metrics(raw: &RawMetrics, epsilon: f64) -> DerivedMetrics {
    // Reversed timestamps would otherwise give a zero or negative age and break log1p.
    let wallet_age_days = (day_span(raw.first_txn, raw.last_txn) + 1).max(1);
    let denom = raw.borrow_total + epsilon;

    DerivedMetrics {
        wallet_age_days,
        repayment_ratio: raw.repay_total / denom,
        capital_ratio_proxy: (raw.deposit_total + raw.redeem_total) / denom,
    }
}

/// One row per wallet, in input order. Built completely before any normalization runs.
#[derive(Debug, Clone, Default)]
pub struct FeatureFrame {
    records: Vec<WalletRecord>,
}

impl FeatureFrame {
    pub fn push(&mut self, wallet_id: String, raw: RawMetrics, epsilon: f64) {
        let derived = derive_metrics(&raw, epsilon);
        self.records.push(WalletRecord {
            wallet_id,
            raw,
            derived,
        });
    }

    pub fn records(&self) -> &[WalletRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<WalletRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(&WalletRecord) -> f64,
    {
        self.records.iter().map(f).collect()
    }
}
