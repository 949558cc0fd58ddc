//! Batch-relative sub-scores.
//!
//! `history` and `capital` are min-max scaled against the whole batch, so they can only be
//! computed once the full [`FeatureFrame`] exists. `repayment` and `liquidation` depend on
//! the record alone.

use serde::Serialize;

use crate::wallet_features::FeatureFrame;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScores {
    pub history: f64,
    pub repayment: f64,
    pub liquidation: f64,
    pub capital: f64,
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Scale a column to [0, 1] using its own min and max.
///
/// A zero-width column (single row, or all values equal) maps every value to 0.0.
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    if !(range.is_finite() && range > 0.0) {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| clamp01((v - min) / range)).collect()
}

pub fn repayment_score(repayment_ratio: f64) -> f64 {
    clamp01(repayment_ratio)
}

/// Any liquidation zeroes the score, regardless of how many.
pub fn liquidation_score(liquidation_count: u32) -> f64 {
    if liquidation_count > 0 {
        0.0
    } else {
        1.0
    }
}

/// Mean of the min-max scaled `log1p(age)` and `log1p(transaction_count)` columns.
pub fn history_scores(frame: &FeatureFrame) -> Vec<f64> {
    let age = min_max_scale(&frame.column(|r| (r.derived.wallet_age_days as f64).ln_1p()));
    let txns = min_max_scale(&frame.column(|r| f64::from(r.raw.transaction_count).ln_1p()));
    age.iter().zip(&txns).map(|(a, t)| (a + t) / 2.0).collect()
}

/// Inverted min-max scale of `capital_ratio_proxy`: the lowest ratio in the batch scores 1.0.
pub fn capital_scores(frame: &FeatureFrame) -> Vec<f64> {
    min_max_scale(&frame.column(|r| r.derived.capital_ratio_proxy))
        .into_iter()
        .map(|scaled| 1.0 - scaled)
        .collect()
}

/// Sub-scores for every record, in frame order.
pub fn normalize(frame: &FeatureFrame) -> Vec<SubScores> {
    let history = history_scores(frame);
    let capital = capital_scores(frame);

    frame
        .records()
        .iter()
        .zip(history.into_iter().zip(capital))
        .map(|(r, (history, capital))| SubScores {
            history,
            repayment: repayment_score(r.derived.repayment_ratio),
            liquidation: liquidation_score(r.raw.liquidation_count),
            capital,
        })
        .collect()
}
