use std::time::Instant;

use serde::Serialize;

use crate::error::{Result, ScoreError};
use crate::feature_source::FeatureSource;
use crate::normalization::{self, SubScores};
use crate::wallet_features::{derive_metrics, DerivedMetrics, FeatureFrame, RawMetrics};
use crate::wallet_scoring::{compute_final_score, RiskWeights};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    pub weights: RiskWeights,
    pub epsilon: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            epsilon: 1e-6,
        }
    }
}

impl ScoringParams {
    /// `epsilon` is range-checked by `Config::validate`; only the weight policy is checked here.
    pub fn from_config(cfg: &common::config::Scoring) -> Result<Self> {
        Ok(Self {
            weights: RiskWeights::from_config(cfg)?,
            epsilon: cfg.epsilon,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredWallet {
    pub wallet_id: String,
    pub raw: RawMetrics,
    pub derived: DerivedMetrics,
    pub sub_scores: SubScores,
    pub final_score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSummary {
    pub wallets: usize,
    pub liquidated: usize,
    pub mean_score: f64,
    pub min_score: u32,
    pub max_score: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// Input order.
    pub wallets: Vec<ScoredWallet>,
    pub summary: BatchSummary,
}

/// Phase 1: fetch and derive every wallet's metrics.
///
/// Any fetch failure, or a derived ratio that is not finite, aborts the batch.
pub fn build_frame(
    wallet_ids: &[String],
    source: &mut dyn FeatureSource,
    epsilon: f64,
) -> Result<FeatureFrame> {
    let mut frame = FeatureFrame::default();
    for id in wallet_ids {
        let raw = source.fetch(id)?;
        if let Some(field) = derive_metrics(&raw, epsilon).non_finite_field() {
            return Err(ScoreError::NonFiniteFeature {
                wallet_id: id.clone(),
                field,
            });
        }
        frame.push(id.clone(), raw, epsilon);
    }
    Ok(frame)
}

/// Phase 2: batch-relative normalization, then per-wallet aggregation.
pub fn score_frame(frame: FeatureFrame, weights: &RiskWeights) -> Vec<ScoredWallet> {
    let sub_scores = normalization::normalize(&frame);
    frame
        .into_records()
        .into_iter()
        .zip(sub_scores)
        .map(|(record, sub_scores)| ScoredWallet {
            final_score: compute_final_score(&sub_scores, weights),
            wallet_id: record.wallet_id,
            raw: record.raw,
            derived: record.derived,
            sub_scores,
        })
        .collect()
}

pub fn summarize(wallets: &[ScoredWallet]) -> BatchSummary {
    let liquidated = wallets
        .iter()
        .filter(|w| w.raw.liquidation_count > 0)
        .count();
    let mean_score = if wallets.is_empty() {
        0.0
    } else {
        wallets.iter().map(|w| f64::from(w.final_score)).sum::<f64>() / wallets.len() as f64
    };

    BatchSummary {
        wallets: wallets.len(),
        liquidated,
        mean_score,
        min_score: wallets.iter().map(|w| w.final_score).min().unwrap_or(0),
        max_score: wallets.iter().map(|w| w.final_score).max().unwrap_or(0),
    }
}

pub fn score_batch(
    wallet_ids: &[String],
    source: &mut dyn FeatureSource,
    params: &ScoringParams,
) -> Result<BatchResult> {
    let started = Instant::now();

    let frame = build_frame(wallet_ids, source, params.epsilon)?;
    tracing::debug!(
        source = source.name(),
        wallets = frame.len(),
        "feature frame built"
    );
    if frame.is_empty() {
        tracing::warn!("empty wallet batch; nothing to normalize");
    } else if frame.len() == 1 {
        tracing::warn!("single-wallet batch; history and capital scores use zero-width scaling");
    }

    let wallets = score_frame(frame, &params.weights);
    let summary = summarize(&wallets);

    for w in &wallets {
        metrics::histogram!("scorer_final_score").record(f64::from(w.final_score));
    }
    metrics::counter!("scorer_wallets_scored_total").increment(summary.wallets as u64);
    metrics::counter!("scorer_liquidated_wallets_total").increment(summary.liquidated as u64);
    metrics::histogram!("scorer_batch_duration_ms")
        .record(started.elapsed().as_secs_f64() * 1000.0);

    Ok(BatchResult { wallets, summary })
}
