use crate::error::{Result, ScoreError};
use crate::normalization::SubScores;

pub const MAX_SCORE: u32 = 1000;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskWeights {
    pub history: f64,
    pub repayment: f64,
    pub liquidation: f64,
    pub capital: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            history: 0.15,
            repayment: 0.35,
            liquidation: 0.40,
            capital: 0.10,
        }
    }
}

impl RiskWeights {
    pub fn from_config(cfg: &common::config::Scoring) -> Result<Self> {
        let w = Self {
            history: cfg.history_weight,
            repayment: cfg.repayment_weight,
            liquidation: cfg.liquidation_weight,
            capital: cfg.capital_weight,
        };
        w.validate()?;
        Ok(w)
    }

    pub fn total(&self) -> f64 {
        self.history + self.repayment + self.liquidation + self.capital
    }

    /// Weights must be non-negative and sum to 1 so the final score stays within [0, 1000].
    pub fn validate(&self) -> Result<()> {
        let all = [self.history, self.repayment, self.liquidation, self.capital];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ScoreError::InvalidWeights(format!(
                "all weights must be finite and non-negative, got {self:?}"
            )));
        }
        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoreError::InvalidWeights(format!(
                "weights must sum to 1.0, got {total}"
            )));
        }
        Ok(())
    }
}

pub fn compute_raw_score(s: &SubScores, w: &RiskWeights) -> f64 {
    s.history * w.history
        + s.repayment * w.repayment
        + s.liquidation * w.liquidation
        + s.capital * w.capital
}

/// Scale to [0, 1000], truncating toward zero.
pub fn compute_final_score(s: &SubScores, w: &RiskWeights) -> u32 {
    let scaled = (compute_raw_score(s, w) * f64::from(MAX_SCORE)).floor();
    scaled.clamp(0.0, f64::from(MAX_SCORE)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(history: f64, repayment: f64, liquidation: f64, capital: f64) -> SubScores {
        SubScores {
            history,
            repayment,
            liquidation,
            capital,
        }
    }

    #[test]
    fn test_default_weights_are_valid() {
        let w = RiskWeights::default();
        w.validate().unwrap();
        assert!((w.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_and_worst_wallets_hit_the_bounds() {
        let w = RiskWeights::default();
        assert_eq!(compute_final_score(&subs(1.0, 1.0, 1.0, 1.0), &w), 1000);
        assert_eq!(compute_final_score(&subs(0.0, 0.0, 0.0, 0.0), &w), 0);
    }

    #[test]
    fn test_score_truncates_instead_of_rounding() {
        let w = RiskWeights::default();
        // 0.15 * 0.6666 = 0.09999 -> 99.99 -> 99
        assert_eq!(compute_final_score(&subs(0.6666, 0.0, 0.0, 0.0), &w), 99);
    }

    #[test]
    fn test_liquidation_dominates() {
        let w = RiskWeights::default();
        let clean = compute_final_score(&subs(0.5, 0.5, 1.0, 0.5), &w);
        let liquidated = compute_final_score(&subs(0.5, 0.5, 0.0, 0.5), &w);
        assert_eq!(clean - liquidated, 400);
    }

    #[test]
    fn test_validate_rejects_bad_sum() {
        let w = RiskWeights {
            capital: 0.2,
            ..RiskWeights::default()
        };
        assert!(matches!(w.validate(), Err(ScoreError::InvalidWeights(_))));
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let w = RiskWeights {
            history: -0.05,
            capital: 0.30,
            ..RiskWeights::default()
        };
        assert!(matches!(w.validate(), Err(ScoreError::InvalidWeights(_))));
    }

    #[test]
    fn test_from_config_reads_all_four_weights() {
        let cfg = common::config::Scoring {
            epsilon: 1e-6,
            history_weight: 0.25,
            repayment_weight: 0.25,
            liquidation_weight: 0.25,
            capital_weight: 0.25,
        };
        let w = RiskWeights::from_config(&cfg).unwrap();
        assert!((w.capital - 0.25).abs() < 1e-12);
        assert_eq!(compute_final_score(&subs(1.0, 0.0, 1.0, 0.0), &w), 500);
    }
}
