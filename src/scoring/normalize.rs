//! Signal normalization.
//!
//! Raw signals arrive at wildly different scales: play counts in the
//! millions, loyalty ratios under one, categorical momentum labels. Every
//! function here maps its input onto a bounded 0-100 score and is total:
//! missing or out-of-range inputs coerce to zero or a documented neutral
//! default, never to an error.

use crate::models::{CareerStage, Momentum};

/// Map a non-negative magnitude onto [0, 100] by log10 interpolation
/// between `floor` and `cap`.
///
/// Counts span three to five orders of magnitude, so a linear map would
/// flatten everything below the cap; log compression keeps differences at
/// the low end and the high end comparably salient. Values at or below the
/// floor score 0, values at or above the cap score 100.
pub fn log_score(value: f64, floor: f64, cap: f64) -> f64 {
    if value <= 0.0 || floor <= 0.0 || cap <= floor {
        return 0.0;
    }
    let value = value.min(cap);
    let span = cap.log10() - floor.log10();
    let score = 100.0 * (value.max(floor).log10() - floor.log10()) / span;
    score.clamp(0.0, 100.0)
}

/// Linear map onto [0, 100], saturating at `saturation`.
pub fn linear_score(value: f64, saturation: f64) -> f64 {
    if value <= 0.0 || saturation <= 0.0 {
        return 0.0;
    }
    (value / saturation * 100.0).clamp(0.0, 100.0)
}

/// Representative score for a momentum category. Missing or unknown labels
/// score the neutral 45.
pub fn momentum_category_score(momentum: Option<Momentum>) -> f64 {
    match momentum {
        Some(Momentum::Decline) => 15.0,
        Some(Momentum::GradualDecline) => 30.0,
        Some(Momentum::Steady) => 45.0,
        Some(Momentum::Growth) => 70.0,
        Some(Momentum::ExplosiveGrowth) => 95.0,
        None => 45.0,
    }
}

/// Ordinal career stage rank; unknown stages rank 0.
pub fn stage_rank(stage: Option<CareerStage>) -> u8 {
    stage.map(|s| s.rank()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: f64 = 10_000.0;
    const CAP: f64 = 10_000_000.0;

    #[test]
    fn test_log_score_zero_and_below() {
        assert_eq!(log_score(0.0, FLOOR, CAP), 0.0);
        assert_eq!(log_score(-5.0, FLOOR, CAP), 0.0);
    }

    #[test]
    fn test_log_score_floor_and_cap_boundaries() {
        assert_eq!(log_score(FLOOR, FLOOR, CAP), 0.0);
        assert_eq!(log_score(CAP, FLOOR, CAP), 100.0);
        // Beyond the cap clamps to 100, below the floor clamps to 0.
        assert_eq!(log_score(CAP * 10.0, FLOOR, CAP), 100.0);
        assert_eq!(log_score(FLOOR / 2.0, FLOOR, CAP), 0.0);
    }

    #[test]
    fn test_log_score_midpoint() {
        // Geometric midpoint of 10k..10M is ~316k and should score 50.
        let mid = (FLOOR * CAP).sqrt();
        assert!((log_score(mid, FLOOR, CAP) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_log_score_monotonic() {
        let mut prev = 0.0;
        for value in [1.0, 100.0, FLOOR, 50_000.0, 500_000.0, CAP, CAP * 2.0] {
            let score = log_score(value, FLOOR, CAP);
            assert!(
                score >= prev,
                "score decreased at value {}: {} < {}",
                value,
                score,
                prev
            );
            prev = score;
        }
    }

    #[test]
    fn test_log_score_degenerate_bounds() {
        assert_eq!(log_score(5_000.0, 0.0, CAP), 0.0);
        assert_eq!(log_score(5_000.0, CAP, FLOOR), 0.0);
    }

    #[test]
    fn test_linear_score_saturation() {
        assert_eq!(linear_score(0.20, 0.20), 100.0);
        assert_eq!(linear_score(0.50, 0.20), 100.0);
        assert!((linear_score(0.10, 0.20) - 50.0).abs() < 1e-9);
        assert_eq!(linear_score(0.0, 0.20), 0.0);
        assert_eq!(linear_score(-0.1, 0.20), 0.0);
    }

    #[test]
    fn test_momentum_category_table() {
        assert_eq!(momentum_category_score(Some(Momentum::Decline)), 15.0);
        assert_eq!(momentum_category_score(Some(Momentum::GradualDecline)), 30.0);
        assert_eq!(momentum_category_score(Some(Momentum::Steady)), 45.0);
        assert_eq!(momentum_category_score(Some(Momentum::Growth)), 70.0);
        assert_eq!(momentum_category_score(Some(Momentum::ExplosiveGrowth)), 95.0);
        // Missing label is neutral, not zero.
        assert_eq!(momentum_category_score(None), 45.0);
    }

    #[test]
    fn test_stage_rank_default() {
        assert_eq!(stage_rank(Some(CareerStage::Mainstream)), 3);
        assert_eq!(stage_rank(None), 0);
    }
}
