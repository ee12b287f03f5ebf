//! Opportunity scoring.
//!
//! Composes the normalized signals into three sub-scores and one overall
//! 0-100 Opportunity Score:
//!
//! - Demand: how much engagement the remix already has.
//! - Conversion: how DSP-ready the pairing is (established original,
//!   emerging remixer with loyal audience, market crossover).
//! - Momentum: where the remixer's trajectory is heading.
//!
//! Every weight, floor and cap lives in [`ScoringSettings`]; the defaults
//! are the calibrated values, not derived ones, and are expected to be
//! re-tuned as cleared-remix outcomes accumulate.

use serde::{Deserialize, Serialize};

use crate::models::{ArtistProfile, CareerStage, EngagementMetrics, OpportunityLabel, OpportunityScore};
use crate::scoring::normalize::{linear_score, log_score, momentum_category_score, stage_rank};

/// Tunable scoring constants. Defaults carry the calibrated model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    // Demand
    pub plays_floor: f64,
    pub plays_cap: f64,
    pub velocity_floor: f64,
    pub velocity_cap: f64,
    /// Like-to-play rate treated as exceptional (scores 100).
    pub engagement_saturation: f64,
    pub demand_plays_weight: f64,
    pub demand_engagement_weight: f64,
    pub demand_velocity_weight: f64,
    pub comments_bonus_threshold: u64,
    pub reposts_bonus_threshold: u64,
    pub activity_bonus: f64,

    // Conversion
    pub original_listeners_floor: f64,
    pub original_listeners_cap: f64,
    pub remix_listeners_floor: f64,
    pub remix_listeners_cap: f64,
    pub tiktok_floor: f64,
    pub tiktok_cap: f64,
    /// Follower-to-listener ratio treated as excellent loyalty (scores 100).
    pub ratio_saturation: f64,
    pub conversion_original_weight: f64,
    pub conversion_remix_weight: f64,
    pub conversion_loyalty_weight: f64,
    pub conversion_geo_weight: f64,
    pub conversion_tiktok_weight: f64,

    // Momentum
    pub momentum_category_weight: f64,
    pub momentum_raw_weight: f64,
    pub stage_gap_wide_bonus: f64,
    pub stage_gap_mid_bonus: f64,
    pub stage_gap_small_bonus: f64,
    /// Penalty for a mid-level remixer that is no longer growing.
    pub stalled_midlevel_penalty: f64,

    // Overall
    pub overall_demand_weight: f64,
    pub overall_conversion_weight: f64,
    pub overall_momentum_weight: f64,

    /// Cities per profile considered for geo divergence.
    pub geo_top_cities: usize,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            plays_floor: 10_000.0,
            plays_cap: 10_000_000.0,
            velocity_floor: 50.0,
            velocity_cap: 50_000.0,
            engagement_saturation: 0.03,
            demand_plays_weight: 0.40,
            demand_engagement_weight: 0.30,
            demand_velocity_weight: 0.30,
            comments_bonus_threshold: 100,
            reposts_bonus_threshold: 50,
            activity_bonus: 5.0,

            original_listeners_floor: 10_000.0,
            original_listeners_cap: 100_000_000.0,
            remix_listeners_floor: 1_000.0,
            remix_listeners_cap: 10_000_000.0,
            tiktok_floor: 1_000.0,
            tiktok_cap: 10_000_000.0,
            ratio_saturation: 0.20,
            conversion_original_weight: 0.30,
            conversion_remix_weight: 0.25,
            conversion_loyalty_weight: 0.15,
            conversion_geo_weight: 0.15,
            conversion_tiktok_weight: 0.15,

            momentum_category_weight: 0.6,
            momentum_raw_weight: 0.4,
            stage_gap_wide_bonus: 20.0,
            stage_gap_mid_bonus: 10.0,
            stage_gap_small_bonus: 5.0,
            stalled_midlevel_penalty: 15.0,

            overall_demand_weight: 0.40,
            overall_conversion_weight: 0.35,
            overall_momentum_weight: 0.25,

            geo_top_cities: 10,
        }
    }
}

/// Inputs to one scoring pass. Either artist profile may be absent; the
/// affected signals score zero rather than erroring.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a> {
    pub metrics: &'a EngagementMetrics,
    pub original: Option<&'a ArtistProfile>,
    pub remix: Option<&'a ArtistProfile>,
    pub geo_divergence: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Demand sub-score: current engagement on the remix itself.
pub fn demand_score(metrics: &EngagementMetrics, settings: &ScoringSettings) -> f64 {
    let mut score = settings.demand_plays_weight
        * log_score(metrics.plays as f64, settings.plays_floor, settings.plays_cap)
        + settings.demand_engagement_weight
            * linear_score(metrics.engagement_rate, settings.engagement_saturation)
        + settings.demand_velocity_weight
            * log_score(
                metrics.daily_velocity as f64,
                settings.velocity_floor,
                settings.velocity_cap,
            );

    if metrics.comments > settings.comments_bonus_threshold {
        score += settings.activity_bonus;
    }
    if metrics.reposts > settings.reposts_bonus_threshold {
        score += settings.activity_bonus;
    }

    score.clamp(0.0, 100.0)
}

/// Conversion sub-score: DSP-readiness of the original/remixer pairing plus
/// market-crossover upside.
pub fn conversion_score(
    original: Option<&ArtistProfile>,
    remix: Option<&ArtistProfile>,
    geo_divergence: f64,
    settings: &ScoringSettings,
) -> f64 {
    let original_listeners = original.and_then(|a| a.monthly_listeners).unwrap_or(0);
    let remix_listeners = remix.and_then(|a| a.monthly_listeners).unwrap_or(0);
    let loyalty_ratio = remix
        .and_then(|a| a.follower_to_listener_ratio())
        .unwrap_or(0.0);
    let tiktok_followers = remix.and_then(|a| a.tiktok_followers).unwrap_or(0);

    let score = settings.conversion_original_weight
        * log_score(
            original_listeners as f64,
            settings.original_listeners_floor,
            settings.original_listeners_cap,
        )
        + settings.conversion_remix_weight
            * log_score(
                remix_listeners as f64,
                settings.remix_listeners_floor,
                settings.remix_listeners_cap,
            )
        + settings.conversion_loyalty_weight * linear_score(loyalty_ratio, settings.ratio_saturation)
        + settings.conversion_geo_weight * (geo_divergence.clamp(0.0, 1.0) * 100.0)
        + settings.conversion_tiktok_weight
            * log_score(
                tiktok_followers as f64,
                settings.tiktok_floor,
                settings.tiktok_cap,
            );

    score.clamp(0.0, 100.0)
}

/// Momentum sub-score: remixer trajectory, with a bonus when the original
/// artist is far more established than the remixer (large headroom) and a
/// penalty for mid-level remixers that have stopped growing (no further
/// upside to license into).
pub fn momentum_score(
    original: Option<&ArtistProfile>,
    remix: Option<&ArtistProfile>,
    settings: &ScoringSettings,
) -> f64 {
    let career = remix.and_then(|a| a.career.as_ref());
    let momentum = career.and_then(|c| c.momentum);
    let raw = career
        .and_then(|c| c.momentum_score)
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);

    let mut score = settings.momentum_category_weight * momentum_category_score(momentum)
        + settings.momentum_raw_weight * raw;

    let original_rank = stage_rank(original.and_then(|a| a.career.as_ref()).and_then(|c| c.stage));
    let remix_stage = career.and_then(|c| c.stage);
    let gap = original_rank as i32 - stage_rank(remix_stage) as i32;
    score += if gap >= 3 {
        settings.stage_gap_wide_bonus
    } else if gap == 2 {
        settings.stage_gap_mid_bonus
    } else if gap == 1 {
        settings.stage_gap_small_bonus
    } else {
        0.0
    };

    let stalled =
        remix_stage == Some(CareerStage::MidLevel) && momentum.is_some_and(|m| !m.is_growing());
    if stalled {
        score -= settings.stalled_midlevel_penalty;
    }

    score.clamp(0.0, 100.0)
}

/// Compute all sub-scores and the overall Opportunity Score.
pub fn score_opportunity(inputs: &ScoreInputs, settings: &ScoringSettings) -> OpportunityScore {
    let demand = demand_score(inputs.metrics, settings);
    let conversion = conversion_score(inputs.original, inputs.remix, inputs.geo_divergence, settings);
    let momentum = momentum_score(inputs.original, inputs.remix, settings);

    let overall = (settings.overall_demand_weight * demand
        + settings.overall_conversion_weight * conversion
        + settings.overall_momentum_weight * momentum)
        .clamp(0.0, 100.0);
    let overall = round1(overall);

    OpportunityScore {
        overall,
        label: OpportunityLabel::from_overall(overall),
        demand: round1(demand),
        conversion: round1(conversion),
        momentum: round1(momentum),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CareerProfile, Momentum};

    fn make_metrics(plays: u64, likes: u64, velocity: u64) -> EngagementMetrics {
        EngagementMetrics {
            plays,
            likes,
            engagement_rate: if plays > 0 { likes as f64 / plays as f64 } else { 0.0 },
            daily_velocity: velocity,
            days_live: 30,
            ..Default::default()
        }
    }

    fn make_artist(
        listeners: u64,
        followers: u64,
        tiktok: u64,
        stage: Option<CareerStage>,
        momentum: Option<Momentum>,
    ) -> ArtistProfile {
        ArtistProfile {
            cm_id: 1,
            name: "Artist".to_string(),
            monthly_listeners: Some(listeners),
            followers: Some(followers),
            tiktok_followers: Some(tiktok),
            career: Some(CareerProfile {
                stage,
                momentum,
                momentum_score: Some(50.0),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_demand_zero_plays_is_zero() {
        let settings = ScoringSettings::default();
        let metrics = make_metrics(0, 0, 0);
        assert_eq!(demand_score(&metrics, &settings), 0.0);
    }

    #[test]
    fn test_demand_saturates_at_100() {
        let settings = ScoringSettings::default();
        let mut metrics = make_metrics(100_000_000, 10_000_000, 1_000_000);
        metrics.comments = 500;
        metrics.reposts = 500;
        assert_eq!(demand_score(&metrics, &settings), 100.0);
    }

    #[test]
    fn test_demand_activity_bonuses() {
        let settings = ScoringSettings::default();
        let mut metrics = make_metrics(100_000, 1_000, 500);
        let base = demand_score(&metrics, &settings);
        metrics.comments = 150;
        metrics.reposts = 80;
        let boosted = demand_score(&metrics, &settings);
        assert!((boosted - base - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_conversion_missing_profiles_scores_geo_only() {
        let settings = ScoringSettings::default();
        let score = conversion_score(None, None, 1.0, &settings);
        assert!((score - settings.conversion_geo_weight * 100.0).abs() < 1e-9);
        assert_eq!(conversion_score(None, None, 0.0, &settings), 0.0);
    }

    #[test]
    fn test_conversion_rewards_established_original() {
        let settings = ScoringSettings::default();
        let big = make_artist(50_000_000, 5_000_000, 0, None, None);
        let small = make_artist(20_000, 500, 0, None, None);
        let remix = make_artist(100_000, 25_000, 200_000, None, None);

        let with_big = conversion_score(Some(&big), Some(&remix), 0.5, &settings);
        let with_small = conversion_score(Some(&small), Some(&remix), 0.5, &settings);
        assert!(with_big > with_small);
    }

    #[test]
    fn test_momentum_stage_gap_bonus() {
        let settings = ScoringSettings::default();
        let superstar = make_artist(0, 0, 0, Some(CareerStage::Superstar), None);
        let developing = make_artist(0, 0, 0, Some(CareerStage::Developing), Some(Momentum::Growth));

        let with_gap = momentum_score(Some(&superstar), Some(&developing), &settings);
        let without_gap = momentum_score(None, Some(&developing), &settings);
        // superstar(4) - developing(1) = 3 -> wide bonus; absent original ranks 0 -> no bonus
        assert!((with_gap - without_gap - settings.stage_gap_wide_bonus).abs() < 1e-9);
    }

    #[test]
    fn test_momentum_stalled_midlevel_penalty() {
        let settings = ScoringSettings::default();
        let stalled = make_artist(0, 0, 0, Some(CareerStage::MidLevel), Some(Momentum::Steady));
        let growing = make_artist(0, 0, 0, Some(CareerStage::MidLevel), Some(Momentum::Growth));

        let stalled_score = momentum_score(None, Some(&stalled), &settings);
        let growing_score = momentum_score(None, Some(&growing), &settings);
        // Besides the category difference (45 vs 70), the stalled remixer
        // takes the flat penalty.
        let category_delta = settings.momentum_category_weight * (70.0 - 45.0);
        assert!((growing_score - stalled_score - category_delta - settings.stalled_midlevel_penalty).abs() < 1e-9);
    }

    #[test]
    fn test_momentum_penalty_cannot_go_negative() {
        let settings = ScoringSettings::default();
        let mut artist = make_artist(0, 0, 0, Some(CareerStage::MidLevel), Some(Momentum::Decline));
        artist.career.as_mut().unwrap().momentum_score = Some(0.0);
        let score = momentum_score(None, Some(&artist), &settings);
        assert!(score >= 0.0);
    }

    #[test]
    fn test_overall_range_and_rounding() {
        let settings = ScoringSettings::default();
        let metrics = make_metrics(2_000_000, 50_000, 8_000);
        let original = make_artist(80_000_000, 2_000_000, 0, Some(CareerStage::Superstar), None);
        let remix = make_artist(
            200_000,
            45_000,
            500_000,
            Some(CareerStage::Developing),
            Some(Momentum::ExplosiveGrowth),
        );

        let score = score_opportunity(
            &ScoreInputs {
                metrics: &metrics,
                original: Some(&original),
                remix: Some(&remix),
                geo_divergence: 0.8,
            },
            &settings,
        );

        assert!(score.overall >= 0.0 && score.overall <= 100.0);
        // One decimal of precision.
        assert!(((score.overall * 10.0).round() - score.overall * 10.0).abs() < 1e-9);
        assert_eq!(score.label, OpportunityLabel::from_overall(score.overall));
    }

    #[test]
    fn test_empty_inputs_score_weak() {
        let settings = ScoringSettings::default();
        let metrics = make_metrics(0, 0, 0);
        let score = score_opportunity(
            &ScoreInputs {
                metrics: &metrics,
                original: None,
                remix: None,
                geo_divergence: 0.0,
            },
            &settings,
        );
        assert_eq!(score.demand, 0.0);
        assert_eq!(score.conversion, 0.0);
        // Momentum falls back to the neutral category score.
        assert!((score.momentum - 27.0).abs() < 1e-9);
        assert_eq!(score.label, OpportunityLabel::Weak);
    }
}
