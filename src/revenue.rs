//! Tiered revenue projection from SoundCloud play counts.
//!
//! The multipliers translate an existing SoundCloud audience into estimated
//! DSP streams; they are assumptions that need calibration against cleared
//! remixes, which is why they live in settings rather than code.

use serde::{Deserialize, Serialize};

/// Revenue model settings. Defaults are industry-average per-stream rates
/// and the 1x / 3x / 5x audience-conversion tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueSettings {
    pub spotify_rate: f64,
    pub apple_music_rate: f64,
    pub all_dsps_rate: f64,
    pub conservative_multiplier: f64,
    pub mid_multiplier: f64,
    pub optimistic_multiplier: f64,
    /// Minimum mid-tier all-DSPs revenue (USD) to recommend clearance.
    pub viability_threshold: f64,
}

impl Default for RevenueSettings {
    fn default() -> Self {
        Self {
            spotify_rate: 0.004,
            apple_music_rate: 0.007,
            all_dsps_rate: 0.005,
            conservative_multiplier: 1.0,
            mid_multiplier: 3.0,
            optimistic_multiplier: 5.0,
            viability_threshold: 50_000.0,
        }
    }
}

/// Revenue split by platform for one projection tier, in USD.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenueByPlatform {
    pub spotify: f64,
    pub apple_music: f64,
    pub all_dsps_avg: f64,
}

/// One projection tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierProjection {
    pub tier: String,
    pub estimated_streams: u64,
    pub revenue: RevenueByPlatform,
}

/// Three-tier revenue projection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenueProjection {
    pub tiers: Vec<TierProjection>,
}

impl RevenueProjection {
    pub fn tier(&self, name: &str) -> Option<&TierProjection> {
        self.tiers.iter().find(|t| t.tier == name)
    }
}

/// Go/no-go recommendation against the viability threshold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViabilityAssessment {
    pub clears_threshold: bool,
    pub mid_revenue: f64,
    pub threshold: f64,
    pub recommendation: String,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn project_tier(name: &str, plays: u64, multiplier: f64, settings: &RevenueSettings) -> TierProjection {
    let streams = (plays as f64 * multiplier) as u64;
    TierProjection {
        tier: name.to_string(),
        estimated_streams: streams,
        revenue: RevenueByPlatform {
            spotify: round_cents(streams as f64 * settings.spotify_rate),
            apple_music: round_cents(streams as f64 * settings.apple_music_rate),
            all_dsps_avg: round_cents(streams as f64 * settings.all_dsps_rate),
        },
    }
}

/// Project DSP revenue from a SoundCloud play count across all tiers.
pub fn project_revenue(plays: u64, settings: &RevenueSettings) -> RevenueProjection {
    RevenueProjection {
        tiers: vec![
            project_tier("conservative", plays, settings.conservative_multiplier, settings),
            project_tier("mid", plays, settings.mid_multiplier, settings),
            project_tier("optimistic", plays, settings.optimistic_multiplier, settings),
        ],
    }
}

/// Assess whether the mid-tier all-DSPs revenue clears the viability bar.
pub fn assess_viability(projection: &RevenueProjection, settings: &RevenueSettings) -> ViabilityAssessment {
    let mid_revenue = projection
        .tier("mid")
        .map(|t| t.revenue.all_dsps_avg)
        .unwrap_or(0.0);
    let clears = mid_revenue >= settings.viability_threshold;
    let recommendation = if clears {
        "This remix warrants clearance evaluation.".to_string()
    } else {
        "May not justify clearance costs at current engagement.".to_string()
    };

    ViabilityAssessment {
        clears_threshold: clears,
        mid_revenue,
        threshold: settings.viability_threshold,
        recommendation,
    }
}
