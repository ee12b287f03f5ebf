//! Core data model for remix opportunity analysis.
//!
//! Raw platform records are kept close to the wire shapes they arrive in;
//! everything derived (metrics, profiles, scores) is an explicit typed record
//! with optional enrichment fields, recomputed per analysis run and never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::revenue::{RevenueProjection, ViabilityAssessment};

/// SoundCloud uploader record, as returned by the v2 API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUser {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub track_count: Option<u64>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Publisher-supplied track metadata. Only present when the uploader filled
/// it in, so every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublisherMetadata {
    #[serde(default)]
    pub isrc: Option<String>,
}

/// Raw SoundCloud track record from the resolve/search endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTrack {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub playback_count: Option<u64>,
    #[serde(default)]
    pub likes_count: Option<u64>,
    #[serde(default)]
    pub favoritings_count: Option<u64>,
    #[serde(default)]
    pub reposts_count: Option<u64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permalink_url: Option<String>,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub publisher_metadata: Option<PublisherMetadata>,
}

impl RawTrack {
    pub fn plays(&self) -> u64 {
        self.playback_count.unwrap_or(0)
    }

    /// Like count; older API payloads report it as `favoritings_count`.
    pub fn likes(&self) -> u64 {
        self.likes_count.or(self.favoritings_count).unwrap_or(0)
    }

    pub fn uploader_name(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.username.as_deref())
    }

    /// ISRC of the uploaded track itself (the remix, not the original).
    pub fn isrc(&self) -> Option<&str> {
        self.publisher_metadata
            .as_ref()
            .and_then(|m| m.isrc.as_deref())
    }
}

/// Engagement metrics derived from one track snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub plays: u64,
    pub likes: u64,
    pub reposts: u64,
    pub comments: u64,
    /// likes / plays, 0 when the track has no plays.
    pub engagement_rate: f64,
    /// Plays per day since upload, rounded.
    pub daily_velocity: u64,
    /// Days since upload, floored at 1.
    pub days_live: u64,
}

impl EngagementMetrics {
    pub fn from_track(track: &RawTrack, now: DateTime<Utc>) -> Self {
        let plays = track.plays();
        let likes = track.likes();
        let days_live = track
            .created_at
            .map(|created| (now - created).num_days().max(1) as u64)
            .unwrap_or(1);
        let engagement_rate = if plays > 0 {
            (likes as f64 / plays as f64 * 10_000.0).round() / 10_000.0
        } else {
            0.0
        };

        EngagementMetrics {
            plays,
            likes,
            reposts: track.reposts_count.unwrap_or(0),
            comments: track.comment_count.unwrap_or(0),
            engagement_rate,
            daily_velocity: (plays as f64 / days_live as f64).round() as u64,
            days_live,
        }
    }
}

/// Best-effort decomposition of a free-text remix title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTitle {
    pub original_artist: Option<String>,
    pub original_song: Option<String>,
    pub remix_artist: Option<String>,
    pub raw_title: String,
}

/// One city in an artist's listener geography.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub name: String,
    pub country_code: String,
    pub listener_count: u64,
    /// Affinity > 1.0 means the city over-indexes for this artist.
    pub affinity: f64,
}

/// Career stage labels in ascending order of establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CareerStage {
    Undiscovered,
    Developing,
    MidLevel,
    Mainstream,
    Superstar,
    Legendary,
}

impl CareerStage {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "undiscovered" => Some(CareerStage::Undiscovered),
            "developing" => Some(CareerStage::Developing),
            "mid-level" | "mid level" => Some(CareerStage::MidLevel),
            "mainstream" => Some(CareerStage::Mainstream),
            "superstar" => Some(CareerStage::Superstar),
            "legendary" => Some(CareerStage::Legendary),
            _ => None,
        }
    }

    /// Ordinal rank, 0 (undiscovered) through 5 (legendary).
    pub fn rank(&self) -> u8 {
        match self {
            CareerStage::Undiscovered => 0,
            CareerStage::Developing => 1,
            CareerStage::MidLevel => 2,
            CareerStage::Mainstream => 3,
            CareerStage::Superstar => 4,
            CareerStage::Legendary => 5,
        }
    }
}

/// Momentum trend labels as reported by the metadata provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Momentum {
    #[serde(rename = "decline")]
    Decline,
    #[serde(rename = "gradual decline")]
    GradualDecline,
    #[serde(rename = "steady")]
    Steady,
    #[serde(rename = "growth")]
    Growth,
    #[serde(rename = "explosive growth")]
    ExplosiveGrowth,
}

impl Momentum {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "decline" => Some(Momentum::Decline),
            "gradual decline" => Some(Momentum::GradualDecline),
            "steady" => Some(Momentum::Steady),
            "growth" => Some(Momentum::Growth),
            "explosive growth" => Some(Momentum::ExplosiveGrowth),
            _ => None,
        }
    }

    pub fn is_growing(&self) -> bool {
        matches!(self, Momentum::Growth | Momentum::ExplosiveGrowth)
    }
}

/// Career snapshot for an artist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareerProfile {
    pub stage: Option<CareerStage>,
    pub momentum: Option<Momentum>,
    /// Provider-reported momentum strength, 0-100.
    pub momentum_score: Option<f64>,
}

/// Cross-platform artist profile, fetched fresh per analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub cm_id: u64,
    pub name: String,
    pub monthly_listeners: Option<u64>,
    pub followers: Option<u64>,
    pub tiktok_followers: Option<u64>,
    pub record_label: Option<String>,
    /// Top listener cities, sorted by listener count descending.
    pub geo: Vec<GeoPoint>,
    pub career: Option<CareerProfile>,
}

impl ArtistProfile {
    /// Follower-to-monthly-listener ratio, the audience loyalty signal.
    pub fn follower_to_listener_ratio(&self) -> Option<f64> {
        match (self.followers, self.monthly_listeners) {
            (Some(f), Some(l)) if l > 0 => Some(f as f64 / l as f64),
            _ => None,
        }
    }
}

/// Artist hit from the metadata provider's entity search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistCandidate {
    pub id: u64,
    pub name: Option<String>,
    /// Provider's own prominence ranking, used to disambiguate name variants.
    pub cm_artist_score: Option<f64>,
    pub sp_followers: Option<u64>,
    pub sp_monthly_listeners: Option<u64>,
}

/// Full artist metadata record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistDetail {
    pub id: u64,
    pub name: Option<String>,
    pub record_label: Option<String>,
    pub hometown_city: Option<String>,
    pub country_code: Option<String>,
}

/// Track hit from the metadata provider's entity search. Ephemeral; consumed
/// only by the resolver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackCandidate {
    pub id: u64,
    pub name: String,
    pub artist_names: Vec<String>,
    pub isrc: Option<String>,
    pub album_ids: Vec<u64>,
    pub release_date: Option<String>,
}

/// Full track metadata record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackDetail {
    pub id: u64,
    pub name: Option<String>,
    pub isrc: Option<String>,
    pub artist_names: Vec<String>,
    pub album_ids: Vec<u64>,
    pub album_labels: Vec<String>,
    pub release_date: Option<String>,
    pub songwriters: Vec<String>,
}

/// Full album metadata record, used for label selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlbumDetail {
    pub id: u64,
    pub name: Option<String>,
    pub label: Option<String>,
    pub release_date: Option<String>,
}

/// Cross-platform id mapping keyed by ISRC.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackIdMapping {
    pub cm_track: Option<u64>,
    pub track_name: Option<String>,
    pub isrc: Option<String>,
    pub spotify_track_id: Option<String>,
}

/// Canonical original-track record produced by the resolver. Once an ISRC
/// lookup succeeds its identity fields supersede the search hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedTrack {
    pub cm_track_id: u64,
    pub name: String,
    pub isrc: Option<String>,
    pub artist_names: Vec<String>,
    pub release_date: Option<String>,
    pub songwriters: Vec<String>,
    pub label: Option<String>,
    /// Resolver confidence in [0, 1], from the finalist score gap.
    pub match_confidence: f64,
}

/// One metric entry in a consumption-data response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsumptionMetric {
    #[serde(default)]
    pub metric_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Song-level consumption record keyed by ISRC.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub display_artist_name: Option<String>,
    #[serde(default)]
    pub metrics: Vec<ConsumptionMetric>,
}

impl ConsumptionRecord {
    /// Total stream count, preferring a "total streams" metric over any other
    /// stream-named metric.
    pub fn stream_count(&self) -> Option<f64> {
        let named = |m: &ConsumptionMetric| {
            m.metric_name
                .as_deref()
                .or(m.name.as_deref())
                .unwrap_or("")
                .to_lowercase()
        };
        self.metrics
            .iter()
            .find(|m| {
                let n = named(m);
                n.contains("stream") && n.contains("total")
            })
            .or_else(|| self.metrics.iter().find(|m| named(m).contains("stream")))
            .and_then(|m| m.value)
    }
}

/// Opportunity label buckets over the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityLabel {
    #[serde(rename = "STRONG")]
    Strong,
    #[serde(rename = "MODERATE")]
    Moderate,
    #[serde(rename = "MARGINAL")]
    Marginal,
    #[serde(rename = "WEAK")]
    Weak,
}

impl OpportunityLabel {
    /// Boundary-inclusive thresholds: 80 / 60 / 40.
    pub fn from_overall(overall: f64) -> Self {
        if overall >= 80.0 {
            OpportunityLabel::Strong
        } else if overall >= 60.0 {
            OpportunityLabel::Moderate
        } else if overall >= 40.0 {
            OpportunityLabel::Marginal
        } else {
            OpportunityLabel::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityLabel::Strong => "STRONG",
            OpportunityLabel::Moderate => "MODERATE",
            OpportunityLabel::Marginal => "MARGINAL",
            OpportunityLabel::Weak => "WEAK",
        }
    }
}

impl Default for OpportunityLabel {
    fn default() -> Self {
        OpportunityLabel::Weak
    }
}

/// Composite opportunity score. Derived, never mutated in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpportunityScore {
    /// 0-100, rounded to one decimal.
    pub overall: f64,
    pub label: OpportunityLabel,
    pub demand: f64,
    pub conversion: f64,
    pub momentum: f64,
}

/// Coarse engagement trajectory from normalized daily velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatTrend {
    Rising,
    Steady,
    Declining,
}

impl HeatTrend {
    pub fn classify(metrics: &EngagementMetrics) -> Self {
        let days = metrics.days_live.max(1) as f64;
        let normalized = metrics.daily_velocity as f64 / days.powf(0.25).max(1.0);
        if normalized >= 1200.0 {
            HeatTrend::Rising
        } else if normalized <= 250.0 {
            HeatTrend::Declining
        } else {
            HeatTrend::Steady
        }
    }
}

impl Default for HeatTrend {
    fn default() -> Self {
        HeatTrend::Steady
    }
}

/// Fully enriched per-track analysis report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackReport {
    pub track_id: u64,
    pub title: String,
    pub permalink_url: Option<String>,
    pub genre: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub metrics: EngagementMetrics,
    pub parsed: ParsedTitle,
    pub remix_artist: Option<ArtistProfile>,
    pub original_artist: Option<ArtistProfile>,
    pub original_track: Option<ResolvedTrack>,
    pub consumption: Option<ConsumptionRecord>,
    pub geo_divergence: f64,
    pub score: OpportunityScore,
    pub heat_trend: HeatTrend,
    pub revenue: RevenueProjection,
    pub viability: ViabilityAssessment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_track(plays: u64, likes: u64, days_ago: i64) -> RawTrack {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        RawTrack {
            id: 1,
            title: "Test".to_string(),
            created_at: Some(now - chrono::Duration::days(days_ago)),
            playback_count: Some(plays),
            likes_count: Some(likes),
            reposts_count: Some(10),
            comment_count: Some(3),
            ..Default::default()
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_metrics_from_track() {
        let metrics = EngagementMetrics::from_track(&make_track(100_000, 2_500, 50), fixed_now());
        assert_eq!(metrics.plays, 100_000);
        assert_eq!(metrics.likes, 2_500);
        assert_eq!(metrics.days_live, 50);
        assert_eq!(metrics.daily_velocity, 2_000);
        assert!((metrics.engagement_rate - 0.025).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_zero_plays_has_zero_rate() {
        let metrics = EngagementMetrics::from_track(&make_track(0, 500, 10), fixed_now());
        assert_eq!(metrics.engagement_rate, 0.0);
        assert_eq!(metrics.daily_velocity, 0);
    }

    #[test]
    fn test_metrics_days_live_floor() {
        // Uploaded "today" still counts as one day live.
        let metrics = EngagementMetrics::from_track(&make_track(500, 5, 0), fixed_now());
        assert_eq!(metrics.days_live, 1);
        assert_eq!(metrics.daily_velocity, 500);
    }

    #[test]
    fn test_likes_falls_back_to_favoritings() {
        let track = RawTrack {
            id: 1,
            favoritings_count: Some(42),
            ..Default::default()
        };
        assert_eq!(track.likes(), 42);
    }

    #[test]
    fn test_career_stage_parse_and_rank() {
        assert_eq!(CareerStage::parse("mid-level"), Some(CareerStage::MidLevel));
        assert_eq!(CareerStage::parse("Superstar"), Some(CareerStage::Superstar));
        assert_eq!(CareerStage::parse("unheard of"), None);
        assert_eq!(CareerStage::Undiscovered.rank(), 0);
        assert_eq!(CareerStage::Legendary.rank(), 5);
    }

    #[test]
    fn test_momentum_parse() {
        assert_eq!(Momentum::parse("explosive growth"), Some(Momentum::ExplosiveGrowth));
        assert_eq!(Momentum::parse("Gradual Decline"), Some(Momentum::GradualDecline));
        assert_eq!(Momentum::parse("sideways"), None);
    }

    #[test]
    fn test_opportunity_label_boundaries() {
        assert_eq!(OpportunityLabel::from_overall(80.0), OpportunityLabel::Strong);
        assert_eq!(OpportunityLabel::from_overall(79.9), OpportunityLabel::Moderate);
        assert_eq!(OpportunityLabel::from_overall(60.0), OpportunityLabel::Moderate);
        assert_eq!(OpportunityLabel::from_overall(40.0), OpportunityLabel::Marginal);
        assert_eq!(OpportunityLabel::from_overall(39.9), OpportunityLabel::Weak);
    }

    #[test]
    fn test_follower_ratio() {
        let profile = ArtistProfile {
            followers: Some(30_000),
            monthly_listeners: Some(150_000),
            ..Default::default()
        };
        assert!((profile.follower_to_listener_ratio().unwrap() - 0.2).abs() < 1e-9);

        let no_listeners = ArtistProfile {
            followers: Some(30_000),
            monthly_listeners: Some(0),
            ..Default::default()
        };
        assert!(no_listeners.follower_to_listener_ratio().is_none());
    }

    #[test]
    fn test_stream_count_prefers_total() {
        let record = ConsumptionRecord {
            metrics: vec![
                ConsumptionMetric {
                    metric_name: Some("on_demand_streams".to_string()),
                    value: Some(1000.0),
                    ..Default::default()
                },
                ConsumptionMetric {
                    metric_name: Some("total_streams".to_string()),
                    value: Some(5000.0),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(record.stream_count(), Some(5000.0));
    }

    #[test]
    fn test_heat_trend_classification() {
        let rising = EngagementMetrics {
            daily_velocity: 3_000,
            days_live: 4,
            ..Default::default()
        };
        assert_eq!(HeatTrend::classify(&rising), HeatTrend::Rising);

        let declining = EngagementMetrics {
            daily_velocity: 100,
            days_live: 100,
            ..Default::default()
        };
        assert_eq!(HeatTrend::classify(&declining), HeatTrend::Declining);
    }
}
