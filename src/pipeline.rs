//! Per-track enrichment pipeline and multi-track ranking.
//!
//! Each track's analysis is a pure function of its inputs plus calls to the
//! injected collaborators. Every enrichment stage tolerates failure: a
//! collaborator error or empty result leaves the corresponding report field
//! `None` and the affected score signals at their zero/neutral defaults.
//! Nothing in here is fatal; the worst case is a sparse report with a
//! low-confidence, low-information score.

use std::cmp::Ordering;
use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::catalog_import::{dedupe_by_isrc, CatalogRecord};
use crate::models::{
    ArtistCandidate, ArtistProfile, EngagementMetrics, HeatTrend, RawTrack, ResolvedTrack,
    TrackReport,
};
use crate::platforms::Clients;
use crate::resolver::{ResolverSettings, TrackResolver};
use crate::revenue::{assess_viability, project_revenue, RevenueSettings};
use crate::scoring::{geo_divergence, score_opportunity, ScoreInputs, ScoringSettings};
use crate::title_parser::parse_remix_title;

/// Name variants tried when disambiguating a parsed artist name. Search for
/// the bare name alone misses cases like "Weeknd" vs "The Weeknd", where the
/// top hit for the parsed fragment is a small artist rather than the star.
const ARTIST_SEARCH_VARIANT_PREFIXES: [&str; 2] = ["The", "DJ"];

const ARTIST_SEARCH_LIMIT: usize = 5;

/// Drives the full enrichment sequence per track and ranks many tracks.
pub struct RemixRadarPipeline {
    clients: Clients,
    resolver: TrackResolver,
    scoring: ScoringSettings,
    revenue: RevenueSettings,
}

impl RemixRadarPipeline {
    pub fn new(
        clients: Clients,
        scoring: ScoringSettings,
        resolver_settings: ResolverSettings,
        revenue: RevenueSettings,
    ) -> Self {
        let resolver = TrackResolver::new(clients.metadata.clone(), resolver_settings);
        Self {
            clients,
            resolver,
            scoring,
            revenue,
        }
    }

    /// Resolve a permalink URL and analyze the resulting track.
    pub async fn analyze_url(&self, url: &str) -> Result<TrackReport> {
        let track = self
            .clients
            .tracks
            .resolve(url)
            .await
            .with_context(|| format!("Failed to resolve track URL: {}", url))?;
        Ok(self.analyze_track(&track, None).await)
    }

    /// Run the full enrichment sequence for one raw track.
    ///
    /// `isrc_override` short-circuits fuzzy resolution with a known ISRC for
    /// the original song (catalog workflows supply this).
    pub async fn analyze_track(&self, track: &RawTrack, isrc_override: Option<&str>) -> TrackReport {
        info!(track_id = track.id, title = %track.title, "Analyzing track");
        let metrics = EngagementMetrics::from_track(track, Utc::now());
        let parsed = parse_remix_title(&track.title);

        // The two artist profiles are independent; either may be absent.
        // When no original artist was parsed, the song title is still worth
        // an artist search (self-titled tracks, uploader-titled remixes).
        let original_query = parsed
            .original_artist
            .as_deref()
            .or(parsed.original_song.as_deref());
        let original_artist = match original_query {
            Some(query) => self.fetch_artist_profile(query).await,
            None => None,
        };

        let remix_query = parsed.remix_artist.as_deref().or(track.uploader_name());
        let remix_artist = match remix_query {
            Some(query) => self.fetch_artist_profile(query).await,
            None => None,
        };

        let original_track = self
            .resolve_original_track(&parsed.original_artist, &parsed.original_song, isrc_override)
            .await;

        let consumption = match original_track.as_ref().and_then(|t| t.isrc.as_deref()) {
            Some(isrc) => match self.clients.consumption.get_consumption_by_isrc(isrc).await {
                Ok(record) => record,
                Err(e) => {
                    warn!(isrc = %isrc, error = %e, "Consumption lookup failed");
                    None
                }
            },
            None => None,
        };

        let geo_div = geo_divergence(
            original_artist.as_ref().map(|a| a.geo.as_slice()).unwrap_or(&[]),
            remix_artist.as_ref().map(|a| a.geo.as_slice()).unwrap_or(&[]),
            self.scoring.geo_top_cities,
        );

        let score = score_opportunity(
            &ScoreInputs {
                metrics: &metrics,
                original: original_artist.as_ref(),
                remix: remix_artist.as_ref(),
                geo_divergence: geo_div,
            },
            &self.scoring,
        );
        let revenue = project_revenue(metrics.plays, &self.revenue);
        let viability = assess_viability(&revenue, &self.revenue);
        let heat_trend = HeatTrend::classify(&metrics);

        debug!(
            track_id = track.id,
            overall = score.overall,
            label = score.label.as_str(),
            "Track scored"
        );

        TrackReport {
            track_id: track.id,
            title: track.title.clone(),
            permalink_url: track.permalink_url.clone(),
            genre: track.genre.clone(),
            created_at: track.created_at,
            metrics,
            parsed,
            remix_artist,
            original_artist,
            original_track,
            consumption,
            geo_divergence: geo_div,
            score,
            heat_trend,
            revenue,
            viability,
        }
    }

    async fn resolve_original_track(
        &self,
        original_artist: &Option<String>,
        original_song: &Option<String>,
        isrc_override: Option<&str>,
    ) -> Option<ResolvedTrack> {
        if let Some(isrc) = isrc_override {
            if let Some(resolved) = self.resolver.resolve_by_isrc(isrc).await {
                return Some(resolved);
            }
            warn!(isrc = %isrc, "ISRC override lookup failed, falling back to fuzzy match");
        }
        let song = original_song.as_deref()?;
        self.resolver.resolve(original_artist.as_deref(), song).await
    }

    /// Search, disambiguate and enrich an artist by name. Returns `None`
    /// when nothing matches; partial enrichment failures leave fields unset.
    async fn fetch_artist_profile(&self, name: &str) -> Option<ArtistProfile> {
        let mut variants = vec![name.to_string()];
        variants.extend(
            ARTIST_SEARCH_VARIANT_PREFIXES
                .iter()
                .map(|prefix| format!("{} {}", prefix, name)),
        );

        let mut candidates: Vec<ArtistCandidate> = Vec::new();
        for variant in &variants {
            match self
                .clients
                .metadata
                .search_artists(variant, ARTIST_SEARCH_LIMIT)
                .await
            {
                Ok(mut hits) => candidates.append(&mut hits),
                Err(e) => warn!(query = %variant, error = %e, "Artist search failed"),
            }
        }
        if candidates.is_empty() {
            debug!(name = %name, "No artist candidates found");
            return None;
        }

        // Dedupe by id, then prefer the provider's own prominence ranking.
        let mut seen = HashSet::new();
        candidates.retain(|c| seen.insert(c.id));
        let top = candidates
            .into_iter()
            .max_by(|a, b| {
                let a_score = a.cm_artist_score.unwrap_or(0.0);
                let b_score = b.cm_artist_score.unwrap_or(0.0);
                a_score.partial_cmp(&b_score).unwrap_or(Ordering::Equal)
            })?;

        if top
            .name
            .as_deref()
            .is_some_and(|matched| !matched.eq_ignore_ascii_case(name))
        {
            debug!(parsed = %name, matched = %top.name.as_deref().unwrap_or(""), "Artist name disambiguated");
        }

        let detail = match self.clients.metadata.get_artist(top.id).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                warn!(artist_id = top.id, error = %e, "Artist detail fetch failed");
                None
            }
        };
        let career = match self.clients.metadata.get_artist_career(top.id).await {
            Ok(career) => Some(career),
            Err(e) => {
                debug!(artist_id = top.id, error = %e, "Artist career fetch failed");
                None
            }
        };
        let tiktok_followers = match self
            .clients
            .metadata
            .get_follower_stat(top.id, "tiktok")
            .await
        {
            Ok(value) => value,
            Err(e) => {
                debug!(artist_id = top.id, error = %e, "TikTok stat fetch failed");
                None
            }
        };
        let geo = match self.clients.metadata.get_listener_cities(top.id).await {
            Ok(cities) => cities,
            Err(e) => {
                debug!(artist_id = top.id, error = %e, "Listener geo fetch failed");
                Vec::new()
            }
        };

        let resolved_name = detail
            .as_ref()
            .and_then(|d| d.name.clone())
            .or(top.name)
            .unwrap_or_else(|| name.to_string());

        Some(ArtistProfile {
            cm_id: top.id,
            name: resolved_name,
            monthly_listeners: top.sp_monthly_listeners,
            followers: top.sp_followers,
            tiktok_followers,
            record_label: detail.and_then(|d| d.record_label),
            geo,
            career,
        })
    }

    /// Seed tracks for remixes of one song: search `"{song} remix"` and keep
    /// results that mention the original artist, sorted by play count.
    pub async fn search_remix_seeds(
        &self,
        song: &str,
        artist: Option<&str>,
        limit: usize,
    ) -> Vec<RawTrack> {
        let query = format!("{} remix", song);
        let mut results = match self.clients.tracks.search_tracks(&query, limit).await {
            Ok(results) => results,
            Err(e) => {
                warn!(query = %query, error = %e, "Remix seed search failed");
                return Vec::new();
            }
        };

        if let Some(artist) = artist {
            let needle = artist.to_lowercase();
            results.retain(|track| {
                track.title.to_lowercase().contains(&needle)
                    || track
                        .uploader_name()
                        .is_some_and(|u| u.to_lowercase().contains(&needle))
                    || track
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            });
        }

        results.sort_by(|a, b| b.plays().cmp(&a.plays()));
        results.truncate(limit);
        results
    }

    /// Analyze remixes seeded from an artist-name search, ranked by score.
    pub async fn search_artist_remixes(&self, artist: &str, limit: usize) -> Vec<TrackReport> {
        let query = format!("{} remix", artist);
        let seeds = match self.clients.tracks.search_tracks(&query, limit).await {
            Ok(seeds) => seeds,
            Err(e) => {
                warn!(query = %query, error = %e, "Artist remix search failed");
                return Vec::new();
            }
        };
        info!(artist = %artist, seeds = seeds.len(), "Artist remix search");

        let mut reports = Vec::with_capacity(seeds.len());
        for seed in &seeds {
            reports.push(self.analyze_track(seed, None).await);
        }
        rank_reports(reports)
    }

    /// Analyze remixes of one song, ranked by score.
    pub async fn search_song_remixes(
        &self,
        song: &str,
        artist: Option<&str>,
        limit: usize,
        isrc_override: Option<&str>,
    ) -> Vec<TrackReport> {
        let seeds = self.search_remix_seeds(song, artist, limit).await;
        info!(song = %song, seeds = seeds.len(), "Song remix search");

        let mut reports = Vec::with_capacity(seeds.len());
        for seed in &seeds {
            reports.push(self.analyze_track(seed, isrc_override).await);
        }
        rank_reports(reports)
    }

    /// Batch workflow over an imported catalog: per song, find and analyze
    /// remixes, then rank the combined result set.
    pub async fn analyze_catalog(
        &self,
        records: Vec<CatalogRecord>,
        limit_per_song: usize,
        min_plays: u64,
    ) -> Vec<TrackReport> {
        let songs: Vec<CatalogRecord> = dedupe_by_isrc(records)
            .into_iter()
            .filter(|record| record.title.is_some())
            .collect();
        info!(songs = songs.len(), "Catalog analysis started");

        let mut all_reports = Vec::new();
        for record in &songs {
            let title = record.title.as_deref().unwrap_or_default();
            let reports = self
                .search_song_remixes(
                    title,
                    record.artist.as_deref(),
                    limit_per_song,
                    record.isrc.as_deref(),
                )
                .await;
            all_reports.extend(
                reports
                    .into_iter()
                    .filter(|report| report.metrics.plays >= min_plays),
            );
        }
        rank_reports(all_reports)
    }
}

/// Dedupe by track identity (first occurrence wins) and sort descending by
/// overall score. The sort is stable, so equal scores keep input order.
pub fn rank_reports(reports: Vec<TrackReport>) -> Vec<TrackReport> {
    let mut seen = HashSet::new();
    let mut unique: Vec<TrackReport> = reports
        .into_iter()
        .filter(|report| seen.insert(report.track_id))
        .collect();
    unique.sort_by(|a, b| {
        b.score
            .overall
            .partial_cmp(&a.score.overall)
            .unwrap_or(Ordering::Equal)
    });
    unique
}
