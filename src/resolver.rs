//! Fuzzy resolution of a parsed (artist, song) pair to a canonical catalog
//! track and ISRC.
//!
//! The catalog search endpoint is noisy: it returns remixes, covers,
//! regional variants and unrelated tracks that share a word with the query.
//! The resolver scores every candidate on name and artist evidence
//! (including negative evidence when a candidate names a *different*
//! artist), re-scores the finalists against their full metadata, and
//! quantifies how unambiguous the winner is as a confidence value.
//!
//! If the winner carries an ISRC, the definitive record is re-resolved
//! through the ISRC bridge; the canonical record's identity fields override
//! the search hit. This guards against the search endpoint returning a
//! regional or remix variant under the same ISRC family.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{ResolvedTrack, TrackCandidate, TrackDetail};
use crate::platforms::MetadataProvider;

/// Tokens marking a candidate as a remix/edit/cover version rather than the
/// original master.
const REMIX_MARKERS: [&str; 8] = [
    "remix", "edit", "bootleg", "flip", "rework", "vip", "mix", "cover",
];

lazy_static! {
    static ref NUMERIC_PREFIX: Regex = Regex::new(r"^\d{4,}\s+").unwrap();
    static ref COUNTRY_SUFFIX: Regex = Regex::new(r"\b[A-Z]{2,3}$").unwrap();
}

/// Tunable resolver constants. The match scores are empirically chosen
/// thresholds, preserved as defaults rather than hard-coded law.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Candidates requested from the catalog search.
    pub search_limit: usize,
    /// Top candidates that get a full-metadata fetch and re-score.
    pub finalist_limit: usize,
    /// Albums fetched when selecting a label.
    pub album_fetch_limit: usize,
    pub exact_name_score: f64,
    pub name_containment_score: f64,
    pub word_overlap_score: f64,
    pub artist_match_score: f64,
    pub artist_mismatch_penalty: f64,
    pub remix_marker_penalty: f64,
    pub isrc_bonus: f64,
    pub confidence_divisor: f64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            search_limit: 10,
            finalist_limit: 5,
            album_fetch_limit: 5,
            exact_name_score: 140.0,
            name_containment_score: 80.0,
            word_overlap_score: 25.0,
            artist_match_score: 120.0,
            artist_mismatch_penalty: 120.0,
            remix_marker_penalty: 80.0,
            isrc_bonus: 10.0,
            confidence_divisor: 260.0,
        }
    }
}

/// Lowercase, drop non-alphanumeric characters, collapse whitespace.
fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Candidate fields after merging the search hit with its full metadata.
/// Full metadata may reveal artist lists and album links absent from the
/// search snippet.
#[derive(Debug, Clone)]
struct MergedCandidate {
    id: u64,
    name: String,
    artist_names: Vec<String>,
    isrc: Option<String>,
    album_ids: Vec<u64>,
    album_labels: Vec<String>,
    release_date: Option<String>,
    songwriters: Vec<String>,
}

impl MergedCandidate {
    fn from_search_hit(candidate: TrackCandidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            artist_names: candidate.artist_names,
            isrc: candidate.isrc,
            album_ids: candidate.album_ids,
            album_labels: Vec::new(),
            release_date: candidate.release_date,
            songwriters: Vec::new(),
        }
    }

    fn merge_detail(&mut self, detail: TrackDetail) {
        if let Some(name) = detail.name {
            if !name.trim().is_empty() {
                self.name = name;
            }
        }
        if !detail.artist_names.is_empty() {
            self.artist_names = detail.artist_names;
        }
        if self.isrc.is_none() {
            self.isrc = detail.isrc;
        }
        if !detail.album_ids.is_empty() {
            self.album_ids = detail.album_ids;
        }
        self.album_labels = detail.album_labels;
        if self.release_date.is_none() {
            self.release_date = detail.release_date;
        }
        self.songwriters = detail.songwriters;
    }

    fn overwrite_identity(&mut self, canonical_id: u64, detail: TrackDetail) {
        self.id = canonical_id;
        if let Some(name) = detail.name {
            if !name.trim().is_empty() {
                self.name = name;
            }
        }
        if !detail.artist_names.is_empty() {
            self.artist_names = detail.artist_names;
        }
        if detail.isrc.is_some() {
            self.isrc = detail.isrc;
        }
        if !detail.album_ids.is_empty() {
            self.album_ids = detail.album_ids;
        }
        if !detail.album_labels.is_empty() {
            self.album_labels = detail.album_labels;
        }
        if detail.release_date.is_some() {
            self.release_date = detail.release_date;
        }
        if !detail.songwriters.is_empty() {
            self.songwriters = detail.songwriters;
        }
    }
}

/// Resolves parsed titles against the external metadata catalog.
pub struct TrackResolver {
    provider: Arc<dyn MetadataProvider>,
    settings: ResolverSettings,
}

impl TrackResolver {
    pub fn new(provider: Arc<dyn MetadataProvider>, settings: ResolverSettings) -> Self {
        Self { provider, settings }
    }

    /// Resolve an (artist, song) pair to the canonical original track.
    ///
    /// Returns `None` when the search yields nothing usable; every external
    /// failure inside degrades to the best partial result instead of
    /// propagating.
    pub async fn resolve(&self, artist: Option<&str>, song: &str) -> Option<ResolvedTrack> {
        let query = match artist {
            Some(artist) => format!("{} {}", artist, song),
            None => song.to_string(),
        };

        let candidates = match self
            .provider
            .search_tracks(&query, self.settings.search_limit)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(query = %query, error = %e, "Catalog track search failed");
                return None;
            }
        };
        if candidates.is_empty() {
            debug!(query = %query, "No track candidates returned");
            return None;
        }

        let song_norm = normalize(song);
        let artist_norm = artist.map(normalize).filter(|a| !a.is_empty());

        // First pass over search snippets only.
        let mut scored: Vec<(f64, MergedCandidate)> = candidates
            .into_iter()
            .map(MergedCandidate::from_search_hit)
            .map(|c| (self.score_candidate(&song_norm, artist_norm.as_deref(), &c), c))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(self.settings.finalist_limit);

        // Second pass: merge full metadata into each finalist and re-score.
        let mut finalists: Vec<(f64, MergedCandidate)> = Vec::with_capacity(scored.len());
        for (_, mut candidate) in scored {
            match self.provider.get_track(candidate.id).await {
                Ok(detail) => candidate.merge_detail(detail),
                Err(e) => {
                    debug!(track_id = candidate.id, error = %e, "Full track fetch failed, keeping search fields");
                }
            }
            let score = self.score_candidate(&song_norm, artist_norm.as_deref(), &candidate);
            finalists.push((score, candidate));
        }
        finalists.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let top_score = finalists[0].0;
        let score_gap = finalists
            .get(1)
            .map(|(second, _)| top_score - second)
            .unwrap_or(top_score);
        let (_, mut winner) = finalists.remove(0);
        let confidence = self.confidence(top_score, score_gap);
        debug!(
            track_id = winner.id,
            name = %winner.name,
            top_score,
            score_gap,
            confidence,
            "Selected resolver finalist"
        );

        // Canonicalize through the ISRC bridge; identity fields from the
        // canonical record supersede the search hit.
        if let Some(isrc) = winner.isrc.clone() {
            if let Some((canonical_id, detail)) = self.lookup_canonical(&isrc).await {
                winner.overwrite_identity(canonical_id, detail);
            }
        }

        let label = self.pick_label(&winner.album_ids, &winner.album_labels).await;

        Some(ResolvedTrack {
            cm_track_id: winner.id,
            name: winner.name,
            isrc: winner.isrc,
            artist_names: winner.artist_names,
            release_date: winner.release_date,
            songwriters: winner.songwriters,
            label,
            match_confidence: confidence,
        })
    }

    /// Resolve directly by a known ISRC, bypassing fuzzy matching. Used when
    /// a catalog record already supplies the original's ISRC.
    pub async fn resolve_by_isrc(&self, isrc: &str) -> Option<ResolvedTrack> {
        let (canonical_id, detail) = self.lookup_canonical(isrc).await?;
        let label = self.pick_label(&detail.album_ids, &detail.album_labels).await;

        Some(ResolvedTrack {
            cm_track_id: canonical_id,
            name: detail.name.unwrap_or_default(),
            isrc: detail.isrc.or_else(|| Some(isrc.to_string())),
            artist_names: detail.artist_names,
            release_date: detail.release_date,
            songwriters: detail.songwriters,
            label,
            match_confidence: 1.0,
        })
    }

    /// ISRC -> internal id -> full canonical record. Any failure along the
    /// way returns `None` and the caller keeps what it already has.
    async fn lookup_canonical(&self, isrc: &str) -> Option<(u64, TrackDetail)> {
        let mappings = match self.provider.get_track_ids_by_isrc(isrc).await {
            Ok(mappings) => mappings,
            Err(e) => {
                warn!(isrc = %isrc, error = %e, "ISRC id lookup failed");
                return None;
            }
        };
        let canonical_id = mappings.iter().find_map(|m| m.cm_track)?;
        match self.provider.get_track(canonical_id).await {
            Ok(detail) => Some((canonical_id, detail)),
            Err(e) => {
                warn!(track_id = canonical_id, error = %e, "Canonical track fetch failed");
                None
            }
        }
    }

    fn score_candidate(
        &self,
        song_norm: &str,
        artist_norm: Option<&str>,
        candidate: &MergedCandidate,
    ) -> f64 {
        let s = &self.settings;
        let name_norm = normalize(&candidate.name);
        let mut score = 0.0;

        // Name evidence.
        if !song_norm.is_empty() {
            if name_norm == song_norm {
                score += s.exact_name_score;
            } else if name_norm.contains(song_norm) {
                score += s.name_containment_score;
            } else {
                let query_words: HashSet<&str> = song_norm.split(' ').collect();
                if name_norm.split(' ').any(|w| query_words.contains(w)) {
                    score += s.word_overlap_score;
                }
            }
        }

        // Artist evidence. Absence of artist data is neutral; data naming a
        // different artist is explicit negative evidence.
        if let Some(artist_norm) = artist_norm {
            if !candidate.artist_names.is_empty() {
                let matched = candidate
                    .artist_names
                    .iter()
                    .any(|a| artists_match(artist_norm, &normalize(a)));
                if matched {
                    score += s.artist_match_score;
                } else {
                    score -= s.artist_mismatch_penalty;
                }
            }
        }

        // Down-rank remix/cover versions when hunting for the original.
        if name_norm
            .split(' ')
            .any(|token| REMIX_MARKERS.contains(&token))
        {
            score -= s.remix_marker_penalty;
        }

        // A candidate that already carries an ISRC is cheaper to canonicalize.
        if candidate.isrc.is_some() {
            score += s.isrc_bonus;
        }

        score
    }

    /// Confidence from the winner's score and its margin over the runner-up.
    /// A large unambiguous lead yields higher confidence than a narrow win.
    fn confidence(&self, top_score: f64, score_gap: f64) -> f64 {
        let raw = (top_score + score_gap.max(0.0) * 0.5) / self.settings.confidence_divisor;
        (raw.clamp(0.0, 1.0) * 100.0).round() / 100.0
    }

    /// Pick a label: prefer the label of the oldest dated album (a proxy for
    /// the original master over reissues), then fall back to the best-looking
    /// track-level label string.
    async fn pick_label(&self, album_ids: &[u64], track_labels: &[String]) -> Option<String> {
        let mut albums = Vec::new();
        for album_id in album_ids.iter().take(self.settings.album_fetch_limit) {
            match self.provider.get_album(*album_id).await {
                Ok(album) => albums.push(album),
                Err(e) => {
                    debug!(album_id, error = %e, "Album fetch failed during label selection");
                }
            }
        }

        let from_albums = albums
            .iter()
            .filter(|a| {
                a.release_date.is_some()
                    && a.label.as_deref().is_some_and(|l| !l.trim().is_empty())
            })
            .min_by(|a, b| a.release_date.cmp(&b.release_date))
            .and_then(|a| a.label.clone());
        if from_albums.is_some() {
            return from_albums;
        }

        track_labels
            .iter()
            .flat_map(|raw| raw.split(['|', ';', '/']))
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .max_by_key(|part| score_label_candidate(part))
            .map(|part| part.to_string())
    }
}

/// Whether a candidate artist name matches the query artist: mutual
/// substring containment, or at least two overlapping whitespace tokens.
fn artists_match(query_norm: &str, candidate_norm: &str) -> bool {
    if query_norm.is_empty() || candidate_norm.is_empty() {
        return false;
    }
    if query_norm.contains(candidate_norm) || candidate_norm.contains(query_norm) {
        return true;
    }
    let query_words: HashSet<&str> = query_norm.split(' ').collect();
    candidate_norm
        .split(' ')
        .filter(|w| query_words.contains(w))
        .count()
        >= 2
}

/// Heuristic quality score for a raw label string. Catalog label fields are
/// dirty: they carry catalog numbers, "Unknown", and per-territory suffixes.
fn score_label_candidate(label: &str) -> i64 {
    let raw = label.trim();
    if raw.is_empty() {
        return -10_000;
    }

    let mut score: i64 = 0;
    let lowered = raw.to_lowercase();

    if NUMERIC_PREFIX.is_match(raw) {
        score -= 80;
    }
    if matches!(lowered.as_str(), "unknown" | "n/a" | "none") {
        score -= 50;
    }
    if ["records", "recordings", "music", "entertainment", "bros"]
        .iter()
        .any(|token| lowered.contains(token))
    {
        score += 20;
    }
    if COUNTRY_SUFFIX.is_match(raw) && raw.split_whitespace().count() <= 4 {
        score -= 10;
    }

    score += (raw.len().min(40) / 8) as i64;
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlbumDetail, ArtistCandidate, CareerProfile, GeoPoint, TrackIdMapping};
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// In-test metadata provider backed by fixed data.
    #[derive(Default)]
    struct FakeProvider {
        track_hits: Vec<TrackCandidate>,
        track_details: HashMap<u64, TrackDetail>,
        albums: HashMap<u64, AlbumDetail>,
        isrc_mappings: HashMap<String, Vec<TrackIdMapping>>,
        fail_search: bool,
    }

    #[async_trait]
    impl MetadataProvider for FakeProvider {
        async fn search_artists(&self, _query: &str, _limit: usize) -> Result<Vec<ArtistCandidate>> {
            Ok(vec![])
        }

        async fn search_tracks(&self, _query: &str, limit: usize) -> Result<Vec<TrackCandidate>> {
            if self.fail_search {
                bail!("search endpoint unavailable");
            }
            Ok(self.track_hits.iter().take(limit).cloned().collect())
        }

        async fn get_artist(&self, _artist_id: u64) -> Result<crate::models::ArtistDetail> {
            bail!("not used")
        }

        async fn get_artist_career(&self, _artist_id: u64) -> Result<CareerProfile> {
            bail!("not used")
        }

        async fn get_follower_stat(&self, _artist_id: u64, _platform: &str) -> Result<Option<u64>> {
            Ok(None)
        }

        async fn get_listener_cities(&self, _artist_id: u64) -> Result<Vec<GeoPoint>> {
            Ok(vec![])
        }

        async fn get_track(&self, track_id: u64) -> Result<TrackDetail> {
            match self.track_details.get(&track_id) {
                Some(detail) => Ok(detail.clone()),
                None => bail!("track {} not found", track_id),
            }
        }

        async fn get_album(&self, album_id: u64) -> Result<AlbumDetail> {
            match self.albums.get(&album_id) {
                Some(album) => Ok(album.clone()),
                None => bail!("album {} not found", album_id),
            }
        }

        async fn get_track_ids_by_isrc(&self, isrc: &str) -> Result<Vec<TrackIdMapping>> {
            Ok(self.isrc_mappings.get(isrc).cloned().unwrap_or_default())
        }
    }

    fn make_hit(id: u64, name: &str, artists: &[&str], isrc: Option<&str>) -> TrackCandidate {
        TrackCandidate {
            id,
            name: name.to_string(),
            artist_names: artists.iter().map(|a| a.to_string()).collect(),
            isrc: isrc.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    fn resolver(provider: FakeProvider) -> TrackResolver {
        TrackResolver::new(Arc::new(provider), ResolverSettings::default())
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Blinding  Lights!"), "blinding lights");
        assert_eq!(normalize("  The-Weeknd "), "the weeknd");
        assert_eq!(normalize("***"), "");
    }

    #[test]
    fn test_artists_match_substring_and_tokens() {
        assert!(artists_match("weeknd", "the weeknd"));
        assert!(artists_match("the weeknd", "weeknd"));
        assert!(artists_match("daft punk band", "daft punk"));
        assert!(!artists_match("weeknd", "dua lipa"));
        assert!(!artists_match("", "anyone"));
    }

    #[test]
    fn test_label_candidate_scoring() {
        assert!(score_label_candidate("XO / Republic Records") > score_label_candidate("Unknown"));
        assert!(score_label_candidate("Republic Records") > score_label_candidate("194816 Something"));
        assert_eq!(score_label_candidate("  "), -10_000);
    }

    #[tokio::test]
    async fn test_exact_match_ranks_first_with_high_confidence() {
        let provider = FakeProvider {
            track_hits: vec![
                make_hit(1, "Blinding Lights Remix", &["DJ Nobody"], None),
                make_hit(2, "Blinding Lights", &["The Weeknd"], Some("USUG11904206")),
                make_hit(3, "Blinding", &["Someone Else"], None),
                make_hit(4, "Lights", &["Ellie Goulding"], None),
                make_hit(5, "Blinding Lights Cover", &["A Cover Band"], None),
            ],
            ..Default::default()
        };
        let resolved = resolver(provider)
            .resolve(Some("The Weeknd"), "Blinding Lights")
            .await
            .expect("expected a resolution");

        assert_eq!(resolved.cm_track_id, 2);
        assert_eq!(resolved.name, "Blinding Lights");
        assert!(
            resolved.match_confidence > 0.8,
            "confidence was {}",
            resolved.match_confidence
        );
    }

    #[tokio::test]
    async fn test_tied_finalists_yield_low_confidence() {
        // Two candidates with identical containment-level evidence and no
        // artist data: the winner is ambiguous, confidence must stay low.
        let provider = FakeProvider {
            track_hits: vec![
                make_hit(1, "Blinding Lights (Deluxe)", &[], None),
                make_hit(2, "Blinding Lights (Live)", &[], None),
            ],
            ..Default::default()
        };
        let resolved = resolver(provider)
            .resolve(Some("The Weeknd"), "Blinding Lights")
            .await
            .expect("expected a resolution");

        assert!(
            resolved.match_confidence <= 0.5,
            "confidence was {}",
            resolved.match_confidence
        );
    }

    #[tokio::test]
    async fn test_artist_mismatch_is_negative_evidence() {
        let provider = FakeProvider {
            track_hits: vec![
                // Exact name but credited to a different artist.
                make_hit(1, "Blinding Lights", &["Totally Different Band"], None),
                // Containment match with the right artist.
                make_hit(2, "Blinding Lights - Single Version", &["The Weeknd"], None),
            ],
            ..Default::default()
        };
        let resolved = resolver(provider)
            .resolve(Some("The Weeknd"), "Blinding Lights")
            .await
            .expect("expected a resolution");

        // 140 - 120 = 20 for the impostor vs 80 + 120 = 200 for the match.
        assert_eq!(resolved.cm_track_id, 2);
    }

    #[tokio::test]
    async fn test_remix_marker_downranks_candidate() {
        let provider = FakeProvider {
            track_hits: vec![
                make_hit(1, "Blinding Lights Remix", &["The Weeknd"], None),
                make_hit(2, "Blinding Lights", &["The Weeknd"], None),
            ],
            ..Default::default()
        };
        let resolved = resolver(provider)
            .resolve(Some("The Weeknd"), "Blinding Lights")
            .await
            .expect("expected a resolution");
        assert_eq!(resolved.cm_track_id, 2);
    }

    #[tokio::test]
    async fn test_full_metadata_reveals_artist_on_rescore() {
        // The search snippet carries no artist data; the full record does.
        let mut track_details = HashMap::new();
        track_details.insert(
            1,
            TrackDetail {
                id: 1,
                artist_names: vec!["The Weeknd".to_string()],
                ..Default::default()
            },
        );
        let provider = FakeProvider {
            track_hits: vec![make_hit(1, "Blinding Lights", &[], None)],
            track_details,
            ..Default::default()
        };
        let resolved = resolver(provider)
            .resolve(Some("The Weeknd"), "Blinding Lights")
            .await
            .expect("expected a resolution");

        assert_eq!(resolved.artist_names, vec!["The Weeknd".to_string()]);
        // 140 + 120 + gap bonus (sole finalist) pushes confidence to 1.0.
        assert_eq!(resolved.match_confidence, 1.0);
    }

    #[tokio::test]
    async fn test_isrc_canonicalization_overrides_identity() {
        let mut isrc_mappings = HashMap::new();
        isrc_mappings.insert(
            "USUG11904206".to_string(),
            vec![TrackIdMapping {
                cm_track: Some(99),
                ..Default::default()
            }],
        );
        let mut track_details = HashMap::new();
        track_details.insert(
            99,
            TrackDetail {
                id: 99,
                name: Some("Blinding Lights".to_string()),
                isrc: Some("USUG11904206".to_string()),
                artist_names: vec!["The Weeknd".to_string()],
                songwriters: vec!["Abel Tesfaye".to_string(), "Max Martin".to_string()],
                release_date: Some("2019-11-29".to_string()),
                ..Default::default()
            },
        );
        let provider = FakeProvider {
            // The search returns a regional variant under the same ISRC.
            track_hits: vec![make_hit(
                1,
                "Blinding Lights (UK Version)",
                &["The Weeknd"],
                Some("USUG11904206"),
            )],
            track_details,
            isrc_mappings,
            ..Default::default()
        };
        let resolved = resolver(provider)
            .resolve(Some("The Weeknd"), "Blinding Lights")
            .await
            .expect("expected a resolution");

        assert_eq!(resolved.cm_track_id, 99);
        assert_eq!(resolved.name, "Blinding Lights");
        assert_eq!(resolved.release_date.as_deref(), Some("2019-11-29"));
        assert_eq!(resolved.songwriters.len(), 2);
    }

    #[tokio::test]
    async fn test_label_prefers_oldest_album() {
        let mut albums = HashMap::new();
        albums.insert(
            10,
            AlbumDetail {
                id: 10,
                label: Some("Reissue Records".to_string()),
                release_date: Some("2023-01-01".to_string()),
                ..Default::default()
            },
        );
        albums.insert(
            11,
            AlbumDetail {
                id: 11,
                label: Some("Original Masters".to_string()),
                release_date: Some("2019-11-29".to_string()),
                ..Default::default()
            },
        );
        let mut track_details = HashMap::new();
        track_details.insert(
            1,
            TrackDetail {
                id: 1,
                album_ids: vec![10, 11],
                album_labels: vec!["Fallback Label".to_string()],
                ..Default::default()
            },
        );
        let provider = FakeProvider {
            track_hits: vec![make_hit(1, "Blinding Lights", &["The Weeknd"], None)],
            track_details,
            albums,
            ..Default::default()
        };
        let resolved = resolver(provider)
            .resolve(Some("The Weeknd"), "Blinding Lights")
            .await
            .expect("expected a resolution");
        assert_eq!(resolved.label.as_deref(), Some("Original Masters"));
    }

    #[tokio::test]
    async fn test_label_falls_back_to_track_level() {
        let mut track_details = HashMap::new();
        track_details.insert(
            1,
            TrackDetail {
                id: 1,
                album_labels: vec!["0123456 CatNo".to_string(), "Republic Records".to_string()],
                ..Default::default()
            },
        );
        let provider = FakeProvider {
            track_hits: vec![make_hit(1, "Blinding Lights", &["The Weeknd"], None)],
            track_details,
            ..Default::default()
        };
        let resolved = resolver(provider)
            .resolve(Some("The Weeknd"), "Blinding Lights")
            .await
            .expect("expected a resolution");
        assert_eq!(resolved.label.as_deref(), Some("Republic Records"));
    }

    #[tokio::test]
    async fn test_no_candidates_returns_none() {
        let resolved = resolver(FakeProvider::default())
            .resolve(Some("Nobody"), "Nothing")
            .await;
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_search_failure_returns_none() {
        let provider = FakeProvider {
            fail_search: true,
            ..Default::default()
        };
        let resolved = resolver(provider).resolve(Some("Anyone"), "Anything").await;
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_resolve_by_isrc() {
        let mut isrc_mappings = HashMap::new();
        isrc_mappings.insert(
            "GBARL1901234".to_string(),
            vec![TrackIdMapping {
                cm_track: Some(7),
                ..Default::default()
            }],
        );
        let mut track_details = HashMap::new();
        track_details.insert(
            7,
            TrackDetail {
                id: 7,
                name: Some("Dancing On My Own".to_string()),
                artist_names: vec!["Robyn".to_string()],
                ..Default::default()
            },
        );
        let provider = FakeProvider {
            isrc_mappings,
            track_details,
            ..Default::default()
        };
        let resolved = resolver(provider)
            .resolve_by_isrc("GBARL1901234")
            .await
            .expect("expected a resolution");

        assert_eq!(resolved.cm_track_id, 7);
        assert_eq!(resolved.isrc.as_deref(), Some("GBARL1901234"));
        assert_eq!(resolved.match_confidence, 1.0);
    }
}
