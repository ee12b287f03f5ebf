//! Chartmetric API client.
//!
//! Chartmetric uses a two-token scheme: a long-lived refresh token trades
//! for a one-hour access token. The access token is cached and re-fetched
//! after 50 minutes. Requests are spaced 300 ms apart to stay under the
//! 4 req/s limit.
//!
//! Every endpoint wraps its payload in an `{"obj": ...}` envelope; a few
//! fields (album_label, stat series) come back in more than one shape, so
//! the wire types here are deliberately tolerant.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::MetadataProvider;
use crate::models::{
    AlbumDetail, ArtistCandidate, ArtistDetail, CareerProfile, CareerStage, GeoPoint, Momentum,
    TrackCandidate, TrackDetail, TrackIdMapping,
};

/// Access tokens last one hour; refresh after 50 minutes.
const TOKEN_TTL: Duration = Duration::from_secs(3000);

/// Settings for the Chartmetric client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartmetricSettings {
    pub base_url: String,
    pub refresh_token: Option<String>,
    /// Delay between requests, for the 4 req/s rate limit.
    pub rate_limit_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ChartmetricSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.chartmetric.com/api".to_string(),
            refresh_token: None,
            rate_limit_ms: 300,
            timeout_secs: 30,
        }
    }
}

struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// Client for the Chartmetric API (api.chartmetric.com).
pub struct ChartmetricClient {
    client: Client,
    base_url: String,
    refresh_token: String,
    rate_limit_delay: Duration,
    token: Mutex<Option<CachedToken>>,
    last_request: Mutex<Option<Instant>>,
}

impl ChartmetricClient {
    pub fn new(settings: &ChartmetricSettings) -> Result<Self> {
        let refresh_token = settings
            .refresh_token
            .clone()
            .context("Chartmetric refresh token is not configured")?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            refresh_token,
            rate_limit_delay: Duration::from_millis(settings.rate_limit_ms),
            token: Mutex::new(None),
            last_request: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.fetched_at.elapsed() < TOKEN_TTL {
                return Ok(cached.token.clone());
            }
        }

        debug!("Refreshing Chartmetric access token");
        #[derive(Deserialize)]
        struct TokenResponse {
            token: String,
        }

        let response = self
            .client
            .post(format!("{}/token", self.base_url))
            .json(&serde_json::json!({ "refreshtoken": self.refresh_token }))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!(
                "Chartmetric token refresh failed with status: {}",
                response.status()
            );
        }
        let body: TokenResponse = response.json().await?;
        *guard = Some(CachedToken {
            token: body.token.clone(),
            fetched_at: Instant::now(),
        });
        Ok(body.token)
    }

    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.rate_limit_delay {
                tokio::time::sleep(self.rate_limit_delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn get_obj<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let token = self.access_token().await?;
        self.throttle().await;

        #[derive(Deserialize)]
        struct ObjEnvelope<T> {
            obj: Option<T>,
        }

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!(
                "Chartmetric request {} failed with status: {}",
                path,
                response.status()
            );
        }
        let envelope: ObjEnvelope<T> = response.json().await?;
        Ok(envelope.obj)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct CmSearchObj {
    #[serde(default)]
    artists: Vec<CmArtistHit>,
    #[serde(default)]
    tracks: Vec<CmTrackHit>,
}

#[derive(Deserialize)]
struct CmArtistHit {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cm_artist_score: Option<f64>,
    #[serde(default)]
    sp_followers: Option<u64>,
    #[serde(default)]
    sp_monthly_listeners: Option<u64>,
}

#[derive(Deserialize)]
struct CmTrackHit {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    isrc: Option<String>,
    #[serde(default)]
    artist_names: Vec<String>,
    #[serde(default)]
    album_ids: Vec<u64>,
    #[serde(default)]
    release_date: Option<String>,
}

/// Some payloads carry labels as one string, others as a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    fn into_vec(self) -> Vec<String> {
        match self {
            StringOrList::One(s) => vec![s],
            StringOrList::Many(list) => list,
        }
    }
}

#[derive(Deserialize, Default)]
struct CmTrackFull {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    isrc: Option<String>,
    #[serde(default)]
    artist_names: Vec<String>,
    #[serde(default)]
    album_ids: Vec<u64>,
    #[serde(default)]
    album_label: Option<StringOrList>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    songwriters: Vec<String>,
}

#[derive(Deserialize, Default)]
struct CmAlbumFull {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
}

#[derive(Deserialize, Default)]
struct CmArtistFull {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    record_label: Option<String>,
    #[serde(default)]
    hometown_city: Option<String>,
    #[serde(default)]
    code2: Option<String>,
}

#[derive(Deserialize, Default)]
struct CmCareerObj {
    #[serde(default)]
    stage: Option<String>,
    #[serde(default)]
    momentum: Option<String>,
    #[serde(default)]
    momentum_score: Option<f64>,
}

#[derive(Deserialize)]
struct CmStatPoint {
    #[serde(default)]
    value: Option<f64>,
}

/// Stat series arrive either as a bare list or keyed under "followers".
#[derive(Deserialize)]
#[serde(untagged)]
enum CmStatObj {
    Series(Vec<CmStatPoint>),
    Keyed {
        #[serde(default)]
        followers: Vec<CmStatPoint>,
    },
}

impl CmStatObj {
    fn latest_value(self) -> Option<f64> {
        let series = match self {
            CmStatObj::Series(series) => series,
            CmStatObj::Keyed { followers } => followers,
        };
        series.into_iter().rev().find_map(|p| p.value)
    }
}

#[derive(Deserialize, Default)]
struct CmGeoObj {
    #[serde(default)]
    cities: std::collections::HashMap<String, Vec<CmGeoEntry>>,
}

#[derive(Deserialize)]
struct CmGeoEntry {
    #[serde(default)]
    code2: Option<String>,
    #[serde(default)]
    listeners: Option<u64>,
    #[serde(default)]
    city_affinity: Option<f64>,
}

#[derive(Deserialize)]
struct CmIdMapping {
    #[serde(default)]
    cm_track: Option<u64>,
    #[serde(default)]
    track_name: Option<String>,
    #[serde(default)]
    isrc: Option<String>,
    #[serde(default)]
    spotify_track_id: Option<String>,
}

/// Flatten the "where people listen" response into a sorted city list.
fn parse_geo_obj(geo: CmGeoObj) -> Vec<GeoPoint> {
    let mut cities: Vec<GeoPoint> = geo
        .cities
        .into_iter()
        .filter_map(|(name, entries)| {
            // Entries are time-ordered; the first is the most recent point.
            let entry = entries.into_iter().next()?;
            Some(GeoPoint {
                name,
                country_code: entry.code2.unwrap_or_default(),
                listener_count: entry.listeners.unwrap_or(0),
                affinity: entry.city_affinity.unwrap_or(0.0),
            })
        })
        .collect();
    cities.sort_by(|a, b| b.listener_count.cmp(&a.listener_count));
    cities
}

#[async_trait]
impl MetadataProvider for ChartmetricClient {
    async fn search_artists(&self, query: &str, limit: usize) -> Result<Vec<ArtistCandidate>> {
        let limit = limit.to_string();
        let obj: Option<CmSearchObj> = self
            .get_obj(
                "/search",
                &[("q", query), ("type", "artists"), ("limit", limit.as_str())],
            )
            .await?;
        Ok(obj
            .map(|o| o.artists)
            .unwrap_or_default()
            .into_iter()
            .map(|hit| ArtistCandidate {
                id: hit.id,
                name: hit.name,
                cm_artist_score: hit.cm_artist_score,
                sp_followers: hit.sp_followers,
                sp_monthly_listeners: hit.sp_monthly_listeners,
            })
            .collect())
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<TrackCandidate>> {
        let limit = limit.to_string();
        let obj: Option<CmSearchObj> = self
            .get_obj(
                "/search",
                &[("q", query), ("type", "tracks"), ("limit", limit.as_str())],
            )
            .await?;
        Ok(obj
            .map(|o| o.tracks)
            .unwrap_or_default()
            .into_iter()
            .map(|hit| TrackCandidate {
                id: hit.id,
                name: hit.name.unwrap_or_default(),
                artist_names: hit.artist_names,
                isrc: hit.isrc,
                album_ids: hit.album_ids,
                release_date: hit.release_date,
            })
            .collect())
    }

    async fn get_artist(&self, artist_id: u64) -> Result<ArtistDetail> {
        let obj: Option<CmArtistFull> = self.get_obj(&format!("/artist/{}", artist_id), &[]).await?;
        let full = obj.unwrap_or_default();
        Ok(ArtistDetail {
            id: artist_id,
            name: full.name,
            record_label: full.record_label,
            hometown_city: full.hometown_city,
            country_code: full.code2,
        })
    }

    async fn get_artist_career(&self, artist_id: u64) -> Result<CareerProfile> {
        let obj: Option<CmCareerObj> = self
            .get_obj(&format!("/artist/{}/career", artist_id), &[])
            .await?;
        let career = obj.unwrap_or_default();
        Ok(CareerProfile {
            stage: career.stage.as_deref().and_then(CareerStage::parse),
            momentum: career.momentum.as_deref().and_then(Momentum::parse),
            momentum_score: career.momentum_score,
        })
    }

    async fn get_follower_stat(&self, artist_id: u64, platform: &str) -> Result<Option<u64>> {
        let obj: Option<CmStatObj> = self
            .get_obj(&format!("/artist/{}/stat/{}", artist_id, platform), &[])
            .await?;
        Ok(obj
            .and_then(CmStatObj::latest_value)
            .map(|value| value.max(0.0) as u64))
    }

    async fn get_listener_cities(&self, artist_id: u64) -> Result<Vec<GeoPoint>> {
        let obj: Option<CmGeoObj> = self
            .get_obj(&format!("/artist/{}/where-people-listen", artist_id), &[])
            .await?;
        Ok(obj.map(parse_geo_obj).unwrap_or_default())
    }

    async fn get_track(&self, track_id: u64) -> Result<TrackDetail> {
        let obj: Option<CmTrackFull> = self.get_obj(&format!("/track/{}", track_id), &[]).await?;
        let full = obj.unwrap_or_default();
        Ok(TrackDetail {
            id: track_id,
            name: full.name,
            isrc: full.isrc,
            artist_names: full.artist_names,
            album_ids: full.album_ids,
            album_labels: full.album_label.map(StringOrList::into_vec).unwrap_or_default(),
            release_date: full.release_date,
            songwriters: full.songwriters,
        })
    }

    async fn get_album(&self, album_id: u64) -> Result<AlbumDetail> {
        let obj: Option<CmAlbumFull> = self.get_obj(&format!("/album/{}", album_id), &[]).await?;
        let full = obj.unwrap_or_default();
        Ok(AlbumDetail {
            id: album_id,
            name: full.name,
            label: full.label,
            release_date: full.release_date,
        })
    }

    async fn get_track_ids_by_isrc(&self, isrc: &str) -> Result<Vec<TrackIdMapping>> {
        let obj: Option<Vec<CmIdMapping>> = self
            .get_obj(&format!("/track/isrc/{}/get-ids", isrc), &[])
            .await?;
        Ok(obj
            .unwrap_or_default()
            .into_iter()
            .map(|m| TrackIdMapping {
                cm_track: m.cm_track,
                track_name: m.track_name,
                isrc: m.isrc,
                spotify_track_id: m.spotify_track_id,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_refresh_token() {
        let settings = ChartmetricSettings::default();
        assert!(ChartmetricClient::new(&settings).is_err());

        let configured = ChartmetricSettings {
            refresh_token: Some("token".to_string()),
            ..Default::default()
        };
        assert!(ChartmetricClient::new(&configured).is_ok());
    }

    #[test]
    fn test_album_label_string_or_list() {
        let one: CmTrackFull =
            serde_json::from_str(r#"{"album_label": "XO / Republic Records"}"#).unwrap();
        assert_eq!(
            one.album_label.map(StringOrList::into_vec).unwrap(),
            vec!["XO / Republic Records".to_string()]
        );

        let many: CmTrackFull =
            serde_json::from_str(r#"{"album_label": ["XO", "Republic Records"]}"#).unwrap();
        assert_eq!(many.album_label.map(StringOrList::into_vec).unwrap().len(), 2);
    }

    #[test]
    fn test_stat_obj_shapes() {
        let series: CmStatObj =
            serde_json::from_str(r#"[{"value": 100}, {"value": 250}]"#).unwrap();
        assert_eq!(series.latest_value(), Some(250.0));

        let keyed: CmStatObj =
            serde_json::from_str(r#"{"followers": [{"value": 10}, {"value": null}]}"#).unwrap();
        assert_eq!(keyed.latest_value(), Some(10.0));
    }

    #[test]
    fn test_geo_parsing_sorts_by_listeners() {
        let obj: CmGeoObj = serde_json::from_str(
            r#"{"cities": {
                "London": [{"code2": "GB", "listeners": 90, "city_affinity": 1.2}],
                "Berlin": [{"code2": "DE", "listeners": 150, "city_affinity": 0.9}],
                "Nowhere": []
            }}"#,
        )
        .unwrap();
        let cities = parse_geo_obj(obj);
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].name, "Berlin");
        assert_eq!(cities[0].listener_count, 150);
        assert_eq!(cities[1].country_code, "GB");
    }

    #[test]
    fn test_career_labels_parse_through_enums() {
        let career: CmCareerObj = serde_json::from_str(
            r#"{"stage": "mid-level", "momentum": "explosive growth", "momentum_score": 88.5}"#,
        )
        .unwrap();
        assert_eq!(career.stage.as_deref().and_then(CareerStage::parse), Some(CareerStage::MidLevel));
        assert_eq!(
            career.momentum.as_deref().and_then(Momentum::parse),
            Some(Momentum::ExplosiveGrowth)
        );
    }
}
