//! External platform collaborators.
//!
//! The scoring core performs no I/O of its own. These traits are the seams
//! through which already-authenticated data access is injected: the track
//! source (SoundCloud), the artist/track metadata provider (Chartmetric)
//! and the consumption-data provider (Luminate). Callers treat every method
//! as an atomic success-or-nothing operation; retry, rate limiting and auth
//! live inside the client implementations.

mod chartmetric;
mod luminate;
mod soundcloud;

pub use chartmetric::{ChartmetricClient, ChartmetricSettings};
pub use luminate::{LuminateClient, LuminateSettings};
pub use soundcloud::{SoundCloudClient, SoundCloudSettings};

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    AlbumDetail, ArtistCandidate, ArtistDetail, CareerProfile, ConsumptionRecord, GeoPoint,
    RawTrack, RawUser, TrackCandidate, TrackDetail, TrackIdMapping,
};

/// Streaming platform where remix candidates live.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Resolve a permalink URL to its full track record.
    async fn resolve(&self, url: &str) -> Result<RawTrack>;

    /// Fetch a track by its numeric id.
    async fn get_track(&self, track_id: u64) -> Result<RawTrack>;

    /// Keyword search across title, username and description.
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<RawTrack>>;

    /// Fetch an uploader profile.
    async fn get_user(&self, user_id: u64) -> Result<RawUser>;
}

/// Cross-platform artist/track metadata catalog.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn search_artists(&self, query: &str, limit: usize) -> Result<Vec<ArtistCandidate>>;

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<TrackCandidate>>;

    async fn get_artist(&self, artist_id: u64) -> Result<ArtistDetail>;

    /// Career stage / momentum snapshot.
    async fn get_artist_career(&self, artist_id: u64) -> Result<CareerProfile>;

    /// Latest follower count on one platform ("tiktok", "spotify", ...).
    async fn get_follower_stat(&self, artist_id: u64, platform: &str) -> Result<Option<u64>>;

    /// Top listener cities, sorted by listener count descending.
    async fn get_listener_cities(&self, artist_id: u64) -> Result<Vec<GeoPoint>>;

    async fn get_track(&self, track_id: u64) -> Result<TrackDetail>;

    async fn get_album(&self, album_id: u64) -> Result<AlbumDetail>;

    /// ISRC -> internal track id bridge, the canonical join key.
    async fn get_track_ids_by_isrc(&self, isrc: &str) -> Result<Vec<TrackIdMapping>>;
}

/// Industry consumption data keyed by ISRC.
#[async_trait]
pub trait ConsumptionProvider: Send + Sync {
    /// Returns `Ok(None)` when the provider has no data for the ISRC; `Err`
    /// only for transport-level failures worth logging.
    async fn get_consumption_by_isrc(&self, isrc: &str) -> Result<Option<ConsumptionRecord>>;
}

/// Bundle of collaborator handles injected into the pipeline.
#[derive(Clone)]
pub struct Clients {
    pub tracks: Arc<dyn TrackSource>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub consumption: Arc<dyn ConsumptionProvider>,
}

/// Metadata provider used when no credentials are configured: every lookup
/// comes back empty and the dependent signals stay at their neutral
/// defaults.
pub struct NoopMetadataProvider;

#[async_trait]
impl MetadataProvider for NoopMetadataProvider {
    async fn search_artists(&self, _query: &str, _limit: usize) -> Result<Vec<ArtistCandidate>> {
        Ok(Vec::new())
    }

    async fn search_tracks(&self, _query: &str, _limit: usize) -> Result<Vec<TrackCandidate>> {
        Ok(Vec::new())
    }

    async fn get_artist(&self, artist_id: u64) -> Result<ArtistDetail> {
        Ok(ArtistDetail {
            id: artist_id,
            ..Default::default()
        })
    }

    async fn get_artist_career(&self, _artist_id: u64) -> Result<CareerProfile> {
        Ok(CareerProfile::default())
    }

    async fn get_follower_stat(&self, _artist_id: u64, _platform: &str) -> Result<Option<u64>> {
        Ok(None)
    }

    async fn get_listener_cities(&self, _artist_id: u64) -> Result<Vec<GeoPoint>> {
        Ok(Vec::new())
    }

    async fn get_track(&self, track_id: u64) -> Result<TrackDetail> {
        Ok(TrackDetail {
            id: track_id,
            ..Default::default()
        })
    }

    async fn get_album(&self, album_id: u64) -> Result<AlbumDetail> {
        Ok(AlbumDetail {
            id: album_id,
            ..Default::default()
        })
    }

    async fn get_track_ids_by_isrc(&self, _isrc: &str) -> Result<Vec<TrackIdMapping>> {
        Ok(Vec::new())
    }
}

/// Consumption provider used when no credentials are configured.
pub struct NoopConsumptionProvider;

#[async_trait]
impl ConsumptionProvider for NoopConsumptionProvider {
    async fn get_consumption_by_isrc(&self, _isrc: &str) -> Result<Option<ConsumptionRecord>> {
        Ok(None)
    }
}

/// Build the collaborator bundle from resolved configuration. Providers with
/// missing credentials degrade to their noop variant so a partially
/// configured install still analyzes what it can.
pub fn build_clients(config: &crate::config::AppConfig) -> Result<Clients> {
    let tracks: Arc<dyn TrackSource> = Arc::new(SoundCloudClient::new(&config.soundcloud)?);

    let metadata: Arc<dyn MetadataProvider> = match ChartmetricClient::new(&config.chartmetric) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "Chartmetric disabled, artist/track enrichment will be empty");
            Arc::new(NoopMetadataProvider)
        }
    };

    let consumption: Arc<dyn ConsumptionProvider> = match LuminateClient::new(&config.luminate) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "Luminate disabled, consumption lookups will be empty");
            Arc::new(NoopConsumptionProvider)
        }
    };

    Ok(Clients {
        tracks,
        metadata,
        consumption,
    })
}
