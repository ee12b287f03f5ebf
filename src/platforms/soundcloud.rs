//! SoundCloud api-v2 client.
//!
//! Uses the unofficial v2 endpoint with a public client_id extracted from
//! the SoundCloud web app; read-only access to public tracks and users, no
//! OAuth required. The endpoint rejects requests without browser-like
//! headers, so the client sends the same User-Agent/Referer/Origin the web
//! app does. The client_id is not an official credential and can stop
//! working at any time.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::TrackSource;
use crate::models::{RawTrack, RawUser};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";

/// Settings for the SoundCloud client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundCloudSettings {
    pub base_url: String,
    pub client_id: String,
    pub timeout_secs: u64,
}

impl Default for SoundCloudSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api-v2.soundcloud.com".to_string(),
            client_id: "CkCiIyf14rHi27fhk7HxhPOzc85okfSJ".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Client for SoundCloud's unofficial v2 API.
pub struct SoundCloudClient {
    client: Client,
    base_url: String,
    client_id: String,
}

#[derive(Deserialize)]
struct TrackCollection {
    #[serde(default)]
    collection: Vec<RawTrack>,
}

impl SoundCloudClient {
    pub fn new(settings: &SoundCloudSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(REFERER, HeaderValue::from_static("https://soundcloud.com/"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://soundcloud.com"));

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            client_id: settings.client_id.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("client_id", self.client_id.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            bail!(
                "SoundCloud request {} failed with status: {}",
                path,
                response.status()
            );
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TrackSource for SoundCloudClient {
    async fn resolve(&self, url: &str) -> Result<RawTrack> {
        self.get_json("/resolve", &[("url", url)]).await
    }

    async fn get_track(&self, track_id: u64) -> Result<RawTrack> {
        self.get_json(&format!("/tracks/{}", track_id), &[]).await
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<RawTrack>> {
        let limit = limit.to_string();
        let collection: TrackCollection = self
            .get_json("/search/tracks", &[("q", query), ("limit", limit.as_str())])
            .await?;
        Ok(collection.collection)
    }

    async fn get_user(&self, user_id: u64) -> Result<RawUser> {
        self.get_json(&format!("/users/{}", user_id), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let client = SoundCloudClient::new(&SoundCloudSettings::default()).unwrap();
        assert_eq!(client.base_url(), "https://api-v2.soundcloud.com");
    }

    #[test]
    fn test_track_payload_deserialization() {
        let payload = r#"{
            "id": 851514058,
            "title": "Blinding Lights (Revelries Remix)",
            "genre": "Deep House",
            "created_at": "2020-03-20T08:00:00Z",
            "playback_count": 4025560,
            "likes_count": 81923,
            "reposts_count": 4120,
            "comment_count": 912,
            "permalink_url": "https://soundcloud.com/revelriesmusic/blinding_lights",
            "user": {"id": 1, "username": "Revelries", "followers_count": 12000},
            "publisher_metadata": {"isrc": "QZES72067310"}
        }"#;
        let track: RawTrack = serde_json::from_str(payload).unwrap();
        assert_eq!(track.id, 851514058);
        assert_eq!(track.plays(), 4_025_560);
        assert_eq!(track.uploader_name(), Some("Revelries"));
        assert_eq!(track.isrc(), Some("QZES72067310"));
    }

    #[test]
    fn test_search_collection_deserialization() {
        let payload = r#"{"collection": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]}"#;
        let collection: TrackCollection = serde_json::from_str(payload).unwrap();
        assert_eq!(collection.collection.len(), 2);

        // Missing collection key degrades to empty.
        let empty: TrackCollection = serde_json::from_str("{}").unwrap();
        assert!(empty.collection.is_empty());
    }
}
