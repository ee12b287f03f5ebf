//! Luminate API client.
//!
//! Luminate provides industry-standard consumption data (streams, sales,
//! airplay) across territories. Known quirks: the auth token lasts 24 hours,
//! and data endpoints intermittently return HTTP 500 during service
//! outages, so the consumption lookup tries the song endpoint first and
//! falls back to the recording endpoint before giving up.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::ConsumptionProvider;
use crate::models::ConsumptionRecord;

/// Tokens last 24 hours; reuse within a slightly smaller window.
const TOKEN_TTL: Duration = Duration::from_secs(80_000);

const ACCEPT_HEADER: &str = "application/vnd.luminate-data.svc-apibff.v1+json";

/// Settings for the Luminate client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LuminateSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Territory for consumption queries.
    pub location: String,
    /// Consumption window, counted back from today.
    pub window_days: i64,
    pub timeout_secs: u64,
}

impl Default for LuminateSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.luminatedata.com".to_string(),
            api_key: None,
            email: None,
            password: None,
            location: "US".to_string(),
            window_days: 90,
            timeout_secs: 30,
        }
    }
}

struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// Client for the Luminate Music API.
pub struct LuminateClient {
    client: Client,
    base_url: String,
    api_key: String,
    email: String,
    password: String,
    location: String,
    window_days: i64,
    token: Mutex<Option<CachedToken>>,
}

impl LuminateClient {
    pub fn new(settings: &LuminateSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .context("Luminate API key is not configured")?;
        let email = settings
            .email
            .clone()
            .context("Luminate email is not configured")?;
        let password = settings
            .password
            .clone()
            .context("Luminate password is not configured")?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            api_key,
            email,
            password,
            location: settings.location.clone(),
            window_days: settings.window_days,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.fetched_at.elapsed() < TOKEN_TTL {
                return Ok(cached.token.clone());
            }
        }

        debug!("Authenticating with Luminate");
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: Option<String>,
            token: Option<String>,
        }

        let response = self
            .client
            .post(format!("{}/auth", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/x-www-form-urlencoded")
            .header("accept", "application/json")
            .body(format!(
                "username={}&password={}",
                self.email, self.password
            ))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!(
                "Luminate auth failed with status: {}",
                response.status()
            );
        }
        let body: TokenResponse = response.json().await?;
        let token = body
            .access_token
            .or(body.token)
            .context("Luminate auth response carried no token")?;
        *guard = Some(CachedToken {
            token: token.clone(),
            fetched_at: Instant::now(),
        });
        Ok(token)
    }

    fn window(&self) -> (String, String) {
        let end = Utc::now().date_naive();
        let start = end - chrono::Duration::days(self.window_days);
        (
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
        )
    }

    async fn get_record(&self, path: &str, isrc: &str) -> Result<ConsumptionRecord> {
        let token = self.access_token().await?;
        let (start_date, end_date) = self.window();

        let response = self
            .client
            .get(format!("{}{}/{}", self.base_url, path, isrc))
            .bearer_auth(token)
            .header("x-api-key", &self.api_key)
            .header("accept", ACCEPT_HEADER)
            .query(&[
                ("id_type", "isrc"),
                ("metrics", "all"),
                ("location", self.location.as_str()),
                ("start_date", start_date.as_str()),
                ("end_date", end_date.as_str()),
                ("metadata_level", "max"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            bail!(
                "Luminate request {} failed with status: {}",
                path,
                response.status()
            );
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ConsumptionProvider for LuminateClient {
    async fn get_consumption_by_isrc(&self, isrc: &str) -> Result<Option<ConsumptionRecord>> {
        // A "song" groups recordings of one composition; a "recording" is the
        // single master behind the ISRC. Try the broader entity first.
        match self.get_record("/songs", isrc).await {
            Ok(record) if record.title.is_some() => return Ok(Some(record)),
            Ok(_) => debug!(isrc = %isrc, "Luminate song lookup returned an empty record"),
            Err(e) => debug!(isrc = %isrc, error = %e, "Luminate song lookup failed"),
        }
        match self.get_record("/musical_recordings", isrc).await {
            Ok(record) if record.title.is_some() => Ok(Some(record)),
            Ok(_) => Ok(None),
            Err(e) => {
                debug!(isrc = %isrc, error = %e, "Luminate recording lookup failed");
                Ok(None)
            }
        }
    }
}
