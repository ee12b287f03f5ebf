mod file_config;

pub use file_config::FileConfig;

use serde::{Deserialize, Serialize};

use crate::platforms::{ChartmetricSettings, LuminateSettings, SoundCloudSettings};
use crate::resolver::ResolverSettings;
use crate::revenue::RevenueSettings;
use crate::scoring::ScoringSettings;

/// Settings for the remix discovery searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Seed tracks fetched per artist/song search.
    pub tracks_to_fetch: usize,
    /// Remixes analyzed per catalog song.
    pub catalog_limit_per_song: usize,
    /// Minimum play count for a remix to appear in catalog results.
    pub catalog_min_plays: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            tracks_to_fetch: 10,
            catalog_limit_per_song: 5,
            catalog_min_plays: 0,
        }
    }
}

/// CLI arguments that participate in config resolution. TOML values
/// override these where present.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self { port: 3001 }
    }
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,

    pub soundcloud: SoundCloudSettings,
    pub chartmetric: ChartmetricSettings,
    pub luminate: LuminateSettings,

    pub search: SearchSettings,
    pub scoring: ScoringSettings,
    pub resolver: ResolverSettings,
    pub revenue: RevenueSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML overrides CLI; credentials missing from both fall back
    /// to environment variables.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Self {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);

        let mut soundcloud = file.soundcloud.unwrap_or_default();
        if let Ok(client_id) = std::env::var("SOUNDCLOUD_CLIENT_ID") {
            if !client_id.is_empty() {
                soundcloud.client_id = client_id;
            }
        }

        let mut chartmetric = file.chartmetric.unwrap_or_default();
        if chartmetric.refresh_token.is_none() {
            chartmetric.refresh_token = env_credential("CHARTMETRIC_REFRESH_TOKEN");
        }

        let mut luminate = file.luminate.unwrap_or_default();
        if luminate.api_key.is_none() {
            luminate.api_key = env_credential("LUMINATE_API_KEY");
        }
        if luminate.email.is_none() {
            luminate.email = env_credential("LUMINATE_EMAIL");
        }
        if luminate.password.is_none() {
            luminate.password = env_credential("LUMINATE_PASSWORD");
        }

        Self {
            port,
            soundcloud,
            chartmetric,
            luminate,
            search: file.search.unwrap_or_default(),
            scoring: file.scoring.unwrap_or_default(),
            resolver: file.resolver.unwrap_or_default(),
            revenue: file.revenue.unwrap_or_default(),
        }
    }

    /// Presence of each required credential, for startup logging and the
    /// health endpoint.
    pub fn credential_checks(&self) -> Vec<CredentialCheck> {
        vec![
            CredentialCheck {
                name: "SOUNDCLOUD_CLIENT_ID".to_string(),
                present: !self.soundcloud.client_id.is_empty(),
            },
            CredentialCheck {
                name: "CHARTMETRIC_REFRESH_TOKEN".to_string(),
                present: self.chartmetric.refresh_token.is_some(),
            },
            CredentialCheck {
                name: "LUMINATE_API_KEY".to_string(),
                present: self.luminate.api_key.is_some(),
            },
            CredentialCheck {
                name: "LUMINATE_EMAIL".to_string(),
                present: self.luminate.email.is_some(),
            },
            CredentialCheck {
                name: "LUMINATE_PASSWORD".to_string(),
                present: self.luminate.password.is_some(),
            },
        ]
    }
}

/// One required credential and whether it is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialCheck {
    pub name: String,
    pub present: bool,
}

fn env_credential(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
