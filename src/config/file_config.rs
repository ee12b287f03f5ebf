use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::platforms::{ChartmetricSettings, LuminateSettings, SoundCloudSettings};
use crate::resolver::ResolverSettings;
use crate::revenue::RevenueSettings;
use crate::scoring::ScoringSettings;

use super::SearchSettings;

/// TOML file configuration. Every section is optional; missing fields fall
/// back to the settings defaults, and scalar values override CLI arguments.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub port: Option<u16>,

    pub soundcloud: Option<SoundCloudSettings>,
    pub chartmetric: Option<ChartmetricSettings>,
    pub luminate: Option<LuminateSettings>,

    pub search: Option<SearchSettings>,
    pub scoring: Option<ScoringSettings>,
    pub resolver: Option<ResolverSettings>,
    pub revenue: Option<RevenueSettings>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
